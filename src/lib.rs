pub mod config;
pub mod dsp;
pub mod engine; // Audio backend boundary, renderer, timer queue
pub mod error;
pub mod keyboard; // User-facing controller
pub mod tuning; // Key index -> frequency and name
pub mod voice; // Per-key voice lifecycle

pub const MAX_BLOCK_SIZE: usize = 2048;
