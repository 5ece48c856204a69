//! Error types for the audio engine boundary.

use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Reasons an audio engine could not be created or resumed.
///
/// None of these are fatal to the keyboard: the controller logs them and keeps
/// accepting key toggles without producing sound.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The host has no default output device.
    #[error("no default output device available")]
    NoOutputDevice,

    /// The output device refused to report a usable configuration.
    #[error("failed to fetch default output config: {0}")]
    Config(String),

    /// The output stream could not be built.
    #[error("failed to build output stream: {0}")]
    BuildStream(String),

    /// The stream exists but could not be started or resumed.
    #[error("output stream is suspended: {0}")]
    Play(String),
}
