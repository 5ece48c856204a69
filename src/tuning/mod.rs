//! Equal-tempered frequency table for the nine-octave keyboard.
//!
//! Keys are numbered 0..108 in ascending pitch, twelve per octave, with
//! octave numbering starting at C: key 0 is C0, key 48 is C4 (middle C) and
//! key 57 is A4, the tuning reference.

pub mod names;

pub use names::{KeyNames, NameStyle};

/// Semitones per octave.
pub const SEMITONES: usize = 12;
/// Octaves on the keyboard.
pub const OCTAVES: usize = 9;
/// Total number of keys.
pub const KEY_COUNT: usize = SEMITONES * OCTAVES;
/// Index of the reference key: A is a major sixth (+9) above C4.
pub const REFERENCE_INDEX: usize = 9 + SEMITONES * 4;
/// Default reference pitch for A4 in Hz.
pub const DEFAULT_REFERENCE_PITCH: f64 = 440.0;

/// A key on the keyboard, guaranteed to be in `0..KEY_COUNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyIndex(u8);

impl KeyIndex {
    pub const REFERENCE: KeyIndex = KeyIndex(REFERENCE_INDEX as u8);

    pub fn new(index: usize) -> Option<Self> {
        (index < KEY_COUNT).then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn octave(self) -> usize {
        self.index() / SEMITONES
    }

    pub fn semitone(self) -> usize {
        self.index() % SEMITONES
    }

    /// All keys in ascending pitch order.
    pub fn all() -> impl Iterator<Item = KeyIndex> {
        (0..KEY_COUNT).map(|i| KeyIndex(i as u8))
    }
}

/// Frequencies for every key, derived from one reference pitch.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyTable {
    reference_pitch: f64,
    frequencies: [f64; KEY_COUNT],
}

impl FrequencyTable {
    /// `frequency(i) = reference * 2^((i - REFERENCE_INDEX) / 12)`
    pub fn equal_tempered(reference_pitch: f64) -> Self {
        let mut frequencies = [0.0; KEY_COUNT];
        for (i, freq) in frequencies.iter_mut().enumerate() {
            let semitones = i as f64 - REFERENCE_INDEX as f64;
            *freq = reference_pitch * 2.0_f64.powf(semitones / SEMITONES as f64);
        }
        Self {
            reference_pitch,
            frequencies,
        }
    }

    pub fn reference_pitch(&self) -> f64 {
        self.reference_pitch
    }

    pub fn get(&self, key: KeyIndex) -> f64 {
        self.frequencies[key.index()]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.frequencies
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.frequencies.iter().copied()
    }

    pub fn len(&self) -> usize {
        KEY_COUNT
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Owner of the current reference pitch and its cached table.
#[derive(Debug, Clone)]
pub struct Tuning {
    table: FrequencyTable,
}

impl Tuning {
    pub fn new(reference_pitch: f64) -> Self {
        warn_if_unusable(reference_pitch);
        Self {
            table: FrequencyTable::equal_tempered(reference_pitch),
        }
    }

    pub fn reference_pitch(&self) -> f64 {
        self.table.reference_pitch()
    }

    /// Change the reference pitch. Returns `true` if the table was rebuilt.
    pub fn set_reference_pitch(&mut self, reference_pitch: f64) -> bool {
        if reference_pitch == self.table.reference_pitch() {
            return false;
        }
        warn_if_unusable(reference_pitch);
        self.table = FrequencyTable::equal_tempered(reference_pitch);
        log::debug!("reference pitch set to {reference_pitch} Hz");
        true
    }

    pub fn frequency(&self, key: KeyIndex) -> f64 {
        self.table.get(key)
    }

    pub fn table(&self) -> &FrequencyTable {
        &self.table
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self::new(DEFAULT_REFERENCE_PITCH)
    }
}

// Non-positive pitches are accepted as-is; the table just comes out unusable.
fn warn_if_unusable(reference_pitch: f64) {
    if !(reference_pitch.is_finite() && reference_pitch > 0.0) {
        log::warn!("reference pitch {reference_pitch} Hz is not a positive frequency");
    }
}
