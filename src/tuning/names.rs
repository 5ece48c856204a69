use super::{KeyIndex, KEY_COUNT, SEMITONES};

const LONG_NAMES: [&str; SEMITONES] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

// Accidentals collapse to "#" so a whole octave fits on a narrow row.
const SHORT_NAMES: [&str; SEMITONES] = [
    "C", "#", "D", "#", "E", "F", "#", "G", "#", "A", "#", "B",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// Full spelling with both enharmonics, e.g. `C#/Db4`.
    Long,
    /// Letter for naturals, `#` for accidentals, e.g. `#4`.
    Short,
}

/// Display names for every key. Depends only on the key index.
#[derive(Debug, Clone)]
pub struct KeyNames {
    long: Vec<String>,
    short: Vec<String>,
}

impl KeyNames {
    pub fn new() -> Self {
        Self {
            long: build(&LONG_NAMES),
            short: build(&SHORT_NAMES),
        }
    }

    pub fn name(&self, key: KeyIndex, style: NameStyle) -> &str {
        match style {
            NameStyle::Long => &self.long[key.index()],
            NameStyle::Short => &self.short[key.index()],
        }
    }
}

impl Default for KeyNames {
    fn default() -> Self {
        Self::new()
    }
}

fn build(table: &[&str; SEMITONES]) -> Vec<String> {
    (0..KEY_COUNT)
        .map(|i| format!("{}{}", table[i % SEMITONES], i / SEMITONES))
        .collect()
}
