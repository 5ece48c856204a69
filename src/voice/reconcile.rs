use crate::tuning::KeyIndex;

/// What has to happen to one key to match the desired playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceAction {
    /// Key should sound but has no voice.
    Create,
    /// Key has a voice but should be silent.
    Release,
}

/// Diff desired playback state against the keys that currently have a voice.
///
/// Keys already in the right state produce nothing. Extra entries on either
/// side (mismatched lengths) are treated as "not playing" / "no voice".
pub fn plan(playing: &[bool], live: &[bool]) -> Vec<(KeyIndex, VoiceAction)> {
    KeyIndex::all()
        .filter_map(|key| {
            let want = playing.get(key.index()).copied().unwrap_or(false);
            let have = live.get(key.index()).copied().unwrap_or(false);
            match (want, have) {
                (true, false) => Some((key, VoiceAction::Create)),
                (false, true) => Some((key, VoiceAction::Release)),
                _ => None,
            }
        })
        .collect()
}
