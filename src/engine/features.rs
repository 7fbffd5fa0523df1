//! Feature extraction: flattens a track's optional analysis record into a
//! fully-populated metric tuple.

use crate::track::Track;

/// Pitch class display names, index 0-11.
pub const KEY_NAMES: [&str; 12] = [
    "C", "C♯/D♭", "D", "D♯/E♭", "E", "F", "F♯/G♭", "G", "G♯/A♭", "A", "A♯/B♭", "B",
];

/// A fully-populated metric tuple for one track.
///
/// Absent source features become 0, so every consumer downstream can assume
/// all seven values are present.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackMetrics {
    pub energy: f64,
    pub valence: f64,
    /// BPM.
    pub tempo: f64,
    pub danceability: f64,
    /// Pitch class 0-11.
    pub key: i32,
    /// 0 = minor, 1 = major.
    pub mode: i32,
    pub time_signature: i32,
}

impl TrackMetrics {
    /// Extract metrics from a track. Total: never fails, even on a track with
    /// no analysis record at all.
    pub fn from_track(track: &Track) -> Self {
        let f = track.audio_features.as_ref();
        TrackMetrics {
            energy: f.and_then(|f| f.energy).unwrap_or(0.0),
            valence: f.and_then(|f| f.valence).unwrap_or(0.0),
            tempo: f.and_then(|f| f.tempo).unwrap_or(0.0),
            danceability: f.and_then(|f| f.danceability).unwrap_or(0.0),
            // -1 is the upstream's "no key detected" marker
            key: f.and_then(|f| f.key).unwrap_or(0).max(0),
            mode: f.and_then(|f| f.mode).unwrap_or(0),
            time_signature: f.and_then(|f| f.time_signature).unwrap_or(0),
        }
    }
}

/// Display name for a pitch class.
pub fn key_name(key: i32) -> &'static str {
    usize::try_from(key)
        .ok()
        .and_then(|k| KEY_NAMES.get(k))
        .copied()
        .unwrap_or("Unknown")
}

/// Display name for a mode.
pub fn mode_name(mode: i32) -> &'static str {
    if mode == 1 {
        "Major"
    } else {
        "Minor"
    }
}
