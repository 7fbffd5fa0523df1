//! Domain models for tracks and their audio features.

use serde::{Deserialize, Serialize};

/// Per-track audio descriptors supplied by the upstream analysis service.
///
/// Every field may be absent on tracks that lack analysis data. Consumers go
/// through [`crate::engine::TrackMetrics`], which substitutes neutral
/// defaults instead of failing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioFeatures {
    /// 0.0-1.0
    pub energy: Option<f64>,
    /// 0.0=sad/dark, 1.0=happy/bright
    pub valence: Option<f64>,
    /// 0.0-1.0
    pub danceability: Option<f64>,
    /// Tempo in BPM.
    pub tempo: Option<f64>,
    /// Pitch class 0-11; the upstream reports -1 when no key was detected.
    pub key: Option<i32>,
    /// 0 = minor, 1 = major.
    pub mode: Option<i32>,
    pub time_signature: Option<i32>,
}

/// A track as curated by this service. Immutable once fetched; orderings are
/// always whole-list permutations, never in-place edits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub name: String,
    pub artists: Vec<String>,
    pub album: String,
    pub duration_ms: i64,
    /// The upstream's URI for this track, used when creating playlists.
    pub uri: String,
    #[serde(default)]
    pub audio_features: Option<AudioFeatures>,
}
