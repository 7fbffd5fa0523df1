//! Range filtering over track audio features.

use serde::{Deserialize, Serialize};

use super::features::TrackMetrics;
use crate::track::Track;

/// An inclusive min/max range.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Range { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// User-supplied feature bounds. The defaults mirror the builder sliders:
/// 0-1 for the unit-range features and 60-180 BPM for tempo.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureBounds {
    pub danceability: Range,
    pub tempo: Range,
    pub valence: Range,
    pub energy: Range,
}

impl Default for FeatureBounds {
    fn default() -> Self {
        FeatureBounds {
            danceability: Range::new(0.0, 1.0),
            tempo: Range::new(60.0, 180.0),
            valence: Range::new(0.0, 1.0),
            energy: Range::new(0.0, 1.0),
        }
    }
}

impl FeatureBounds {
    /// Whether a track's metrics satisfy all four range predicates.
    pub fn admits(&self, m: &TrackMetrics) -> bool {
        self.danceability.contains(m.danceability)
            && self.tempo.contains(m.tempo)
            && self.valence.contains(m.valence)
            && self.energy.contains(m.energy)
    }
}

/// Keep the tracks whose metrics satisfy all four bounds. Order-preserving;
/// an empty result is valid and never an error.
pub fn filter_tracks(tracks: Vec<Track>, bounds: &FeatureBounds) -> Vec<Track> {
    tracks
        .into_iter()
        .filter(|track| bounds.admits(&TrackMetrics::from_track(track)))
        .collect()
}
