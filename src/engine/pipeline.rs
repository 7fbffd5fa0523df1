//! The explicit recompute pipeline: immutable snapshot in, render model out.
//!
//! UI collaborators call [`recompute`] on every triggering event (selection
//! change, slider release, curve pick) and wholesale-replace what they render
//! with the returned model. The engine holds no state between calls.

use serde::{Deserialize, Serialize};

use super::curve::{CurvePoint, CurveShape};
use super::curve_match;
use super::features::TrackMetrics;
use super::filter::{self, FeatureBounds};
use super::flow;
use super::grouped_sort;
use crate::track::Track;

/// How the caller wants the tracks arranged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Arrangement {
    /// Grouped harmonic sort with per-transition flow ratings.
    GroupedFlow,
    /// Reorder to best fit a named mood curve.
    Curve(CurveShape),
    /// Keep the incoming order. Also the fallback for unrecognized curve
    /// names.
    Identity,
}

/// One point of the chart series rendered by UI collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
    pub danceability: f64,
    /// Pitch class scaled to 0-1 so it shares the chart's y axis.
    pub key: f64,
    pub mode: f64,
}

/// Output of a recompute: the ordered tracks plus derived scores and series.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RenderModel {
    pub tracks: Vec<Track>,
    /// Per-position flow ratings (seed rating first); grouped arrangement
    /// only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_ratings: Option<Vec<f64>>,
    /// Mean flow rating. Absent for curve/identity arrangements and for an
    /// empty playlist.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_score: Option<f64>,
    /// The target curve, when a curve arrangement was used.
    #[serde(default)]
    pub target_curve: Vec<CurvePoint>,
    pub chart: Vec<ChartPoint>,
}

/// Immutable input snapshot, passed by value into each engine call. Replaces
/// the page-level mutable track list of the original design.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CurationSnapshot {
    pub tracks: Vec<Track>,
}

/// Run the full pipeline: optional bounds filter, then the chosen
/// arrangement, then derived scores and chart series.
pub fn recompute(
    snapshot: CurationSnapshot,
    bounds: Option<&FeatureBounds>,
    arrangement: Arrangement,
) -> RenderModel {
    let tracks = match bounds {
        Some(b) => filter::filter_tracks(snapshot.tracks, b),
        None => snapshot.tracks,
    };

    match arrangement {
        Arrangement::GroupedFlow => {
            let ordered = grouped_sort::grouped_sort(tracks);
            let metrics: Vec<TrackMetrics> =
                ordered.iter().map(TrackMetrics::from_track).collect();
            let ratings = flow::rate_sequence(&metrics);
            let score = flow::playlist_score(&ratings);
            RenderModel {
                chart: chart_series(&metrics),
                tracks: ordered,
                flow_ratings: Some(ratings),
                playlist_score: score,
                target_curve: Vec::new(),
            }
        }
        Arrangement::Curve(shape) => {
            let band = shape.band();
            let eligible: Vec<Track> = tracks
                .into_iter()
                .filter(|track| band.admits(&TrackMetrics::from_track(track)))
                .collect();
            let total_duration_ms: i64 = eligible.iter().map(|t| t.duration_ms).sum();
            let curve = shape.generate(total_duration_ms, eligible.len());
            let ordered = curve_match::match_to_curve(eligible, &curve);
            let metrics: Vec<TrackMetrics> =
                ordered.iter().map(TrackMetrics::from_track).collect();
            RenderModel {
                chart: chart_series(&metrics),
                tracks: ordered,
                flow_ratings: None,
                playlist_score: None,
                target_curve: curve,
            }
        }
        Arrangement::Identity => {
            let metrics: Vec<TrackMetrics> = tracks.iter().map(TrackMetrics::from_track).collect();
            RenderModel {
                chart: chart_series(&metrics),
                tracks,
                flow_ratings: None,
                playlist_score: None,
                target_curve: Vec::new(),
            }
        }
    }
}

fn chart_series(metrics: &[TrackMetrics]) -> Vec<ChartPoint> {
    metrics
        .iter()
        .map(|m| ChartPoint {
            energy: m.energy,
            valence: m.valence,
            tempo: m.tempo,
            danceability: m.danceability,
            key: m.key as f64 / 12.0,
            mode: m.mode as f64,
        })
        .collect()
}
