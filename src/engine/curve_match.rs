//! Curve matching: reorders tracks to best fit a target curve.

use std::cmp::Ordering;

use super::curve::CurvePoint;
use super::features::TrackMetrics;
use crate::track::Track;

/// Circular distance between two pitch classes plus a mode-mismatch penalty.
///
/// This is the circular variant used for curve matching;
/// [`super::flow::transition_rating`] deliberately uses the plain linear
/// difference instead.
pub fn harmonic_distance(key1: i32, mode1: i32, key2: i32, mode2: i32) -> f64 {
    let d = (key1 - key2).abs();
    let circular = d.min(12 - d) as f64;
    let mode_penalty = if mode1 == mode2 { 0.0 } else { 1.0 };
    circular + mode_penalty
}

fn position_cost(m: &TrackMetrics, target: &CurvePoint) -> f64 {
    let mut cost = (m.energy - target.energy).abs()
        + (m.valence - target.valence).abs()
        + (m.tempo - target.tempo).abs();
    if let (Some(key), Some(mode)) = (target.key, target.mode) {
        cost += harmonic_distance(m.key, m.mode, key, mode);
    }
    cost
}

/// Reorder `tracks` by ascending fit cost against the same-index curve point.
///
/// Greedy per-position scoring, not an optimal assignment: each track is
/// scored against its own input position only, then the whole list is sorted
/// by that cost. Ties keep input order. Callers generate the curve at the
/// (filtered) track count, so every position normally has a target; a track
/// past the end of a shorter curve sorts last.
pub fn match_to_curve(tracks: Vec<Track>, curve: &[CurvePoint]) -> Vec<Track> {
    let mut scored: Vec<(f64, Track)> = tracks
        .into_iter()
        .enumerate()
        .map(|(i, track)| {
            let metrics = TrackMetrics::from_track(&track);
            let cost = curve
                .get(i)
                .map(|target| position_cost(&metrics, target))
                .unwrap_or(f64::INFINITY);
            (cost, track)
        })
        .collect();

    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(_, track)| track).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::AudioFeatures;

    fn track(name: &str, energy: f64, valence: f64, tempo: f64) -> Track {
        Track {
            name: name.to_string(),
            artists: vec![],
            album: String::new(),
            duration_ms: 0,
            uri: format!("service:track:{}", name),
            audio_features: Some(AudioFeatures {
                energy: Some(energy),
                valence: Some(valence),
                tempo: Some(tempo),
                key: Some(0),
                mode: Some(1),
                ..Default::default()
            }),
        }
    }

    fn point(energy: f64, valence: f64, tempo: f64) -> CurvePoint {
        CurvePoint {
            energy,
            valence,
            tempo,
            key: None,
            mode: None,
        }
    }

    fn names(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn harmonic_distance_wraps_around_the_circle() {
        // C to B is one semitone going the short way
        assert_eq!(harmonic_distance(0, 1, 11, 1), 1.0);
        assert_eq!(harmonic_distance(0, 1, 6, 1), 6.0);
        assert_eq!(harmonic_distance(3, 1, 3, 1), 0.0);
    }

    #[test]
    fn harmonic_distance_penalizes_mode_mismatch() {
        assert_eq!(harmonic_distance(0, 1, 0, 0), 1.0);
        assert_eq!(harmonic_distance(11, 0, 1, 1), 3.0);
    }

    #[test]
    fn perfect_fit_keeps_input_order() {
        // Every track exactly matches its own curve point: all costs zero,
        // so the stable sort must not move anything.
        let tracks = vec![
            track("a", 0.1, 0.5, 0.5),
            track("b", 0.6, 0.5, 0.5),
            track("c", 0.9, 0.5, 0.5),
        ];
        let curve = vec![
            point(0.1, 0.5, 0.5),
            point(0.6, 0.5, 0.5),
            point(0.9, 0.5, 0.5),
        ];
        let matched = match_to_curve(tracks, &curve);
        assert_eq!(names(&matched), vec!["a", "b", "c"]);
    }

    #[test]
    fn orders_by_ascending_cost() {
        // Costs: a = 0.8 off, b = 0.0 off, c = 0.3 off
        let tracks = vec![
            track("a", 0.9, 0.5, 0.5),
            track("b", 0.5, 0.5, 0.5),
            track("c", 0.2, 0.5, 0.5),
        ];
        let curve = vec![
            point(0.1, 0.5, 0.5),
            point(0.5, 0.5, 0.5),
            point(0.5, 0.5, 0.5),
        ];
        let matched = match_to_curve(tracks, &curve);
        assert_eq!(names(&matched), vec!["b", "c", "a"]);
    }

    #[test]
    fn harmonic_target_contributes_when_present() {
        let near = track("near", 0.5, 0.5, 0.5); // key 0 major
        let mut far = track("far", 0.5, 0.5, 0.5);
        if let Some(f) = far.audio_features.as_mut() {
            f.key = Some(6);
            f.mode = Some(0);
        }

        let mut target = point(0.5, 0.5, 0.5);
        target.key = Some(0);
        target.mode = Some(1);

        // "far" comes first in the input but its harmonic cost pushes it back.
        let matched = match_to_curve(vec![far, near], &[target, target]);
        assert_eq!(names(&matched), vec!["near", "far"]);
    }

    #[test]
    fn tracks_past_curve_end_sort_last() {
        let tracks = vec![track("extra", 0.5, 0.5, 0.5), track("fits", 0.5, 0.5, 0.5)];
        // Single-point curve: index 0 ("extra") has a target, index 1 does not
        // -- but infinity lands on "fits" here, so "extra" leads.
        let matched = match_to_curve(tracks, &[point(0.5, 0.5, 0.5)]);
        assert_eq!(names(&matched), vec!["extra", "fits"]);
    }

    #[test]
    fn empty_inputs() {
        assert!(match_to_curve(vec![], &[]).is_empty());
        let matched = match_to_curve(vec![], &[point(0.5, 0.5, 0.5)]);
        assert!(matched.is_empty());
    }
}
