//! Grouped harmonic sort: the default track ordering.
//!
//! Tracks are bucketed by (key, mode), sorted inside each bucket by tempo and
//! energy, and the buckets concatenated in order of first appearance. The
//! result is a stable, deterministic permutation of the input.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::features::TrackMetrics;
use crate::track::Track;

/// Stable grouped permutation of `tracks`.
///
/// Grouping is by the (key, mode) pair of the extracted metrics, so tracks
/// without analysis data all land in the (0, 0) group. Within a group ties on
/// (tempo, energy) keep input order.
pub fn grouped_sort(tracks: Vec<Track>) -> Vec<Track> {
    let total = tracks.len();
    let mut group_order: Vec<(i32, i32)> = Vec::new();
    let mut groups: HashMap<(i32, i32), Vec<(TrackMetrics, Track)>> = HashMap::new();

    for track in tracks {
        let metrics = TrackMetrics::from_track(&track);
        let group_key = (metrics.key, metrics.mode);
        if !groups.contains_key(&group_key) {
            group_order.push(group_key);
        }
        groups.entry(group_key).or_default().push((metrics, track));
    }

    let mut sorted = Vec::with_capacity(total);
    for group_key in group_order {
        if let Some(mut group) = groups.remove(&group_key) {
            group.sort_by(|a, b| {
                a.0.tempo
                    .partial_cmp(&b.0.tempo)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| {
                        a.0.energy
                            .partial_cmp(&b.0.energy)
                            .unwrap_or(Ordering::Equal)
                    })
            });
            sorted.extend(group.into_iter().map(|(_, track)| track));
        }
    }

    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::AudioFeatures;

    fn track(name: &str, key: i32, mode: i32, tempo: f64, energy: f64) -> Track {
        Track {
            name: name.to_string(),
            artists: vec![],
            album: String::new(),
            duration_ms: 0,
            uri: format!("service:track:{}", name),
            audio_features: Some(AudioFeatures {
                energy: Some(energy),
                tempo: Some(tempo),
                key: Some(key),
                mode: Some(mode),
                ..Default::default()
            }),
        }
    }

    fn names(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn sorts_within_group_by_tempo() {
        // Same (key, mode) group, lower tempo first
        let sorted = grouped_sort(vec![
            track("a", 0, 1, 120.0, 0.5),
            track("b", 0, 1, 100.0, 0.3),
        ]);
        assert_eq!(names(&sorted), vec!["b", "a"]);
    }

    #[test]
    fn tempo_ties_break_on_energy() {
        let sorted = grouped_sort(vec![
            track("loud", 5, 0, 110.0, 0.9),
            track("quiet", 5, 0, 110.0, 0.2),
        ]);
        assert_eq!(names(&sorted), vec!["quiet", "loud"]);
    }

    #[test]
    fn groups_keep_first_seen_order() {
        let sorted = grouped_sort(vec![
            track("g_major", 7, 1, 140.0, 0.5),
            track("a_minor", 9, 0, 90.0, 0.5),
            track("g_major_slow", 7, 1, 100.0, 0.5),
        ]);
        // The (7,1) group was seen first, so both its tracks come before the
        // (9,0) track even though the latter has the lowest tempo overall.
        assert_eq!(names(&sorted), vec!["g_major_slow", "g_major", "a_minor"]);
    }

    #[test]
    fn is_idempotent() {
        let input = vec![
            track("a", 2, 1, 130.0, 0.6),
            track("b", 2, 1, 95.0, 0.4),
            track("c", 4, 0, 110.0, 0.8),
            track("d", 2, 0, 105.0, 0.1),
        ];
        let once = grouped_sort(input);
        let twice = grouped_sort(once.clone());
        assert_eq!(names(&once), names(&twice));
    }

    #[test]
    fn is_a_permutation() {
        let input = vec![
            track("a", 1, 0, 80.0, 0.2),
            track("b", 3, 1, 170.0, 0.9),
            track("c", 1, 0, 80.0, 0.2),
            track("d", 0, 0, 0.0, 0.0),
        ];
        let mut expected: Vec<String> = input.iter().map(|t| t.name.clone()).collect();
        let sorted = grouped_sort(input);
        let mut got: Vec<String> = sorted.iter().map(|t| t.name.clone()).collect();
        expected.sort();
        got.sort();
        assert_eq!(expected, got);
    }

    #[test]
    fn identical_metrics_preserve_input_order() {
        let sorted = grouped_sort(vec![
            track("first", 6, 1, 120.0, 0.5),
            track("second", 6, 1, 120.0, 0.5),
            track("third", 6, 1, 120.0, 0.5),
        ]);
        assert_eq!(names(&sorted), vec!["first", "second", "third"]);
    }

    #[test]
    fn tracks_without_analysis_land_in_zero_group() {
        let mut no_features = track("bare", 0, 0, 0.0, 0.0);
        no_features.audio_features = None;
        let sorted = grouped_sort(vec![
            track("zeroed", 0, 0, 0.0, 0.0),
            no_features,
            track("keyed", 5, 1, 100.0, 0.5),
        ]);
        // Both analysis-less tracks share the (0,0) group created first.
        assert_eq!(names(&sorted), vec!["zeroed", "bare", "keyed"]);
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(grouped_sort(vec![]).is_empty());
    }
}
