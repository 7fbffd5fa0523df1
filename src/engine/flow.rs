//! Flow scoring: transition compatibility ratings between adjacent tracks.

use super::features::TrackMetrics;

/// Rating assigned to the opening track, which has no predecessor.
pub const SEED_RATING: f64 = 10.0;

/// Ratings never drop below this floor.
const MIN_RATING: f64 = 1.0;

/// Rate the transition from `prev` into `next` on a 1-10 scale, higher being
/// a smoother transition.
///
/// Key distance here is plain absolute difference, not circular pitch-class
/// distance; [`super::curve_match::harmonic_distance`] is the circular
/// variant. The two formulas are intentionally distinct and must not be
/// unified, since doing so would change visible scores.
pub fn transition_rating(prev: &TrackMetrics, next: &TrackMetrics) -> f64 {
    let key_distance = (prev.key - next.key).abs() as f64;
    let mode_distance = if prev.mode == next.mode { 0.0 } else { 1.0 };
    let tempo_delta = (prev.tempo - next.tempo).abs();
    let energy_delta = (prev.energy - next.energy).abs();

    let rating = 10.0 - (key_distance + mode_distance + tempo_delta / 10.0 + energy_delta * 10.0);
    rating.max(MIN_RATING)
}

/// Per-position ratings for an ordered sequence: the seed rating for the
/// first track, then one transition rating per adjacent pair.
pub fn rate_sequence(metrics: &[TrackMetrics]) -> Vec<f64> {
    metrics
        .iter()
        .enumerate()
        .map(|(i, m)| {
            if i == 0 {
                SEED_RATING
            } else {
                transition_rating(&metrics[i - 1], m)
            }
        })
        .collect()
}

/// Mean of the per-position ratings, i.e. the aggregate playlist score.
/// `None` for an empty sequence: no division by zero, no NaN.
pub fn playlist_score(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(key: i32, mode: i32, tempo: f64, energy: f64) -> TrackMetrics {
        TrackMetrics {
            energy,
            valence: 0.5,
            tempo,
            danceability: 0.5,
            key,
            mode,
            time_signature: 4,
        }
    }

    #[test]
    fn identical_tracks_rate_ten() {
        let m = metrics(0, 1, 120.0, 0.5);
        assert_eq!(transition_rating(&m, &m), 10.0);
    }

    #[test]
    fn rating_is_symmetric() {
        // Every term is an absolute difference, so direction cannot matter.
        let a = metrics(2, 1, 100.0, 0.3);
        let b = metrics(7, 0, 140.0, 0.9);
        assert_eq!(transition_rating(&a, &b), transition_rating(&b, &a));
    }

    #[test]
    fn rating_never_drops_below_one() {
        let a = metrics(0, 0, 60.0, 0.0);
        let b = metrics(11, 1, 200.0, 1.0);
        // 10 - (11 + 1 + 14 + 10) is far below zero; clamped to the floor.
        assert_eq!(transition_rating(&a, &b), 1.0);
    }

    #[test]
    fn key_distance_is_linear_not_circular() {
        // C (0) to B (11) is one semitone on the circle, but this scorer
        // uses the plain difference of 11.
        let a = metrics(0, 1, 120.0, 0.5);
        let b = metrics(11, 1, 120.0, 0.5);
        assert_eq!(transition_rating(&a, &b), 1.0); // 10 - 11, clamped
    }

    #[test]
    fn component_weights() {
        let base = metrics(0, 1, 120.0, 0.5);

        // 20 BPM apart costs 2 points
        let faster = metrics(0, 1, 140.0, 0.5);
        assert!((transition_rating(&base, &faster) - 8.0).abs() < 1e-9);

        // 0.2 energy apart costs 2 points
        let louder = metrics(0, 1, 120.0, 0.7);
        assert!((transition_rating(&base, &louder) - 8.0).abs() < 1e-9);

        // mode flip costs 1 point
        let minor = metrics(0, 0, 120.0, 0.5);
        assert!((transition_rating(&base, &minor) - 9.0).abs() < 1e-9);
    }

    #[test]
    fn sequence_starts_with_seed_rating() {
        let seq = vec![
            metrics(0, 1, 120.0, 0.5),
            metrics(0, 1, 120.0, 0.5),
            metrics(0, 1, 140.0, 0.5),
        ];
        let ratings = rate_sequence(&seq);
        assert_eq!(ratings.len(), 3);
        assert_eq!(ratings[0], SEED_RATING);
        assert_eq!(ratings[1], 10.0);
        assert!((ratings[2] - 8.0).abs() < 1e-9);
    }

    #[test]
    fn single_track_sequence() {
        let ratings = rate_sequence(&[metrics(3, 0, 90.0, 0.2)]);
        assert_eq!(ratings, vec![SEED_RATING]);
    }

    #[test]
    fn score_is_mean_of_ratings() {
        assert_eq!(playlist_score(&[10.0, 8.0, 6.0]), Some(8.0));
    }

    #[test]
    fn empty_sequence_has_no_score() {
        assert_eq!(playlist_score(&[]), None);
        assert!(rate_sequence(&[]).is_empty());
    }
}
