//! Named mood curves: target trajectories over playlist positions, plus the
//! eligibility band each curve implies.
//!
//! A curve choice is a single policy: the generator that produces per-position
//! targets and the band-pass used to pre-select eligible tracks live on the
//! same type, so the two halves cannot drift apart.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;

use super::features::TrackMetrics;

/// A per-position target point on a mood curve.
///
/// Energy and valence are 0-1. The tempo target is also on the generators'
/// 0-1 scale while track tempo is raw BPM; the matcher compares them as-is,
/// which makes the tempo term dominate for BPM-scale inputs. That asymmetry
/// is preserved from the shipped behavior.
///
/// Key/mode targets are optional; the built-in generators do not emit them,
/// and matching skips the harmonic term when they are absent.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub energy: f64,
    pub valence: f64,
    pub tempo: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<i32>,
}

impl CurvePoint {
    fn new(energy: f64, valence: f64, tempo: f64) -> Self {
        CurvePoint {
            energy,
            valence,
            tempo,
            key: None,
            mode: None,
        }
    }
}

/// Inclusive eligibility band implied by a curve choice. Tempo is in BPM.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CurveBand {
    pub energy: (f64, f64),
    pub valence: (f64, f64),
    pub tempo: (f64, f64),
    pub danceability: (f64, f64),
}

impl CurveBand {
    const fn pass_all() -> Self {
        CurveBand {
            energy: (0.0, 1.0),
            valence: (0.0, 1.0),
            tempo: (0.0, f64::MAX),
            danceability: (0.0, 1.0),
        }
    }

    /// Whether a track's metrics fall inside every band.
    pub fn admits(&self, m: &TrackMetrics) -> bool {
        m.energy >= self.energy.0
            && m.energy <= self.energy.1
            && m.valence >= self.valence.0
            && m.valence <= self.valence.1
            && m.tempo >= self.tempo.0
            && m.tempo <= self.tempo.1
            && m.danceability >= self.danceability.0
            && m.danceability <= self.danceability.1
    }
}

/// The named curve shapes. Each is a pure function of position index and
/// track count; total playlist duration is accepted by [`CurveShape::generate`]
/// but unused, since the shapes are defined over position, not elapsed time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveShape {
    /// Energy rises linearly across the playlist.
    SmoothAscend,
    /// Energy oscillates through four sine peaks.
    EnergeticPeaks,
    /// Tempo descends linearly toward the end.
    EveningChill,
    /// Energy and tempo alternate high/mid every other position.
    DynamicRollercoaster,
    /// Everything held to a narrow mid-range band.
    MellowVibes,
    /// Valence rises linearly across the playlist.
    DarkToLight,
}

impl CurveShape {
    pub const ALL: [CurveShape; 6] = [
        CurveShape::SmoothAscend,
        CurveShape::EnergeticPeaks,
        CurveShape::EveningChill,
        CurveShape::DynamicRollercoaster,
        CurveShape::MellowVibes,
        CurveShape::DarkToLight,
    ];

    /// Canonical wire name.
    pub fn name(&self) -> &'static str {
        match self {
            CurveShape::SmoothAscend => "smooth_ascend",
            CurveShape::EnergeticPeaks => "energetic_peaks",
            CurveShape::EveningChill => "evening_chill",
            CurveShape::DynamicRollercoaster => "dynamic_rollercoaster",
            CurveShape::MellowVibes => "mellow_vibes",
            CurveShape::DarkToLight => "dark_to_light",
        }
    }

    /// Accepted aliases for each shape.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CurveShape::SmoothAscend => &["get_party_going"],
            CurveShape::EnergeticPeaks => &["high_energy_peaks"],
            CurveShape::EveningChill => &["relaxed_evening"],
            CurveShape::DynamicRollercoaster => &["build_up_release"],
            CurveShape::MellowVibes => &[],
            CurveShape::DarkToLight => &[],
        }
    }

    /// Parse a curve name, canonical or alias. `None` for unrecognized names;
    /// callers fall back to identity ordering rather than erroring.
    pub fn parse(name: &str) -> Option<CurveShape> {
        CurveShape::ALL
            .into_iter()
            .find(|shape| shape.name() == name || shape.aliases().iter().any(|a| *a == name))
    }

    /// Generate the target curve for `track_count` positions.
    pub fn generate(&self, _total_duration_ms: i64, track_count: usize) -> Vec<CurvePoint> {
        let n = track_count as f64;
        (0..track_count)
            .map(|i| {
                let t = i as f64 / n;
                match self {
                    CurveShape::SmoothAscend => CurvePoint::new(t, 0.5, 0.5),
                    CurveShape::EnergeticPeaks => {
                        CurvePoint::new((t * 4.0 * PI).sin() * 0.5 + 0.5, 0.5, 0.5)
                    }
                    CurveShape::EveningChill => CurvePoint::new(0.5, 0.5, 1.0 - t),
                    CurveShape::DynamicRollercoaster => {
                        if i % 2 == 0 {
                            CurvePoint::new(1.0, 0.5, 1.0)
                        } else {
                            CurvePoint::new(0.5, 0.5, 0.5)
                        }
                    }
                    CurveShape::MellowVibes => CurvePoint::new(0.45, 0.45, 0.45),
                    CurveShape::DarkToLight => CurvePoint::new(0.5, t, 0.5),
                }
            })
            .collect()
    }

    /// Eligibility band paired with this shape.
    ///
    /// The high-variance shapes admit everything: their whole point is to
    /// span the range, so pre-filtering would fight the generator.
    pub fn band(&self) -> CurveBand {
        match self {
            CurveShape::SmoothAscend => CurveBand {
                energy: (0.2, 0.8),
                valence: (0.2, 0.8),
                tempo: (80.0, 120.0),
                danceability: (0.2, 0.8),
            },
            CurveShape::EveningChill => CurveBand {
                energy: (0.1, 0.5),
                valence: (0.1, 0.5),
                tempo: (60.0, 100.0),
                danceability: (0.1, 0.5),
            },
            CurveShape::MellowVibes => CurveBand {
                energy: (0.3, 0.6),
                valence: (0.3, 0.6),
                tempo: (70.0, 110.0),
                danceability: (0.3, 0.6),
            },
            CurveShape::EnergeticPeaks
            | CurveShape::DynamicRollercoaster
            | CurveShape::DarkToLight => CurveBand::pass_all(),
        }
    }
}

impl fmt::Display for CurveShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
