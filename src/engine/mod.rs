//! The track ordering and flow-scoring engine.
//!
//! Pure and synchronous throughout: every entry point takes an immutable
//! snapshot of tracks and returns a new ordering with derived scores. Missing
//! audio features never fail; they degrade to neutral defaults at the
//! extraction boundary.

pub mod curve;
pub mod curve_match;
pub mod features;
pub mod filter;
pub mod flow;
pub mod grouped_sort;
pub mod pipeline;

pub use curve::{CurveBand, CurvePoint, CurveShape};
pub use features::TrackMetrics;
pub use filter::FeatureBounds;
pub use pipeline::{recompute, Arrangement, CurationSnapshot, RenderModel};
