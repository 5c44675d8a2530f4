pub mod overlap;
pub mod policy;

pub use overlap::{BODY_ON_RED, MASK_ON_RED, OverlapCounts, OverlapScorer};
pub use policy::{MissedDetectionPolicy, ScoreTracker};
