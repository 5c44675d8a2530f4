use crate::foundation::error::{SkeletorError, SkeletorResult};

/// What the published score does on a frame without a pose.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum MissedDetectionPolicy {
    /// Keep the last score until a new pose arrives.
    #[default]
    Hold,
    /// Drop straight to zero.
    Reset,
    /// Subtract `step` per missed frame, stopping at zero.
    Decay { step: u8 },
}

impl MissedDetectionPolicy {
    pub fn validate(&self) -> SkeletorResult<()> {
        if let Self::Decay { step: 0 } = self {
            return Err(SkeletorError::validation(
                "missed_detection decay step must be > 0",
            ));
        }
        Ok(())
    }
}

/// Latest published score.
///
/// `None` until the first scored frame, and again after the mask is lost.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreTracker {
    latest: Option<u8>,
    missed_frames: u32,
}

impl ScoreTracker {
    pub fn latest(&self) -> Option<u8> {
        self.latest
    }

    pub fn missed_frames(&self) -> u32 {
        self.missed_frames
    }

    pub fn record(&mut self, score: u8) {
        self.latest = Some(score.min(100));
        self.missed_frames = 0;
    }

    pub fn record_miss(&mut self, policy: MissedDetectionPolicy) {
        self.missed_frames = self.missed_frames.saturating_add(1);
        self.latest = match (policy, self.latest) {
            (_, None) => None,
            (MissedDetectionPolicy::Hold, s) => s,
            (MissedDetectionPolicy::Reset, Some(_)) => Some(0),
            (MissedDetectionPolicy::Decay { step }, Some(s)) => Some(s.saturating_sub(step)),
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scoring/policy.rs"]
mod tests;
