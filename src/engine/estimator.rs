use crate::{foundation::core::VideoFrame, pose::Pose};

/// Pose-estimation collaborator. At most one subject per frame.
pub trait PoseEstimator {
    /// `Ok(None)` means no subject was found; `Err` is a provider failure.
    fn estimate(&mut self, frame: &VideoFrame) -> anyhow::Result<Option<Pose>>;
}

impl<F> PoseEstimator for F
where
    F: FnMut(&VideoFrame) -> anyhow::Result<Option<Pose>>,
{
    fn estimate(&mut self, frame: &VideoFrame) -> anyhow::Result<Option<Pose>> {
        self(frame)
    }
}

/// Returns the same pose for every frame, e.g. one loaded from JSON.
#[derive(Clone, Debug, Default)]
pub struct FixedPose(pub Option<Pose>);

impl PoseEstimator for FixedPose {
    fn estimate(&mut self, _frame: &VideoFrame) -> anyhow::Result<Option<Pose>> {
        Ok(self.0.clone())
    }
}

/// Replays precomputed poses, one per frame in order; frames past the end
/// have no subject.
#[derive(Clone, Debug, Default)]
pub struct PoseSequence {
    poses: Vec<Option<Pose>>,
    next: usize,
}

impl PoseSequence {
    pub fn new(poses: Vec<Option<Pose>>) -> Self {
        Self { poses, next: 0 }
    }

    /// Parses a JSON array whose entries are a pose object or `null`.
    pub fn from_json(text: &str) -> anyhow::Result<Self> {
        use anyhow::Context as _;
        let poses = serde_json::from_str(text).context("parse pose sequence")?;
        Ok(Self::new(poses))
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }
}

impl PoseEstimator for PoseSequence {
    fn estimate(&mut self, _frame: &VideoFrame) -> anyhow::Result<Option<Pose>> {
        let pose = self.poses.get(self.next).cloned().flatten();
        self.next += 1;
        Ok(pose)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/estimator.rs"]
mod tests;
