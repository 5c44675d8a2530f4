pub mod capture;
pub mod estimator;
pub mod mode;
pub mod reconfigure;
pub mod scheduler;

pub use capture::{CaptureError, FrameSource, PlaybackState, StillSource, StreamConstraints};
pub use estimator::{FixedPose, PoseEstimator, PoseSequence};
pub use mode::{ModeSelector, RenderingMode};
pub use scheduler::{CycleOutcome, CycleStart, Engine, LoopState, PendingCycle, SkipReason};
