#![forbid(unsafe_code)]

pub mod assets;
pub mod config;
pub mod engine;
pub mod foundation;
pub mod pose;
pub mod render;
pub mod scoring;
pub mod silhouette;
pub mod video;

pub use assets::{MaskBuffer, MaskBufferCache};
pub use config::{Settings, SettingsDelta, SettingsObserver, SettingsPatch};
pub use engine::{
    CaptureError, CycleOutcome, Engine, FrameSource, LoopState, ModeSelector, PlaybackState,
    PoseEstimator, RenderingMode, StillSource, StreamConstraints,
};
pub use foundation::core::{Dimensions, Resolution, Rgb8, VideoFrame};
pub use foundation::error::{SkeletorError, SkeletorResult};
pub use pose::{Keypoint, KeypointName, LimbChain, Pose};
pub use render::{DimensionSynchronizer, Layer, LayerCompositor, RenderSurfaces, Surface};
pub use scoring::{MissedDetectionPolicy, OverlapScorer};
pub use silhouette::SilhouetteSynthesizer;
pub use video::{VideoOptions, VideoReport, process_video};
