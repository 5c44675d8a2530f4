//! Batch cutout of whole video files through the system `ffmpeg` binary.
//!
//! Frames are decoded to raw RGBA over a pipe, cut out onto white around the
//! pose silhouette, and encoded as VP9 with an alpha plane into WebM.

pub mod decode;
pub mod encode;
pub mod info;
pub mod pipeline;

pub use decode::FfmpegDecoder;
pub use encode::{EncodeConfig, WebmEncoder, webm_path};
pub use info::{VideoInfo, ffmpeg_tools_available, processing_dimensions, read_video_info};
pub use pipeline::{
    CutoutJob, FrameReader, FrameWriter, VideoOptions, VideoReport, VideoStats, cutout_frames,
    process_video,
};
