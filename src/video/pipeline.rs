use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    config::Settings,
    engine::PoseEstimator,
    foundation::{
        core::{Dimensions, VideoFrame},
        error::{SkeletorError, SkeletorResult},
    },
    pose::Pose,
    render::{FeatherParams, LayerCompositor, render_cutout},
    video::{
        decode::FfmpegDecoder,
        encode::{EncodeConfig, WebmEncoder, webm_path},
        info::{processing_dimensions, read_video_info},
    },
};

/// Source of decoded frames, in presentation order.
pub trait FrameReader {
    /// `Ok(None)` once the input is exhausted.
    fn read_frame(&mut self) -> SkeletorResult<Option<VideoFrame>>;
}

/// Sink for straight RGBA8 output frames.
pub trait FrameWriter {
    fn write_frame(&mut self, rgba: &[u8]) -> SkeletorResult<()>;
}

impl FrameReader for std::vec::IntoIter<VideoFrame> {
    fn read_frame(&mut self) -> SkeletorResult<Option<VideoFrame>> {
        Ok(self.next())
    }
}

impl FrameWriter for Vec<Vec<u8>> {
    fn write_frame(&mut self, rgba: &[u8]) -> SkeletorResult<()> {
        self.push(rgba.to_vec());
        Ok(())
    }
}

/// Per-frame cutout parameters shared by every worker.
#[derive(Clone, Debug)]
pub struct CutoutJob {
    pub settings: Settings,
    pub feather: FeatherParams,
    /// Resolution the poses are expressed in.
    pub source: Dimensions,
    /// Resolution frames arrive and leave at.
    pub output: Dimensions,
    /// Worker threads; `None` uses every core.
    pub threads: Option<usize>,
    /// Frames estimated, then rendered in parallel, per batch.
    pub chunk_frames: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct VideoStats {
    pub frames_read: u64,
    pub frames_written: u64,
    pub frames_with_pose: u64,
    /// Frames replaced by a fully transparent frame after a render error.
    pub frames_failed: u64,
}

fn build_thread_pool(threads: Option<usize>) -> SkeletorResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(SkeletorError::validation(
            "video threads must be >= 1 when set",
        ));
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| SkeletorError::Other(anyhow::anyhow!("failed to build thread pool: {e}")))
}

/// Reads every frame, cuts the subject out around its pose, and writes the
/// results in input order.
///
/// Poses are estimated on the calling thread; rendering runs on a rayon pool
/// with one compositor per worker. A frame that fails to render is written as
/// transparent black and counted in [`VideoStats::frames_failed`]. Read and
/// write errors abort the run.
pub fn cutout_frames<R, E, W>(
    reader: &mut R,
    estimator: &mut E,
    writer: &mut W,
    job: &CutoutJob,
) -> SkeletorResult<VideoStats>
where
    R: FrameReader + ?Sized,
    E: PoseEstimator + ?Sized,
    W: FrameWriter + ?Sized,
{
    if job.output.is_empty() || job.source.is_empty() {
        return Err(SkeletorError::dimension(format!(
            "cutout job maps {} to {}",
            job.source, job.output
        )));
    }
    let pool = build_thread_pool(job.threads)?;
    let chunk = job.chunk_frames.max(1);
    let blank = vec![0u8; job.output.rgba_len()];
    let mut stats = VideoStats::default();

    loop {
        let mut batch: Vec<(VideoFrame, Option<Pose>)> = Vec::with_capacity(chunk);
        while batch.len() < chunk {
            let Some(frame) = reader.read_frame()? else {
                break;
            };
            let pose = match estimator.estimate(&frame) {
                Ok(pose) => pose,
                Err(e) => {
                    let err = SkeletorError::estimation(format!("{e:#}"));
                    tracing::warn!(frame = stats.frames_read, error = %err, "treating frame as no pose");
                    None
                }
            };
            stats.frames_read += 1;
            stats.frames_with_pose += u64::from(pose.is_some());
            batch.push((frame, pose));
        }
        if batch.is_empty() {
            break;
        }

        let rendered = pool.install(|| {
            batch
                .par_iter()
                .map_init(LayerCompositor::new, |compositor, (frame, pose)| {
                    render_cutout(
                        compositor,
                        frame,
                        pose.as_ref(),
                        job.source,
                        &job.settings,
                        job.feather,
                    )
                })
                .collect::<Vec<_>>()
        });

        let first = stats.frames_written;
        for (i, result) in rendered.into_iter().enumerate() {
            match result {
                Ok(rgba) if rgba.len() == blank.len() => writer.write_frame(&rgba)?,
                Ok(_) => {
                    tracing::warn!(frame = first + i as u64, "frame size does not match output");
                    stats.frames_failed += 1;
                    writer.write_frame(&blank)?;
                }
                Err(e) => {
                    tracing::warn!(frame = first + i as u64, error = %e, "frame cutout failed");
                    stats.frames_failed += 1;
                    writer.write_frame(&blank)?;
                }
            }
            stats.frames_written += 1;
        }
        tracing::debug!(written = stats.frames_written, "batch written");
    }
    Ok(stats)
}

/// Options for [`process_video`].
#[derive(Clone, Debug)]
pub struct VideoOptions {
    pub settings: Settings,
    pub feather: FeatherParams,
    /// Downscale frames to this width before processing, keeping the aspect ratio.
    pub processing_width: Option<u32>,
    pub threads: Option<usize>,
    pub chunk_frames: usize,
    pub overwrite: bool,
}

impl Default for VideoOptions {
    fn default() -> Self {
        Self {
            settings: Settings::default(),
            feather: FeatherParams::default(),
            processing_width: None,
            threads: None,
            chunk_frames: 32,
            overwrite: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct VideoReport {
    /// Where the WebM landed; the requested extension is replaced with `.webm`.
    pub out_path: PathBuf,
    pub dimensions: Dimensions,
    pub stats: VideoStats,
}

/// Cuts the subject out of every frame of `input` into a transparent WebM.
///
/// Poses from `estimator` are taken to be in the input video's pixel space.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
pub fn process_video<E: PoseEstimator + ?Sized>(
    input: &Path,
    output: &Path,
    estimator: &mut E,
    opts: &VideoOptions,
) -> SkeletorResult<VideoReport> {
    let info = read_video_info(input)?;
    let dims = processing_dimensions(info.dimensions(), opts.processing_width);
    let out_path = webm_path(output);
    if out_path != output {
        tracing::warn!(path = %out_path.display(), "transparent output requires .webm");
    }
    tracing::info!(source = %info.dimensions(), output = %dims, fps = info.fps(), "processing video");

    let mut decoder = FfmpegDecoder::open(&info, dims)?;
    let mut encoder = WebmEncoder::new(EncodeConfig {
        width: dims.width,
        height: dims.height,
        fps_num: info.fps_num,
        fps_den: info.fps_den,
        out_path: out_path.clone(),
        overwrite: opts.overwrite,
        threads: opts.threads,
    })?;
    let job = CutoutJob {
        settings: opts.settings.clone(),
        feather: opts.feather,
        source: info.dimensions(),
        output: dims,
        threads: opts.threads,
        chunk_frames: opts.chunk_frames,
    };

    let stats = cutout_frames(&mut decoder, estimator, &mut encoder, &job)?;
    decoder.finish()?;
    encoder.finish()?;

    match info.frame_count {
        Some(total) if stats.frames_written < total => {
            tracing::warn!(written = stats.frames_written, total, "fewer frames written than the container reports");
        }
        _ => {}
    }
    if stats.frames_written == 0 {
        tracing::warn!("no frames were written");
    }
    Ok(VideoReport {
        out_path,
        dimensions: dims,
        stats,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/video/pipeline.rs"]
mod tests;
