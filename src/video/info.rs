use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use crate::foundation::{
    core::Dimensions,
    error::{SkeletorError, SkeletorResult},
};

/// Stream properties of an input video, as reported by `ffprobe`.
#[derive(Clone, Debug, PartialEq)]
pub struct VideoInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    /// Container frame count; many WebM and MKV files do not carry one.
    pub frame_count: Option<u64>,
    pub duration_sec: f64,
}

impl VideoInfo {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn fps(&self) -> f64 {
        f64::from(self.fps_num) / f64::from(self.fps_den)
    }
}

fn tool_on_path(name: &str) -> bool {
    Command::new(name)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Both `ffmpeg` and `ffprobe` can be launched.
pub fn ffmpeg_tools_available() -> bool {
    tool_on_path("ffmpeg") && tool_on_path("ffprobe")
}

/// Runs `ffprobe` on `path` and reads the first video stream's properties.
#[tracing::instrument(skip(path), fields(path = %path.display()))]
pub fn read_video_info(path: &Path) -> SkeletorResult<VideoInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
        nb_frames: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(path)
        .output()
        .map_err(|e| SkeletorError::media(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(SkeletorError::media(format!(
            "ffprobe failed for '{}': {}",
            path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| SkeletorError::media(format!("ffprobe json parse failed: {e}")))?;
    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| SkeletorError::media(format!("no video stream in '{}'", path.display())))?;
    let (Some(width), Some(height)) = (stream.width, stream.height) else {
        return Err(SkeletorError::media("ffprobe reported no video size"));
    };
    if width == 0 || height == 0 {
        return Err(SkeletorError::dimension(format!(
            "video '{}' is {width}x{height}",
            path.display()
        )));
    }
    let (fps_num, fps_den) = stream
        .r_frame_rate
        .as_deref()
        .and_then(parse_ff_ratio)
        .ok_or_else(|| SkeletorError::media("invalid video frame rate"))?;

    let info = VideoInfo {
        path: path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        frame_count: stream
            .nb_frames
            .as_deref()
            .and_then(|n| n.parse().ok())
            .filter(|n| *n > 0),
        duration_sec: parsed
            .format
            .as_ref()
            .and_then(|f| f.duration.as_deref())
            .and_then(|d| d.parse().ok())
            .unwrap_or(0.0),
    };
    tracing::debug!(dims = %info.dimensions(), fps = info.fps(), frames = ?info.frame_count, "video inspected");
    Ok(info)
}

/// Parses ffmpeg's `num/den` rationals. A zero numerator or denominator is rejected.
pub(crate) fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let (num, den) = s.trim().split_once('/')?;
    let num: u32 = num.parse().ok()?;
    let den: u32 = den.parse().ok()?;
    (num > 0 && den > 0).then_some((num, den))
}

/// Size frames are processed and encoded at.
///
/// A `processing_width` narrower than the source scales the frame down with
/// the aspect ratio kept and the height rounded up to even. Anything else keeps
/// the source size.
pub fn processing_dimensions(source: Dimensions, processing_width: Option<u32>) -> Dimensions {
    match processing_width {
        Some(w) if w > 0 && w < source.width => {
            let h = (u64::from(w) * u64::from(source.height) / u64::from(source.width)) as u32;
            Dimensions::new(w, (h + h % 2).max(2))
        }
        _ => source,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/info.rs"]
mod tests;
