use std::{
    path::{Path, PathBuf},
    process::{Child, ChildStdin, Command, Stdio},
};

use crate::{
    foundation::error::{SkeletorError, SkeletorResult},
    video::pipeline::FrameWriter,
};

#[derive(Clone, Debug)]
pub struct EncodeConfig {
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
    /// Passed to libvpx as `-threads`; `None` lets ffmpeg decide.
    pub threads: Option<usize>,
}

impl EncodeConfig {
    pub fn validate(&self) -> SkeletorResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(SkeletorError::validation(
                "encode width/height must be non-zero",
            ));
        }
        if self.fps_num == 0 || self.fps_den == 0 {
            return Err(SkeletorError::validation("encode fps must be non-zero"));
        }
        if self.threads == Some(0) {
            return Err(SkeletorError::validation("encode threads must be >= 1 when set"));
        }
        Ok(())
    }

    fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}

/// `path` with its extension forced to `.webm`, the only container used for
/// transparent output.
pub fn webm_path(path: &Path) -> PathBuf {
    let is_webm = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("webm"));
    if is_webm {
        path.to_path_buf()
    } else {
        path.with_extension("webm")
    }
}

fn ensure_parent_dir(path: &Path) -> SkeletorResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Pipes straight RGBA frames into `ffmpeg`, producing VP9 `yuva420p` WebM.
pub struct WebmEncoder {
    cfg: EncodeConfig,
    child: Child,
    stdin: Option<ChildStdin>,
    frames_written: u64,
}

impl WebmEncoder {
    pub fn new(cfg: EncodeConfig) -> SkeletorResult<Self> {
        cfg.validate()?;
        ensure_parent_dir(&cfg.out_path)?;

        if !cfg.overwrite && cfg.out_path.exists() {
            return Err(SkeletorError::validation(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", cfg.width, cfg.height),
            "-r",
            &format!("{}/{}", cfg.fps_num, cfg.fps_den),
            "-i",
            "pipe:0",
            "-an",
            "-c:v",
            "libvpx-vp9",
            "-pix_fmt",
            "yuva420p",
            "-deadline",
            "realtime",
            "-cpu-used",
            "8",
            "-b:v",
            "1M",
            "-row-mt",
            "1",
        ]);
        if let Some(n) = cfg.threads {
            cmd.args(["-threads", &n.to_string()]);
        }
        cmd.arg(&cfg.out_path);

        let mut child = cmd.spawn().map_err(|e| {
            SkeletorError::media(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| SkeletorError::media("failed to open ffmpeg stdin"))?;

        Ok(Self {
            cfg,
            child,
            stdin: Some(stdin),
            frames_written: 0,
        })
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Closes the pipe and waits for the container to be finalized.
    pub fn finish(mut self) -> SkeletorResult<()> {
        drop(self.stdin.take());

        let output = self
            .child
            .wait_with_output()
            .map_err(|e| SkeletorError::media(format!("failed to wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            return Err(SkeletorError::media(format!(
                "ffmpeg encoder exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        tracing::info!(
            frames = self.frames_written,
            path = %self.cfg.out_path.display(),
            "webm written"
        );
        Ok(())
    }
}

impl FrameWriter for WebmEncoder {
    fn write_frame(&mut self, rgba: &[u8]) -> SkeletorResult<()> {
        if rgba.len() != self.cfg.frame_len() {
            return Err(SkeletorError::dimension(format!(
                "frame is {} bytes, encoder expects {}x{}",
                rgba.len(),
                self.cfg.width,
                self.cfg.height
            )));
        }
        let Some(stdin) = self.stdin.as_mut() else {
            return Err(SkeletorError::media("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin
            .write_all(rgba)
            .map_err(|e| SkeletorError::media(format!("failed to write frame to ffmpeg: {e}")))?;
        self.frames_written += 1;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/video/encode.rs"]
mod tests;
