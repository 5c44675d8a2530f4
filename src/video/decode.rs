use std::{
    io::Read,
    process::{Child, ChildStdout, Command, Stdio},
};

use crate::{
    foundation::{
        core::{Dimensions, VideoFrame},
        error::{SkeletorError, SkeletorResult},
    },
    video::{info::VideoInfo, pipeline::FrameReader},
};

/// Streams raw RGBA frames out of an `ffmpeg` child process.
pub struct FfmpegDecoder {
    dims: Dimensions,
    child: Child,
    stdout: Option<ChildStdout>,
    frames_read: u64,
}

impl FfmpegDecoder {
    /// Starts decoding `info.path`, scaled to `output` when it differs from the source.
    pub fn open(info: &VideoInfo, output: Dimensions) -> SkeletorResult<Self> {
        if output.is_empty() {
            return Err(SkeletorError::dimension(format!(
                "cannot decode into {output}"
            )));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd.args(["-v", "error", "-i"]).arg(&info.path).arg("-an");
        if output != info.dimensions() {
            cmd.args([
                "-vf",
                &format!("scale={}:{}:flags=bilinear", output.width, output.height),
            ]);
        }
        cmd.args(["-f", "rawvideo", "-pix_fmt", "rgba", "pipe:1"]);

        let mut child = cmd
            .spawn()
            .map_err(|e| SkeletorError::media(format!("failed to spawn ffmpeg decoder: {e}")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SkeletorError::media("failed to open ffmpeg stdout"))?;

        Ok(Self {
            dims: output,
            child,
            stdout: Some(stdout),
            frames_read: 0,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Waits for `ffmpeg` to exit and surfaces its stderr on failure.
    pub fn finish(mut self) -> SkeletorResult<()> {
        drop(self.stdout.take());
        let output = self
            .child
            .wait_with_output()
            .map_err(|e| SkeletorError::media(format!("failed to wait for ffmpeg: {e}")))?;
        if !output.status.success() {
            return Err(SkeletorError::media(format!(
                "ffmpeg decoder exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        tracing::debug!(frames = self.frames_read, "decoder finished");
        Ok(())
    }
}

impl FrameReader for FfmpegDecoder {
    fn read_frame(&mut self) -> SkeletorResult<Option<VideoFrame>> {
        let Some(stdout) = self.stdout.as_mut() else {
            return Ok(None);
        };
        let mut buf = vec![0u8; self.dims.rgba_len()];
        let filled = read_full(stdout, &mut buf)
            .map_err(|e| SkeletorError::media(format!("failed to read decoded frame: {e}")))?;
        if filled == 0 {
            self.stdout = None;
            return Ok(None);
        }
        if filled < buf.len() {
            return Err(SkeletorError::media(format!(
                "truncated frame {}: {filled} of {} bytes",
                self.frames_read,
                buf.len()
            )));
        }
        self.frames_read += 1;
        VideoFrame::new(self.dims.width, self.dims.height, buf).map(Some)
    }
}

/// Reads until `buf` is full or the stream ends; returns the bytes filled.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
