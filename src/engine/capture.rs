use image::imageops::FilterType;

use crate::{
    assets::DecodedImage,
    foundation::core::{Dimensions, Resolution, VideoFrame},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Ended,
}

/// What to ask the capture device for.
///
/// The default value carries no constraints and is the fallback when an exact
/// request is rejected.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamConstraints {
    pub device_id: Option<String>,
    pub resolution: Option<Resolution>,
}

impl StreamConstraints {
    pub fn exact(device_id: Option<String>, resolution: Resolution) -> Self {
        Self {
            device_id,
            resolution: Some(resolution),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        self.device_id.is_none() && self.resolution.is_none()
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The device cannot satisfy the requested constraints.
    #[error("capture constraints rejected: {0}")]
    ConstraintRejected(String),

    #[error("capture unavailable: {0}")]
    Unavailable(String),
}

/// Live video collaborator.
pub trait FrameSource {
    /// Current stream size; zero until the first frame is available.
    fn dimensions(&self) -> Dimensions;

    fn playback(&self) -> PlaybackState;

    fn play(&mut self) -> Result<(), CaptureError>;

    /// Most recent frame only. Older frames are dropped, never queued.
    fn latest_frame(&mut self) -> Option<VideoFrame>;

    fn open_stream(&mut self, constraints: &StreamConstraints) -> Result<(), CaptureError>;

    fn release_stream(&mut self);
}

/// A still image served as an endless video stream.
///
/// Requested resolutions are honored by resampling the image.
#[derive(Clone, Debug)]
pub struct StillSource {
    image: DecodedImage,
    frame: Option<VideoFrame>,
    state: PlaybackState,
}

impl StillSource {
    pub fn new(image: DecodedImage) -> Self {
        Self {
            image,
            frame: None,
            state: PlaybackState::Paused,
        }
    }

    fn resampled(&self, dims: Dimensions) -> Result<VideoFrame, CaptureError> {
        let rgba8 = if dims == self.image.dimensions() {
            self.image.rgba8.as_ref().clone()
        } else {
            let img = self
                .image
                .to_rgba_image()
                .map_err(|e| CaptureError::Unavailable(e.to_string()))?;
            image::imageops::resize(&img, dims.width, dims.height, FilterType::Triangle).into_raw()
        };
        VideoFrame::new(dims.width, dims.height, rgba8)
            .map_err(|e| CaptureError::Unavailable(e.to_string()))
    }
}

impl FrameSource for StillSource {
    fn dimensions(&self) -> Dimensions {
        self.frame
            .as_ref()
            .map(VideoFrame::dimensions)
            .unwrap_or_default()
    }

    fn playback(&self) -> PlaybackState {
        self.state
    }

    fn play(&mut self) -> Result<(), CaptureError> {
        if self.frame.is_none() {
            return Err(CaptureError::Unavailable("no stream open".to_owned()));
        }
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn latest_frame(&mut self) -> Option<VideoFrame> {
        self.frame.clone()
    }

    fn open_stream(&mut self, constraints: &StreamConstraints) -> Result<(), CaptureError> {
        if constraints.device_id.is_some() {
            return Err(CaptureError::ConstraintRejected(
                "still source has no selectable devices".to_owned(),
            ));
        }
        let dims = constraints
            .resolution
            .map(Resolution::dimensions)
            .unwrap_or_else(|| self.image.dimensions());
        self.frame = Some(self.resampled(dims)?);
        self.state = PlaybackState::Playing;
        Ok(())
    }

    fn release_stream(&mut self) {
        self.frame = None;
        self.state = PlaybackState::Ended;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/capture.rs"]
mod tests;
