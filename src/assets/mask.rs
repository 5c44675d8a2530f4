use std::{path::Path, sync::Arc};

use image::imageops::FilterType;

use crate::{
    assets::decode::{DecodedImage, read_image_file},
    foundation::{
        core::Dimensions,
        error::{SkeletorError, SkeletorResult},
    },
};

/// Reference mask resampled to the current output size (straight RGBA8).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MaskBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba8: Vec<u8>,
}

impl MaskBuffer {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Decodes the reference mask once and keeps one buffer at output size.
#[derive(Debug, Default)]
pub struct MaskBufferCache {
    source: Option<Arc<DecodedImage>>,
    buffer: Option<MaskBuffer>,
}

impl MaskBufferCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the mask at `path`, replacing any previously loaded mask.
    ///
    /// On failure the cache is left empty so that scoring stops rather than
    /// comparing against a stale mask.
    #[tracing::instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load(&mut self, path: &Path) -> SkeletorResult<()> {
        self.source = None;
        self.buffer = None;

        let decoded = read_image_file(path).map_err(|e| {
            SkeletorError::asset_load(format!("mask {}: {e}", path.display()))
        })?;
        tracing::debug!(dims = %decoded.dimensions(), "mask decoded");
        self.source = Some(Arc::new(decoded));
        Ok(())
    }

    /// Use an already decoded image as the mask source.
    pub fn set_source(&mut self, image: DecodedImage) {
        self.buffer = None;
        self.source = Some(Arc::new(image));
    }

    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// Re-rasterize the decoded mask to exactly `dims`, overwriting the cached buffer.
    pub fn resample(&mut self, dims: Dimensions) -> SkeletorResult<&MaskBuffer> {
        let source = self
            .source
            .as_ref()
            .ok_or_else(|| SkeletorError::asset_load("no mask loaded"))?;
        if dims.is_empty() {
            return Err(SkeletorError::dimension(format!(
                "cannot resample mask to {dims}"
            )));
        }

        let rgba8 = if source.dimensions() == dims {
            source.rgba8.as_ref().clone()
        } else {
            let img = source.to_rgba_image()?;
            image::imageops::resize(&img, dims.width, dims.height, FilterType::Triangle)
                .into_raw()
        };
        tracing::debug!(from = %source.dimensions(), to = %dims, "mask resampled");

        Ok(&*self.buffer.insert(MaskBuffer {
            width: dims.width,
            height: dims.height,
            rgba8,
        }))
    }

    pub fn buffer(&self) -> Option<&MaskBuffer> {
        self.buffer.as_ref()
    }

    /// The cached buffer, only if it matches `dims` exactly.
    pub fn buffer_for(&self, dims: Dimensions) -> Option<&MaskBuffer> {
        self.buffer.as_ref().filter(|b| b.dimensions() == dims)
    }

    pub fn invalidate(&mut self) {
        self.buffer = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/mask.rs"]
mod tests;
