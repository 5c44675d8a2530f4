use std::{path::Path, sync::Arc};

use anyhow::Context;

use crate::foundation::{
    core::Dimensions,
    error::{SkeletorError, SkeletorResult},
};

/// Decoded straight-alpha RGBA8 image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub rgba8: Arc<Vec<u8>>,
}

impl DecodedImage {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn to_rgba_image(&self) -> SkeletorResult<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.rgba8.as_ref().clone())
            .ok_or_else(|| SkeletorError::dimension("decoded image byte length mismatch"))
    }
}

/// Decode encoded image bytes into straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> SkeletorResult<DecodedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(SkeletorError::dimension("decoded image has zero size"));
    }

    Ok(DecodedImage {
        width,
        height,
        rgba8: Arc::new(rgba.into_raw()),
    })
}

/// Read and decode an image file.
pub fn read_image_file(path: &Path) -> SkeletorResult<DecodedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read image {}", path.display()))?;
    decode_image(&bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
