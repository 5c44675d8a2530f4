use imageproc::{distance_transform::Norm, morphology::dilate};

use crate::{
    config::Settings,
    foundation::{
        core::{Dimensions, VideoFrame},
        error::{SkeletorError, SkeletorResult},
    },
    pose::Pose,
    render::LayerCompositor,
};

/// Softening applied to a silhouette alpha before cutting out the frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FeatherParams {
    /// Chessboard dilation radius in pixels, capped at 255. Any nonzero alpha
    /// within the radius becomes fully opaque.
    pub dilation_iterations: u32,
    /// Gaussian kernel width; even values are bumped to the next odd value.
    pub blur_kernel_size: u32,
}

impl Default for FeatherParams {
    fn default() -> Self {
        Self {
            dilation_iterations: 10,
            blur_kernel_size: 21,
        }
    }
}

/// Gaussian sigma for a kernel width, as derived by common imaging libraries.
fn kernel_sigma(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Dilates then blurs a single-channel alpha map.
pub fn feather_alpha(alpha: &[u8], dims: Dimensions, params: FeatherParams) -> SkeletorResult<Vec<u8>> {
    if alpha.len() != dims.pixel_count() || dims.is_empty() {
        return Err(SkeletorError::dimension(format!(
            "alpha map is {} bytes for {dims}",
            alpha.len()
        )));
    }

    let mut img = image::GrayImage::from_raw(dims.width, dims.height, alpha.to_vec())
        .ok_or_else(|| SkeletorError::dimension("alpha map length mismatch"))?;
    if params.dilation_iterations > 0 {
        let radius = params.dilation_iterations.min(u32::from(u8::MAX)) as u8;
        img = dilate(&img, Norm::LInf, radius);
    }
    if params.blur_kernel_size > 1 {
        let kernel = params.blur_kernel_size | 1;
        img = image::imageops::blur(&img, kernel_sigma(kernel));
    }
    Ok(img.into_raw())
}

/// Red channel of an RGBA8 raster, e.g. a silhouette flattened onto black.
pub fn red_channel(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4).map(|px| px[0]).collect()
}

/// Frame pixels inside the alpha, white outside; alpha is carried into the output.
pub fn cutout_on_white(frame_rgba: &[u8], alpha: &[u8]) -> SkeletorResult<Vec<u8>> {
    if frame_rgba.len() != alpha.len() * 4 {
        return Err(SkeletorError::dimension(format!(
            "frame is {} bytes, alpha is {} pixels",
            frame_rgba.len(),
            alpha.len()
        )));
    }
    let mut out = Vec::with_capacity(frame_rgba.len());
    for (px, &a) in frame_rgba.chunks_exact(4).zip(alpha) {
        let t = f32::from(a) / 255.0;
        for &c in &px[..3] {
            let v = f32::from(c) * t + 255.0 * (1.0 - t);
            out.push(v.round().clamp(0.0, 255.0) as u8);
        }
        out.push(a);
    }
    Ok(out)
}

/// Cuts the subject of `frame` out onto white using the pose silhouette.
///
/// `source` is the resolution the pose was detected at; the silhouette is
/// scaled from it to the frame size. The compositor is resized on demand, so
/// one instance can be reused across frames. Pixelation is ignored.
pub fn render_cutout(
    compositor: &mut LayerCompositor,
    frame: &VideoFrame,
    pose: Option<&Pose>,
    source: Dimensions,
    settings: &Settings,
    feather: FeatherParams,
) -> SkeletorResult<Vec<u8>> {
    let dims = frame.dimensions();
    if compositor.dimensions() != Some(dims) {
        compositor.resize(dims)?;
    }
    let settings = Settings {
        silhouette_pixelation: 1,
        ..settings.clone()
    };
    compositor.render_silhouette(pose, source, &settings)?;
    let body = &compositor
        .surfaces()
        .ok_or_else(|| SkeletorError::dimension("render surfaces not initialized"))?
        .body;
    let alpha = feather_alpha(&red_channel(body.data()), dims, feather)?;
    cutout_on_white(&frame.rgba8, &alpha)
}

#[cfg(test)]
#[path = "../../tests/unit/render/cutout.rs"]
mod tests;
