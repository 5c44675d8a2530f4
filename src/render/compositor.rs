use rayon::prelude::*;

use crate::{
    assets::MaskBuffer,
    config::Settings,
    foundation::{
        core::{BezPath, Dimensions, Rgb8, VideoFrame},
        error::{SkeletorError, SkeletorResult},
        math::premultiply_rgba8_in_place,
    },
    pose::{FACE_CONNECTIONS, Pose, SKELETON_CONNECTIONS},
    render::{
        composite::{flatten_coverage_onto_black, over_in_place, tint_coverage},
        cpu::Rasterizer,
        surface::{RenderSurfaces, Surface},
    },
    scoring::MASK_ON_RED,
    silhouette::{
        SilhouetteSynthesizer, SynthesisParams, block_upscale, pixelated_dimensions,
        synth::segment_quad,
    },
};

const OPAQUE_BLACK: [u8; 4] = [0, 0, 0, 255];
const OVERLAP_GREEN: [u8; 4] = [0, 255, 0, 255];
const CHUNK_PIXELS: usize = 4096;

/// Inputs for one frame of layer rendering.
#[derive(Clone, Copy, Debug)]
pub struct FrameInput<'a> {
    pub frame: Option<&'a VideoFrame>,
    pub pose: Option<&'a Pose>,
    pub mask: Option<&'a MaskBuffer>,
    /// Resolution the pose keypoints are expressed in.
    pub source: Dimensions,
}

/// Renders the base, silhouette, difference and skeleton layers.
///
/// Each layer lives on its own surface; stacking them is up to the caller.
#[derive(Debug, Default)]
pub struct LayerCompositor {
    surfaces: Option<RenderSurfaces>,
    raster: Rasterizer,
    coverage: Option<Surface>,
    small: Option<Surface>,
}

impl LayerCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.surfaces.as_ref().map(RenderSurfaces::dimensions)
    }

    pub fn surfaces(&self) -> Option<&RenderSurfaces> {
        self.surfaces.as_ref()
    }

    /// Recreates every surface at `dims`. Previous contents are dropped.
    pub fn resize(&mut self, dims: Dimensions) -> SkeletorResult<()> {
        if dims.is_empty() {
            return Err(SkeletorError::dimension(format!(
                "cannot create surfaces of {dims}"
            )));
        }
        self.surfaces = Some(RenderSurfaces::new(dims)?);
        self.coverage = Some(Surface::new(dims)?);
        self.small = None;
        Ok(())
    }

    fn surfaces_mut(&mut self) -> SkeletorResult<&mut RenderSurfaces> {
        self.surfaces
            .as_mut()
            .ok_or_else(|| SkeletorError::dimension("render surfaces not initialized"))
    }

    /// Base, silhouette, difference, then skeleton.
    ///
    /// Every layer is redrawn even when an earlier one fails, so no surface
    /// keeps content from a previous frame. The first error is returned.
    pub fn render_all(&mut self, input: &FrameInput<'_>, settings: &Settings) -> SkeletorResult<()> {
        let results = [
            self.render_base(input.frame, input.mask, settings),
            self.render_silhouette(input.pose, input.source, settings),
            self.render_difference(input.mask, settings),
            self.render_skeleton(input.pose, input.source, settings),
        ];
        results.into_iter().collect()
    }

    /// Live frame (or black), with the mask blended over at `mask_opacity`.
    pub fn render_base(
        &mut self,
        frame: Option<&VideoFrame>,
        mask: Option<&MaskBuffer>,
        settings: &Settings,
    ) -> SkeletorResult<()> {
        let surfaces = self.surfaces_mut()?;
        let dims = surfaces.dimensions();
        let base = &mut surfaces.base;

        match frame.filter(|_| settings.show_webcam) {
            Some(frame) => {
                if frame.dimensions() != dims {
                    base.clear(OPAQUE_BLACK);
                    return Err(SkeletorError::dimension(format!(
                        "frame is {}, surfaces are {dims}",
                        frame.dimensions()
                    )));
                }
                let data = base.data_mut();
                data.copy_from_slice(&frame.rgba8);
                premultiply_rgba8_in_place(data);
            }
            None => base.clear(OPAQUE_BLACK),
        }

        if settings.show_mask
            && let Some(mask) = mask
        {
            if mask.dimensions() != dims {
                return Err(SkeletorError::dimension(format!(
                    "mask buffer is {}, surfaces are {dims}",
                    mask.dimensions()
                )));
            }
            let mut premul = mask.rgba8.clone();
            premultiply_rgba8_in_place(&mut premul);
            over_in_place(base.data_mut(), &premul, settings.mask_opacity)?;
        }
        Ok(())
    }

    /// Synthesized body shapes, plus the black-backed body raster used for scoring.
    ///
    /// The body raster is produced whenever a pose is present, even when the
    /// silhouette layer itself is hidden.
    pub fn render_silhouette(
        &mut self,
        pose: Option<&Pose>,
        source: Dimensions,
        settings: &Settings,
    ) -> SkeletorResult<()> {
        let Self {
            surfaces,
            raster,
            coverage,
            small,
        } = self;
        let surfaces = surfaces
            .as_mut()
            .ok_or_else(|| SkeletorError::dimension("render surfaces not initialized"))?;
        let coverage = coverage
            .as_mut()
            .ok_or_else(|| SkeletorError::dimension("coverage surface not initialized"))?;
        let dims = surfaces.dimensions();

        surfaces.silhouette.clear_transparent();
        surfaces.body.clear(OPAQUE_BLACK);
        let Some(pose) = pose else {
            return Ok(());
        };
        if source.is_empty() {
            return Err(SkeletorError::dimension("pose source has zero size"));
        }

        let factor = settings.silhouette_pixelation.max(1);
        if factor == 1 {
            let params = SynthesisParams {
                scale_x: f64::from(dims.width) / f64::from(source.width),
                scale_y: f64::from(dims.height) / f64::from(source.height),
                thickness: settings.silhouette_thickness,
            };
            let fills = silhouette_fills(pose, settings, params);
            raster.fill_paths(coverage, &fills)?;
        } else {
            let small_dims = pixelated_dimensions(dims, factor);
            if small.as_ref().map(Surface::dimensions) != Some(small_dims) {
                *small = Some(Surface::new(small_dims)?);
            }
            let target = small
                .as_mut()
                .ok_or_else(|| SkeletorError::dimension("pixelation surface not initialized"))?;
            // Same mapping as the full-size path, shrunk by the block size, so
            // block `i` covers output pixels `i * factor..(i + 1) * factor`.
            let inv = 1.0 / f64::from(factor);
            let params = SynthesisParams {
                scale_x: f64::from(dims.width) / f64::from(source.width) * inv,
                scale_y: f64::from(dims.height) / f64::from(source.height) * inv,
                thickness: settings.silhouette_thickness * inv,
            };
            let fills = silhouette_fills(pose, settings, params);
            raster.fill_paths(target, &fills)?;
            let upscaled = block_upscale(target.data(), small_dims, dims, factor)?;
            coverage.data_mut().copy_from_slice(&upscaled);
        }

        if settings.show_silhouette {
            tint_coverage(
                surfaces.silhouette.data_mut(),
                coverage.data(),
                settings.silhouette_color,
                settings.silhouette_opacity,
            )?;
        }
        flatten_coverage_onto_black(surfaces.body.data_mut(), coverage.data())
    }

    /// Opaque green where the mask is on and the silhouette layer is painted.
    pub fn render_difference(
        &mut self,
        mask: Option<&MaskBuffer>,
        settings: &Settings,
    ) -> SkeletorResult<()> {
        let surfaces = self.surfaces_mut()?;
        let dims = surfaces.dimensions();
        surfaces.difference.clear_transparent();
        if !settings.show_difference {
            return Ok(());
        }
        let Some(mask) = mask else {
            return Ok(());
        };
        if mask.dimensions() != dims {
            return Err(SkeletorError::dimension(format!(
                "mask buffer is {}, surfaces are {dims}",
                mask.dimensions()
            )));
        }

        let RenderSurfaces {
            difference,
            silhouette,
            ..
        } = surfaces;
        let chunk = CHUNK_PIXELS * 4;
        difference
            .data_mut()
            .par_chunks_mut(chunk)
            .zip(mask.rgba8.par_chunks(chunk))
            .zip(silhouette.data().par_chunks(chunk))
            .for_each(|((d, m), s)| {
                for ((dp, mp), sp) in d
                    .chunks_exact_mut(4)
                    .zip(m.chunks_exact(4))
                    .zip(s.chunks_exact(4))
                {
                    if mp[0] > MASK_ON_RED && sp[3] != 0 {
                        dp.copy_from_slice(&OVERLAP_GREEN);
                    }
                }
            });
        Ok(())
    }

    /// Connection lines between valid keypoint pairs, then a marker per valid keypoint.
    pub fn render_skeleton(
        &mut self,
        pose: Option<&Pose>,
        source: Dimensions,
        settings: &Settings,
    ) -> SkeletorResult<()> {
        let Self {
            surfaces, raster, ..
        } = self;
        let surfaces = surfaces
            .as_mut()
            .ok_or_else(|| SkeletorError::dimension("render surfaces not initialized"))?;
        let dims = surfaces.dimensions();

        let fills = match pose.filter(|_| settings.show_skeleton) {
            Some(pose) if !source.is_empty() => {
                let params = SynthesisParams {
                    scale_x: f64::from(dims.width) / f64::from(source.width),
                    scale_y: f64::from(dims.height) / f64::from(source.height),
                    thickness: settings.skeleton_line_width,
                };
                skeleton_fills(pose, settings, params)
            }
            _ => Vec::new(),
        };
        raster.fill_paths(&mut surfaces.skeleton, &fills)
    }
}

fn silhouette_fills(pose: &Pose, settings: &Settings, params: SynthesisParams) -> Vec<(BezPath, Rgb8)> {
    SilhouetteSynthesizer::synthesize(pose, settings, params)
        .iter()
        .map(|p| (p.shape.to_path(), Rgb8::WHITE))
        .collect()
}

fn skeleton_fills(pose: &Pose, settings: &Settings, params: SynthesisParams) -> Vec<(BezPath, Rgb8)> {
    let threshold = settings.detection_threshold;
    let map = |p: kurbo::Point| kurbo::Point::new(p.x * params.scale_x, p.y * params.scale_y);
    let mut fills = Vec::new();

    for (a, b) in SKELETON_CONNECTIONS.iter().chain(FACE_CONNECTIONS.iter()) {
        let (Some(pa), Some(pb)) = (
            pose.valid_point(*a, threshold),
            pose.valid_point(*b, threshold),
        ) else {
            continue;
        };
        if let Some(quad) = segment_quad(map(pa), map(pb), params.thickness / 2.0) {
            fills.push((quad.to_path(), settings.skeleton_color));
        }
    }

    let radius = settings.keypoint_size / 2.0;
    if radius > 0.0 {
        for kp in pose.valid_keypoints(threshold) {
            let marker = crate::silhouette::Shape::Disc {
                center: map(kp.position()),
                radius,
            };
            fills.push((marker.to_path(), settings.keypoint_color));
        }
    }
    fills
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
