use crate::{
    assets::MaskBufferCache,
    foundation::{core::Dimensions, error::SkeletorResult},
    render::compositor::LayerCompositor,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Surfaces and mask already match the source.
    Unchanged,
    /// Surfaces were (re)created at `to`, and the mask resampled if loaded.
    Resized {
        from: Option<Dimensions>,
        to: Dimensions,
    },
    /// Surfaces matched, but the mask buffer was missing or stale.
    MaskResampled(Dimensions),
    /// The source reported a zero size; nothing was touched.
    NotReady,
}

impl SyncOutcome {
    pub fn is_ready(self) -> bool {
        !matches!(self, Self::NotReady)
    }
}

/// Keeps render surfaces and the mask buffer at the live source resolution.
#[derive(Clone, Copy, Debug, Default)]
pub struct DimensionSynchronizer {
    resizes: u64,
}

impl DimensionSynchronizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of surface resizes performed so far.
    pub fn resize_count(&self) -> u64 {
        self.resizes
    }

    pub fn sync(
        &mut self,
        reported: Dimensions,
        compositor: &mut LayerCompositor,
        mask: &mut MaskBufferCache,
    ) -> SkeletorResult<SyncOutcome> {
        if reported.is_empty() {
            return Ok(SyncOutcome::NotReady);
        }

        let current = compositor.dimensions();
        if current == Some(reported) {
            if mask.is_loaded() && mask.buffer_for(reported).is_none() {
                mask.resample(reported)?;
                return Ok(SyncOutcome::MaskResampled(reported));
            }
            return Ok(SyncOutcome::Unchanged);
        }

        compositor.resize(reported)?;
        mask.invalidate();
        if mask.is_loaded() {
            mask.resample(reported)?;
        }
        self.resizes += 1;
        tracing::debug!(from = ?current, to = %reported, "render surfaces resized");
        Ok(SyncOutcome::Resized {
            from: current,
            to: reported,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/dimensions.rs"]
mod tests;
