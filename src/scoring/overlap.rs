use rayon::prelude::*;

use crate::foundation::error::{SkeletorError, SkeletorResult};

/// Mask pixels with a red channel above this are "on".
pub const MASK_ON_RED: u8 = 200;
/// Body pixels with a red channel above this are "on".
pub const BODY_ON_RED: u8 = 100;

/// Pixels per parallel work item.
const CHUNK_PIXELS: usize = 4096;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OverlapCounts {
    pub mask_on: u64,
    pub body_on: u64,
    pub overlap_on: u64,
}

impl OverlapCounts {
    fn merge(self, other: Self) -> Self {
        Self {
            mask_on: self.mask_on + other.mask_on,
            body_on: self.body_on + other.body_on,
            overlap_on: self.overlap_on + other.overlap_on,
        }
    }

    /// Dice coefficient as an integer percentage.
    pub fn dice_percent(self) -> u8 {
        if self.mask_on == 0 || self.body_on == 0 {
            return 0;
        }
        let dice = 2.0 * self.overlap_on as f64 / (self.mask_on + self.body_on) as f64;
        (100.0 * dice).round().clamp(0.0, 100.0) as u8
    }
}

/// Dice-coefficient similarity between a mask and a body raster.
///
/// Both inputs are RGBA8 of identical size. The body raster must be the
/// silhouette flattened onto opaque black so that only the silhouette can
/// light up the red channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlapScorer;

impl OverlapScorer {
    pub fn counts(mask_rgba: &[u8], body_rgba: &[u8]) -> SkeletorResult<OverlapCounts> {
        if mask_rgba.len() != body_rgba.len() || !mask_rgba.len().is_multiple_of(4) {
            return Err(SkeletorError::dimension(format!(
                "overlap inputs differ in size ({} vs {} bytes)",
                mask_rgba.len(),
                body_rgba.len()
            )));
        }

        let chunk = CHUNK_PIXELS * 4;
        let counts = mask_rgba
            .par_chunks(chunk)
            .zip(body_rgba.par_chunks(chunk))
            .map(|(m, b)| {
                let mut c = OverlapCounts::default();
                for (mp, bp) in m.chunks_exact(4).zip(b.chunks_exact(4)) {
                    let mask_on = mp[0] > MASK_ON_RED;
                    let body_on = bp[0] > BODY_ON_RED;
                    c.mask_on += u64::from(mask_on);
                    c.body_on += u64::from(body_on);
                    c.overlap_on += u64::from(mask_on && body_on);
                }
                c
            })
            .reduce(OverlapCounts::default, OverlapCounts::merge);
        Ok(counts)
    }

    pub fn score(mask_rgba: &[u8], body_rgba: &[u8]) -> SkeletorResult<u8> {
        Ok(Self::counts(mask_rgba, body_rgba)?.dice_percent())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scoring/overlap.rs"]
mod tests;
