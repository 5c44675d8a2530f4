use rayon::prelude::*;

use crate::foundation::{
    core::Rgb8,
    error::{SkeletorError, SkeletorResult},
    math::mul_div255_u8,
};

pub type PremulRgba8 = [u8; 4];

const CHUNK_BYTES: usize = 4096 * 4;

/// Opacity in [0,1] as a 0..=255 multiplier.
fn opacity_u16(opacity: f32) -> u16 {
    ((opacity.clamp(0.0, 1.0) * 255.0).round() as i32).clamp(0, 255) as u16
}

/// Source-over for premultiplied pixels, with the source scaled by `opacity`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let op = opacity_u16(opacity);
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255 - u16::from(sa);
    std::array::from_fn(|i| {
        let s = if i == 3 {
            sa
        } else {
            mul_div255_u8(u16::from(src[i]), op)
        };
        s.saturating_add(mul_div255_u8(u16::from(dst[i]), inv))
    })
}

pub fn over_in_place(dst: &mut [u8], src: &[u8], opacity: f32) -> SkeletorResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(SkeletorError::dimension(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    dst.par_chunks_mut(CHUNK_BYTES)
        .zip(src.par_chunks(CHUNK_BYTES))
        .for_each(|(d, s)| {
            for (d, s) in d.chunks_exact_mut(4).zip(s.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], opacity);
                d.copy_from_slice(&out);
            }
        });
    Ok(())
}

/// Writes `color` at `opacity`, weighted by the alpha of `coverage`, into `dst`.
pub fn tint_coverage(dst: &mut [u8], coverage: &[u8], color: Rgb8, opacity: f32) -> SkeletorResult<()> {
    if dst.len() != coverage.len() {
        return Err(SkeletorError::dimension(
            "tint_coverage expects equal-length rgba8 buffers",
        ));
    }
    let op = opacity_u16(opacity);
    dst.par_chunks_mut(CHUNK_BYTES)
        .zip(coverage.par_chunks(CHUNK_BYTES))
        .for_each(|(d, c)| {
            for (d, c) in d.chunks_exact_mut(4).zip(c.chunks_exact(4)) {
                let a = mul_div255_u8(u16::from(c[3]), op);
                d[0] = mul_div255_u8(u16::from(color.r), u16::from(a));
                d[1] = mul_div255_u8(u16::from(color.g), u16::from(a));
                d[2] = mul_div255_u8(u16::from(color.b), u16::from(a));
                d[3] = a;
            }
        });
    Ok(())
}

/// Renders `coverage` as white on opaque black: every channel carries the coverage alpha.
pub fn flatten_coverage_onto_black(dst: &mut [u8], coverage: &[u8]) -> SkeletorResult<()> {
    if dst.len() != coverage.len() {
        return Err(SkeletorError::dimension(
            "flatten_coverage_onto_black expects equal-length rgba8 buffers",
        ));
    }
    dst.par_chunks_mut(CHUNK_BYTES)
        .zip(coverage.par_chunks(CHUNK_BYTES))
        .for_each(|(d, c)| {
            for (d, c) in d.chunks_exact_mut(4).zip(c.chunks_exact(4)) {
                let a = c[3];
                d.copy_from_slice(&[a, a, a, 255]);
            }
        });
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
