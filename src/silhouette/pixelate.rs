use crate::foundation::{
    core::Dimensions,
    error::{SkeletorError, SkeletorResult},
};

/// Low-resolution drawing size for block size `factor`.
///
/// Rounds up, so a ragged last row or column of blocks still gets its own
/// small pixel and is cropped at the output edge.
pub fn pixelated_dimensions(output: Dimensions, factor: u32) -> Dimensions {
    let factor = factor.max(1);
    Dimensions::new(
        output.width.div_ceil(factor).max(1),
        output.height.div_ceil(factor).max(1),
    )
}

/// Nearest-neighbour upscale of an RGBA8 raster into `factor`×`factor` blocks.
///
/// Output pixel `(x, y)` takes small pixel `(x / factor, y / factor)`, clamped
/// to the last row and column if `small_dims` is too small to cover `output`.
pub fn block_upscale(
    small: &[u8],
    small_dims: Dimensions,
    output: Dimensions,
    factor: u32,
) -> SkeletorResult<Vec<u8>> {
    if small.len() != small_dims.rgba_len() || small_dims.is_empty() {
        return Err(SkeletorError::dimension(format!(
            "block upscale source is {} bytes for {small_dims}",
            small.len()
        )));
    }
    let factor = factor.max(1) as usize;
    let (sw, sh) = (small_dims.width as usize, small_dims.height as usize);
    let ow = output.width as usize;

    let mut out = vec![0u8; output.rgba_len()];
    for (y, row) in out.chunks_exact_mut(ow * 4).enumerate() {
        let sy = (y / factor).min(sh - 1);
        let src_row = &small[sy * sw * 4..(sy + 1) * sw * 4];
        for (x, px) in row.chunks_exact_mut(4).enumerate() {
            let sx = (x / factor).min(sw - 1);
            px.copy_from_slice(&src_row[sx * 4..sx * 4 + 4]);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/silhouette/pixelate.rs"]
mod tests;
