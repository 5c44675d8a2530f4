use super::*;

fn gradient(dims: Dimensions) -> Vec<u8> {
    let mut out = Vec::with_capacity(dims.rgba_len());
    for y in 0..dims.height {
        for x in 0..dims.width {
            out.extend_from_slice(&[x as u8, y as u8, (x * 7 + y * 13) as u8, 255]);
        }
    }
    out
}

#[test]
fn dimensions_round_up_with_minimum_one() {
    assert_eq!(
        pixelated_dimensions(Dimensions::new(640, 480), 7),
        Dimensions::new(92, 69)
    );
    assert_eq!(
        pixelated_dimensions(Dimensions::new(640, 480), 8),
        Dimensions::new(80, 60)
    );
    assert_eq!(
        pixelated_dimensions(Dimensions::new(5, 5), 16),
        Dimensions::new(1, 1)
    );
    assert_eq!(
        pixelated_dimensions(Dimensions::new(640, 480), 0),
        Dimensions::new(640, 480)
    );
}

#[test]
fn every_block_is_uniform_and_exactly_factor_wide() {
    for factor in [1u32, 2, 3, 8] {
        let out_dims = Dimensions::new(24, 24);
        let small_dims = pixelated_dimensions(out_dims, factor);
        let small = gradient(small_dims);
        let out = block_upscale(&small, small_dims, out_dims, factor).unwrap();
        let f = factor as usize;
        let px = |x: usize, y: usize| &out[(y * 24 + x) * 4..(y * 24 + x) * 4 + 4];
        for y in 0..24 {
            for x in 0..24 {
                let block_origin = px(x / f * f, y / f * f);
                assert_eq!(px(x, y), block_origin, "factor {factor} at ({x},{y})");
            }
        }
        // Neighbouring blocks differ, so block edges sit exactly at multiples of `factor`.
        if f < 24 {
            assert_ne!(px(f - 1, 0), px(f, 0));
            assert_ne!(px(0, f - 1), px(0, f));
        }
    }
}

#[test]
fn ragged_edge_gets_its_own_cropped_block() {
    let out_dims = Dimensions::new(10, 3);
    let small_dims = pixelated_dimensions(out_dims, 4);
    assert_eq!(small_dims, Dimensions::new(3, 1));
    let small = gradient(small_dims);
    let out = block_upscale(&small, small_dims, out_dims, 4).unwrap();
    assert_eq!(&out[7 * 4..7 * 4 + 4], &small[4..8]);
    assert_eq!(&out[8 * 4..8 * 4 + 4], &small[8..12]);
    assert_eq!(&out[9 * 4..9 * 4 + 4], &small[8..12]);
}

#[test]
fn undersized_source_clamps_to_last_block() {
    let out_dims = Dimensions::new(10, 3);
    let small_dims = Dimensions::new(2, 1);
    let small = gradient(small_dims);
    let out = block_upscale(&small, small_dims, out_dims, 4).unwrap();
    assert_eq!(&out[9 * 4..9 * 4 + 4], &small[4..8]);
}

#[test]
fn wrong_source_length_is_rejected() {
    let err = block_upscale(&[0; 4], Dimensions::new(2, 2), Dimensions::new(4, 4), 2).unwrap_err();
    assert!(matches!(err, SkeletorError::Dimension(_)));
}
