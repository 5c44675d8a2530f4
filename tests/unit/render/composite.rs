use super::*;

#[test]
fn over_with_opaque_source_replaces() {
    assert_eq!(over([10, 20, 30, 255], [200, 0, 0, 255], 1.0), [200, 0, 0, 255]);
}

#[test]
fn over_with_zero_opacity_keeps_destination() {
    assert_eq!(over([10, 20, 30, 255], [200, 0, 0, 255], 0.0), [10, 20, 30, 255]);
    assert_eq!(over([10, 20, 30, 255], [0, 0, 0, 0], 1.0), [10, 20, 30, 255]);
}

#[test]
fn half_opacity_white_over_black_is_mid_gray() {
    let out = over([0, 0, 0, 255], [255, 255, 255, 255], 0.5);
    assert_eq!(out, [128, 128, 128, 255]);
}

#[test]
fn over_in_place_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(over_in_place(&mut dst, &[0u8; 4], 1.0).is_err());
}

#[test]
fn tint_scales_color_by_coverage_and_opacity() {
    let coverage = [255, 255, 255, 255, 0, 0, 0, 0];
    let mut dst = [9u8; 8];
    tint_coverage(&mut dst, &coverage, Rgb8::new(255, 0, 0), 0.5).unwrap();
    assert_eq!(&dst[..4], &[128, 0, 0, 128]);
    assert_eq!(&dst[4..], &[0, 0, 0, 0]);
}

#[test]
fn flatten_puts_coverage_in_every_channel() {
    let coverage = [255, 255, 255, 255, 60, 60, 60, 60, 0, 0, 0, 0];
    let mut dst = [0u8; 12];
    flatten_coverage_onto_black(&mut dst, &coverage).unwrap();
    assert_eq!(dst, [255, 255, 255, 255, 60, 60, 60, 255, 0, 0, 0, 255]);
}
