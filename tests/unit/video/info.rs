use super::*;

#[test]
fn ratios_parse_and_reject_zero() {
    assert_eq!(parse_ff_ratio("30/1"), Some((30, 1)));
    assert_eq!(parse_ff_ratio(" 30000/1001 "), Some((30000, 1001)));
    assert_eq!(parse_ff_ratio("0/0"), None);
    assert_eq!(parse_ff_ratio("25/0"), None);
    assert_eq!(parse_ff_ratio("25"), None);
}

#[test]
fn processing_width_scales_down_only() {
    let hd = Dimensions::new(1920, 1080);
    assert_eq!(processing_dimensions(hd, Some(640)), Dimensions::new(640, 360));
    assert_eq!(processing_dimensions(hd, Some(1920)), hd);
    assert_eq!(processing_dimensions(hd, Some(4000)), hd);
    assert_eq!(processing_dimensions(hd, Some(0)), hd);
    assert_eq!(processing_dimensions(hd, None), hd);
}

#[test]
fn processed_height_is_rounded_up_to_even() {
    // 166.5 floors to an even 166.
    assert_eq!(
        processing_dimensions(Dimensions::new(1000, 333), Some(500)),
        Dimensions::new(500, 166)
    );
    // 101.5 floors to 101, then rounds up to 102.
    assert_eq!(
        processing_dimensions(Dimensions::new(1000, 335), Some(303)),
        Dimensions::new(303, 102)
    );
    assert_eq!(
        processing_dimensions(Dimensions::new(1000, 1), Some(10)),
        Dimensions::new(10, 2)
    );
}

#[test]
fn fps_is_the_rational_value() {
    let info = VideoInfo {
        path: PathBuf::from("clip.mp4"),
        width: 4,
        height: 2,
        fps_num: 30000,
        fps_den: 1001,
        frame_count: None,
        duration_sec: 0.0,
    };
    assert!((info.fps() - 29.97).abs() < 0.01);
    assert_eq!(info.dimensions(), Dimensions::new(4, 2));
}
