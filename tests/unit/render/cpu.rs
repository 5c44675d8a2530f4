use super::*;
use crate::foundation::core::{Dimensions, Rect};

fn rect_path(r: Rect) -> BezPath {
    let mut p = BezPath::new();
    p.move_to((r.x0, r.y0));
    p.line_to((r.x1, r.y0));
    p.line_to((r.x1, r.y1));
    p.line_to((r.x0, r.y1));
    p.close_path();
    p
}

#[test]
fn fills_pixel_aligned_rect_exactly() {
    let mut s = Surface::new(Dimensions::new(16, 16)).unwrap();
    let mut r = Rasterizer::new();
    r.fill_paths(&mut s, &[(rect_path(Rect::new(4.0, 4.0, 12.0, 12.0)), Rgb8::WHITE)])
        .unwrap();
    assert_eq!(s.pixel(8, 8), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(4, 4), Some([255, 255, 255, 255]));
    assert_eq!(s.pixel(2, 2), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(12, 12), Some([0, 0, 0, 0]));
}

#[test]
fn refill_clears_previous_content() {
    let mut s = Surface::new(Dimensions::new(16, 16)).unwrap();
    let mut r = Rasterizer::new();
    r.fill_paths(&mut s, &[(rect_path(Rect::new(0.0, 0.0, 8.0, 8.0)), Rgb8::RED)])
        .unwrap();
    assert_eq!(s.pixel(1, 1), Some([255, 0, 0, 255]));
    r.fill_paths(&mut s, &[(rect_path(Rect::new(8.0, 8.0, 16.0, 16.0)), Rgb8::GREEN)])
        .unwrap();
    assert_eq!(s.pixel(1, 1), Some([0, 0, 0, 0]));
    assert_eq!(s.pixel(10, 10), Some([0, 255, 0, 255]));
}

#[test]
fn context_follows_target_size() {
    let mut r = Rasterizer::new();
    let mut small = Surface::new(Dimensions::new(8, 8)).unwrap();
    let mut large = Surface::new(Dimensions::new(40, 20)).unwrap();
    r.fill_paths(&mut small, &[(rect_path(Rect::new(0.0, 0.0, 8.0, 8.0)), Rgb8::WHITE)])
        .unwrap();
    r.fill_paths(&mut large, &[(rect_path(Rect::new(30.0, 10.0, 40.0, 20.0)), Rgb8::WHITE)])
        .unwrap();
    assert_eq!(large.pixel(35, 15), Some([255, 255, 255, 255]));
    assert_eq!(large.pixel(5, 5), Some([0, 0, 0, 0]));
}
