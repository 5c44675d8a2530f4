use crate::foundation::core::{Dimensions, Point};

/// Aspect-preserving fit of a video frame into a square model input with
/// centered padding, and the inverse mapping for model output coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LetterboxTransform {
    frame: Dimensions,
    input_size: u32,
    scale: f64,
    pad_x: f64,
    pad_y: f64,
}

impl LetterboxTransform {
    pub fn new(frame: Dimensions, input_size: u32) -> Self {
        let size = f64::from(input_size);
        let (w, h) = (f64::from(frame.width), f64::from(frame.height));
        let scale = if frame.is_empty() {
            1.0
        } else {
            (size / h).min(size / w)
        };
        let new_w = (w * scale).floor() as u32;
        let new_h = (h * scale).floor() as u32;
        Self {
            frame,
            input_size,
            scale,
            pad_x: f64::from(input_size.saturating_sub(new_w) / 2),
            pad_y: f64::from(input_size.saturating_sub(new_h) / 2),
        }
    }

    pub fn input_size(&self) -> u32 {
        self.input_size
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Content placement inside the model input as `(x, y, width, height)`.
    pub fn content_rect(&self) -> (u32, u32, u32, u32) {
        (
            self.pad_x as u32,
            self.pad_y as u32,
            (f64::from(self.frame.width) * self.scale).floor() as u32,
            (f64::from(self.frame.height) * self.scale).floor() as u32,
        )
    }

    /// Maps normalized model coordinates back to frame pixels, clipped to the frame.
    pub fn to_frame(&self, x_norm: f64, y_norm: f64) -> Point {
        let size = f64::from(self.input_size);
        let x = (x_norm * size - self.pad_x) / self.scale;
        let y = (y_norm * size - self.pad_y) / self.scale;
        let max_x = f64::from(self.frame.width.saturating_sub(1));
        let max_y = f64::from(self.frame.height.saturating_sub(1));
        Point::new(x.clamp(0.0, max_x), y.clamp(0.0, max_y))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pose/letterbox.rs"]
mod tests;
