use std::{fmt, str::FromStr};

use crate::foundation::error::{SkeletorError, SkeletorResult};

pub use kurbo::{BezPath, Point, Rect, Vec2};

/// Pixel size of a raster (video frame, render surface, mask buffer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A zero-sized source has not produced its first frame yet.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn rgba_len(self) -> usize {
        self.pixel_count() * 4
    }

    /// Dimensions as accepted by `vello_cpu`.
    pub fn to_u16(self) -> SkeletorResult<(u16, u16)> {
        let w: u16 = self
            .width
            .try_into()
            .map_err(|_| SkeletorError::dimension("surface width exceeds u16"))?;
        let h: u16 = self
            .height
            .try_into()
            .map_err(|_| SkeletorError::dimension("surface height exceeds u16"))?;
        Ok((w, h))
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Requested capture resolution, written as `"WIDTHxHEIGHT"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Resolution(Dimensions);

impl Resolution {
    pub fn new(width: u32, height: u32) -> SkeletorResult<Self> {
        let dims = Dimensions::new(width, height);
        if dims.is_empty() {
            return Err(SkeletorError::validation(format!(
                "resolution must be non-zero, got {dims}"
            )));
        }
        Ok(Self(dims))
    }

    pub fn dimensions(self) -> Dimensions {
        self.0
    }

    pub fn width(self) -> u32 {
        self.0.width
    }

    pub fn height(self) -> u32 {
        self.0.height
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self(Dimensions::new(640, 480))
    }
}

impl FromStr for Resolution {
    type Err = SkeletorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(|| SkeletorError::validation(format!("resolution '{s}' is not WxH")))?;
        let w: u32 = w
            .trim()
            .parse()
            .map_err(|_| SkeletorError::validation(format!("resolution width '{w}' is invalid")))?;
        let h: u32 = h
            .trim()
            .parse()
            .map_err(|_| SkeletorError::validation(format!("resolution height '{h}' is invalid")))?;
        Self::new(w, h)
    }
}

impl TryFrom<String> for Resolution {
    type Error = SkeletorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Resolution> for String {
    fn from(value: Resolution) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One captured video frame, straight RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba8: std::sync::Arc<Vec<u8>>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> SkeletorResult<Self> {
        let dims = Dimensions::new(width, height);
        if rgba8.len() != dims.rgba_len() {
            return Err(SkeletorError::dimension(format!(
                "frame is {} bytes, expected {} for {dims}",
                rgba8.len(),
                dims.rgba_len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8: std::sync::Arc::new(rgba8),
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }
}

/// Opaque color, written as `"#rrggbb"` in settings files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0);
    pub const GREEN: Self = Self::new(0, 255, 0);
    pub const CYAN: Self = Self::new(0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb8 {
    type Err = SkeletorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(SkeletorError::validation(format!(
                "color '{s}' must be #rrggbb"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| SkeletorError::validation(format!("color '{s}' must be #rrggbb")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb8 {
    type Error = SkeletorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb8> for String {
    fn from(value: Rgb8) -> Self {
        value.to_string()
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
