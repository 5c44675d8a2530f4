use crate::foundation::{
    core::Dimensions,
    error::SkeletorResult,
    math::unpremultiply_rgba8_in_place,
};

/// One premultiplied RGBA8 raster target.
pub struct Surface {
    dims: Dimensions,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface").field("dims", &self.dims).finish()
    }
}

impl Surface {
    /// Transparent surface of `dims`; fails past the `u16` limit of the rasterizer.
    pub fn new(dims: Dimensions) -> SkeletorResult<Self> {
        let (w, h) = dims.to_u16()?;
        Ok(Self {
            dims,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Premultiplied RGBA8, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Mutable pixels. Writers must keep color channels at or below alpha.
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }

    /// Fills every pixel with one premultiplied color.
    pub fn clear(&mut self, premul_rgba: [u8; 4]) {
        for px in self.data_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul_rgba);
        }
    }

    pub fn clear_transparent(&mut self) {
        self.data_mut().fill(0);
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.dims.width || y >= self.dims.height {
            return None;
        }
        let i = (y as usize * self.dims.width as usize + x as usize) * 4;
        let d = self.data();
        Some([d[i], d[i + 1], d[i + 2], d[i + 3]])
    }

    /// Straight-alpha copy, suitable for PNG export.
    pub fn to_straight_rgba(&self) -> Vec<u8> {
        let mut out = self.data().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Base,
    Silhouette,
    Difference,
    Skeleton,
}

impl Layer {
    /// Bottom to top.
    pub const ALL: [Layer; 4] = [
        Self::Base,
        Self::Silhouette,
        Self::Difference,
        Self::Skeleton,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Silhouette => "silhouette",
            Self::Difference => "difference",
            Self::Skeleton => "skeleton",
        }
    }
}

/// The four caller-visible layers plus the black-backed body raster used for scoring.
/// The four display layers plus the body raster used for scoring, all one size.
#[derive(Debug)]
pub struct RenderSurfaces {
    dims: Dimensions,
    pub base: Surface,
    pub silhouette: Surface,
    pub difference: Surface,
    pub skeleton: Surface,
    /// White silhouette flattened onto opaque black; never displayed.
    pub body: Surface,
}

impl RenderSurfaces {
    pub fn new(dims: Dimensions) -> SkeletorResult<Self> {
        Ok(Self {
            dims,
            base: Surface::new(dims)?,
            silhouette: Surface::new(dims)?,
            difference: Surface::new(dims)?,
            skeleton: Surface::new(dims)?,
            body: Surface::new(dims)?,
        })
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    pub fn layer(&self, layer: Layer) -> &Surface {
        match layer {
            Layer::Base => &self.base,
            Layer::Silhouette => &self.silhouette,
            Layer::Difference => &self.difference,
            Layer::Skeleton => &self.skeleton,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
