use crate::{
    foundation::{
        core::{BezPath, Point, Rgb8},
        error::SkeletorResult,
    },
    render::surface::Surface,
};

/// Fills kurbo paths into surfaces with `vello_cpu`, reusing one render context.
#[derive(Default)]
pub struct Rasterizer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer")
            .field("has_ctx", &self.ctx.is_some())
            .finish()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> R,
    ) -> R {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx);
        self.ctx = Some(ctx);
        out
    }

    /// Clears `target` to transparent and fills each path with its opaque color.
    pub fn fill_paths(&mut self, target: &mut Surface, fills: &[(BezPath, Rgb8)]) -> SkeletorResult<()> {
        let (w, h) = target.dimensions().to_u16()?;
        target.clear_transparent();
        if fills.is_empty() {
            return Ok(());
        }
        self.with_ctx_mut(w, h, |ctx| {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
            for (path, color) in fills {
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    color.r, color.g, color.b, 255,
                ));
                ctx.fill_path(&bezpath_to_cpu(path));
            }
            ctx.flush();
            ctx.render_to_pixmap(target.pixmap_mut());
        });
        Ok(())
    }
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
