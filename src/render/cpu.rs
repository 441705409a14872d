use crate::assets::color::ColorDef;
use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::{FanfareError, FanfareResult};
use crate::render::surface::{
    FrameRGBA, StateStack, Surface, TextAlign, TextBaseline, anchor_offset, check_font_size,
};
use crate::render::text::{FontBytes, TextBrush, TextShaper};

/// Options for [`CpuSurface`].
#[derive(Clone, Debug, Default)]
pub struct CpuSurfaceOpts {
    /// Font used for measuring and drawing text. Text calls fail without one.
    pub font: Option<FontBytes>,
    /// Color the surface is cleared to.
    pub background: ColorDef,
}

/// Raster surface backed by `vello_cpu`, with Parley for text shaping.
pub struct CpuSurface {
    viewport: Viewport,
    background: ColorDef,
    canvas: Option<CpuCanvas>,
    text: Option<TextShaper>,
    state: StateStack,
}

struct CpuCanvas {
    width: u16,
    height: u16,
    ctx: vello_cpu::RenderContext,
    pixmap: vello_cpu::Pixmap,
}

impl CpuCanvas {
    fn new(viewport: Viewport) -> FanfareResult<Option<Self>> {
        if viewport.is_degenerate() {
            return Ok(None);
        }
        let (w, h) = viewport.pixel_size();
        let width: u16 = w
            .try_into()
            .map_err(|_| FanfareError::render("surface width exceeds u16"))?;
        let height: u16 = h
            .try_into()
            .map_err(|_| FanfareError::render("surface height exceeds u16"))?;
        if width == 0 || height == 0 {
            return Ok(None);
        }
        Ok(Some(Self {
            width,
            height,
            ctx: vello_cpu::RenderContext::new(width, height),
            pixmap: vello_cpu::Pixmap::new(width, height),
        }))
    }
}

impl CpuSurface {
    pub fn new(viewport: Viewport, opts: CpuSurfaceOpts) -> FanfareResult<Self> {
        let text = match opts.font.as_ref() {
            Some(font) => Some(TextShaper::new(font)?),
            None => None,
        };
        Ok(Self {
            viewport,
            background: opts.background,
            canvas: CpuCanvas::new(viewport)?,
            text,
            state: StateStack::default(),
        })
    }

    fn shaper(&mut self) -> FanfareResult<&mut TextShaper> {
        self.text
            .as_mut()
            .ok_or_else(|| FanfareError::render("no font loaded for text rendering"))
    }
}

impl Surface for CpuSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) -> FanfareResult<()> {
        self.canvas = CpuCanvas::new(viewport)?;
        self.viewport = viewport;
        self.state.reset();
        Ok(())
    }

    fn measure_text(&mut self, text: &str, font_size: f64) -> FanfareResult<f64> {
        let size = check_font_size(font_size)?;
        if text.is_empty() {
            return Ok(0.0);
        }
        let layout = self.shaper()?.layout(text, size)?;
        Ok(f64::from(layout.full_width()))
    }

    fn clear(&mut self) -> FanfareResult<()> {
        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(());
        };
        canvas.ctx = vello_cpu::RenderContext::new(canvas.width, canvas.height);
        let [r, g, b, a] = self.background.to_rgba8();
        canvas.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
        canvas.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(canvas.width),
            f64::from(canvas.height),
        ));
        Ok(())
    }

    fn save(&mut self) {
        self.state.save();
    }

    fn restore(&mut self) {
        self.state.restore();
    }

    fn set_fill(&mut self, color: ColorDef) {
        self.state.current_mut().fill = color;
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state.current_mut().global_alpha = if alpha.is_finite() {
            alpha.clamp(0.0, 1.0)
        } else {
            1.0
        };
    }

    fn set_font_size(&mut self, size: f64) {
        self.state.current_mut().font_size = size;
    }

    fn set_text_align(&mut self, align: TextAlign) {
        self.state.current_mut().align = align;
    }

    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.state.current_mut().baseline = baseline;
    }

    fn fill_text(&mut self, text: &str, at: Point) -> FanfareResult<()> {
        let state = *self.state.current();
        let size = check_font_size(state.font_size)?;
        let Self {
            canvas,
            text: shaper,
            ..
        } = self;
        let shaper = shaper
            .as_mut()
            .ok_or_else(|| FanfareError::render("no font loaded for text rendering"))?;
        let Some(canvas) = canvas.as_mut() else {
            return Ok(());
        };
        if text.is_empty() || state.global_alpha <= 0.0 {
            return Ok(());
        }

        let font = shaper.font().clone();
        let layout = shaper.layout(text, size)?;
        let ascent = layout
            .lines()
            .next()
            .map(|line| f64::from(line.metrics().ascent))
            .unwrap_or(0.0);
        let (dx, dy) = anchor_offset(
            f64::from(layout.full_width()),
            f64::from(layout.height()),
            state.align,
            state.baseline,
            ascent,
        );

        let ctx = &mut canvas.ctx;
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((at.x + dx, at.y + dy)));
        set_paint(ctx, state.fill);
        with_opacity(ctx, state.global_alpha, |ctx| draw_layout(ctx, &font, layout));
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        Ok(())
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64) -> FanfareResult<()> {
        use vello_cpu::kurbo::Shape as _;

        let state = *self.state.current();
        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(());
        };
        if !(rx > 0.0 && ry > 0.0) || state.global_alpha <= 0.0 {
            return Ok(());
        }

        let ellipse = vello_cpu::kurbo::Ellipse::new(point_to_cpu(center), (rx, ry), 0.0);
        let path = ellipse.to_path(0.1);
        let ctx = &mut canvas.ctx;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        set_paint(ctx, state.fill);
        with_opacity(ctx, state.global_alpha, |ctx| ctx.fill_path(&path));
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f64) -> FanfareResult<()> {
        let state = *self.state.current();
        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(());
        };
        let [first, rest @ ..] = points else {
            return Ok(());
        };
        if rest.is_empty() || !(width > 0.0) {
            return Ok(());
        }

        let mut path = vello_cpu::kurbo::BezPath::new();
        path.move_to(point_to_cpu(*first));
        for p in rest {
            path.line_to(point_to_cpu(*p));
        }

        let ctx = &mut canvas.ctx;
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        set_paint(ctx, state.fill);
        with_opacity(ctx, state.global_alpha, |ctx| ctx.stroke_path(&path));
        Ok(())
    }

    fn finish_frame(&mut self) -> FanfareResult<Option<FrameRGBA>> {
        let Some(canvas) = self.canvas.as_mut() else {
            return Ok(None);
        };
        canvas.ctx.flush();
        canvas.ctx.render_to_pixmap(&mut canvas.pixmap);
        Ok(Some(FrameRGBA {
            width: u32::from(canvas.width),
            height: u32::from(canvas.height),
            data: canvas.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }))
    }
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn set_paint(ctx: &mut vello_cpu::RenderContext, color: ColorDef) {
    let [r, g, b, a] = color.to_rgba8();
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    alpha: f64,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    if alpha < 1.0 {
        ctx.push_opacity_layer(alpha as f32);
        draw(ctx);
        ctx.pop_layer();
    } else {
        draw(ctx);
    }
}

fn draw_layout(
    ctx: &mut vello_cpu::RenderContext,
    font: &vello_cpu::peniko::FontData,
    layout: &parley::Layout<TextBrush>,
) {
    for line in layout.lines() {
        for item in line.items() {
            let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                continue;
            };
            let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                id: g.id,
                x: g.x,
                y: g.y,
            });
            ctx.glyph_run(font)
                .font_size(run.run().font_size())
                .fill_glyphs(glyphs);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
