use crate::assets::color::ColorDef;
use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::{FanfareError, FanfareResult};

/// A rendered frame as RGBA8 pixels.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

/// Horizontal anchor for [`Surface::fill_text`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAlign {
    #[default]
    Start,
    Center,
    End,
}

/// Vertical anchor for [`Surface::fill_text`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextBaseline {
    #[default]
    Alphabetic,
    Middle,
    Top,
}

/// Mutable drawing state saved and restored around each entity's draw call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawState {
    pub fill: ColorDef,
    pub global_alpha: f64,
    pub font_size: f64,
    pub align: TextAlign,
    pub baseline: TextBaseline,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            fill: ColorDef::black(),
            global_alpha: 1.0,
            font_size: 10.0,
            align: TextAlign::Start,
            baseline: TextBaseline::Alphabetic,
        }
    }
}

/// Current state plus the save stack, shared by surface implementations.
#[derive(Clone, Debug, Default)]
pub struct StateStack {
    current: DrawState,
    saved: Vec<DrawState>,
}

impl StateStack {
    pub fn current(&self) -> &DrawState {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut DrawState {
        &mut self.current
    }

    pub fn save(&mut self) {
        self.saved.push(self.current);
    }

    /// Pop the last saved state. Unbalanced restores are ignored, like a canvas context.
    pub fn restore(&mut self) {
        if let Some(prev) = self.saved.pop() {
            self.current = prev;
        }
    }

    pub fn depth(&self) -> usize {
        self.saved.len()
    }

    pub fn reset(&mut self) {
        self.current = DrawState::default();
        self.saved.clear();
    }
}

/// The drawing collaborator the animation renders into.
///
/// The interface mirrors an immediate-mode 2D canvas: style setters mutate the current
/// [`DrawState`], `save`/`restore` bracket each entity, and `fill_*` calls paint with it.
pub trait Surface {
    /// Current drawable size.
    fn viewport(&self) -> Viewport;

    /// Reallocate for a new viewport size. Drawing state is reset.
    fn resize(&mut self, viewport: Viewport) -> FanfareResult<()>;

    /// Rendered width of `text` at `font_size` pixels.
    fn measure_text(&mut self, text: &str, font_size: f64) -> FanfareResult<f64>;

    /// Clear the whole surface to the background.
    fn clear(&mut self) -> FanfareResult<()>;

    fn save(&mut self);
    fn restore(&mut self);

    fn set_fill(&mut self, color: ColorDef);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_font_size(&mut self, size: f64);
    fn set_text_align(&mut self, align: TextAlign);
    fn set_text_baseline(&mut self, baseline: TextBaseline);

    /// Paint `text` anchored at `at` with the current fill, font and alignment.
    fn fill_text(&mut self, text: &str, at: Point) -> FanfareResult<()>;

    /// Paint an axis-aligned ellipse with radii `(rx, ry)`.
    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64) -> FanfareResult<()>;

    /// Stroke an open polyline with the current fill color.
    fn stroke_polyline(&mut self, points: &[Point], width: f64) -> FanfareResult<()>;

    /// End the frame. Raster surfaces return the pixels drawn since the last `clear`.
    fn finish_frame(&mut self) -> FanfareResult<Option<FrameRGBA>> {
        Ok(None)
    }
}

/// Map an alignment/baseline pair to the offset of the text box's top-left corner.
pub(crate) fn anchor_offset(
    width: f64,
    height: f64,
    align: TextAlign,
    baseline: TextBaseline,
    ascent: f64,
) -> (f64, f64) {
    let dx = match align {
        TextAlign::Start => 0.0,
        TextAlign::Center => -width / 2.0,
        TextAlign::End => -width,
    };
    let dy = match baseline {
        TextBaseline::Alphabetic => -ascent,
        TextBaseline::Middle => -height / 2.0,
        TextBaseline::Top => 0.0,
    };
    (dx, dy)
}

pub(crate) fn check_font_size(size: f64) -> FanfareResult<f32> {
    if !size.is_finite() || size <= 0.0 {
        return Err(FanfareError::layout("font size must be finite and > 0"));
    }
    Ok(size as f32)
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
