use std::collections::HashSet;

use crate::assets::color::ColorDef;
use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::{FanfareError, FanfareResult};
use crate::render::surface::{DrawState, StateStack, Surface, TextAlign, TextBaseline};

/// One recorded paint operation with the state it was issued under.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCmd {
    Text {
        text: String,
        at: Point,
        state: DrawState,
    },
    Ellipse {
        center: Point,
        rx: f64,
        ry: f64,
        state: DrawState,
    },
    Polyline {
        points: Vec<Point>,
        width: f64,
        state: DrawState,
    },
}

/// Headless surface that records draw calls and measures text with a fixed advance.
///
/// Every character is `advance * font_size` wide, which keeps layouts exact and
/// reproducible without loading a font.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    viewport: Viewport,
    advance: f64,
    state: StateStack,
    commands: Vec<DrawCmd>,
    failing_text: HashSet<String>,
    failing_draws: HashSet<String>,
    frames_finished: u64,
    clears: u64,
}

impl RecordingSurface {
    /// Default advance, in ems.
    pub const DEFAULT_ADVANCE: f64 = 0.6;

    pub fn new(viewport: Viewport) -> Self {
        Self::with_advance(viewport, Self::DEFAULT_ADVANCE)
    }

    pub fn with_advance(viewport: Viewport, advance: f64) -> Self {
        Self {
            viewport,
            advance,
            state: StateStack::default(),
            commands: Vec::new(),
            failing_text: HashSet::new(),
            failing_draws: HashSet::new(),
            frames_finished: 0,
            clears: 0,
        }
    }

    /// Make `measure_text(text, _)` fail, to exercise error isolation.
    pub fn fail_measuring(&mut self, text: impl Into<String>) {
        self.failing_text.insert(text.into());
    }

    /// Make `fill_text(text, _)` fail without recording a command.
    pub fn fail_drawing(&mut self, text: impl Into<String>) {
        self.failing_draws.insert(text.into());
    }

    /// Commands issued since the last `clear`.
    pub fn commands(&self) -> &[DrawCmd] {
        &self.commands
    }

    /// Text commands since the last `clear`, as `(text, position)`.
    pub fn texts(&self) -> Vec<(&str, Point)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, at, .. } => Some((text.as_str(), *at)),
                _ => None,
            })
            .collect()
    }

    pub fn ellipse_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Ellipse { .. }))
            .count()
    }

    pub fn frames_finished(&self) -> u64 {
        self.frames_finished
    }

    pub fn clears(&self) -> u64 {
        self.clears
    }

    /// Depth of unmatched `save` calls; zero between well-behaved entity draws.
    pub fn save_depth(&self) -> usize {
        self.state.depth()
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn resize(&mut self, viewport: Viewport) -> FanfareResult<()> {
        self.viewport = viewport;
        self.state.reset();
        self.commands.clear();
        Ok(())
    }

    fn measure_text(&mut self, text: &str, font_size: f64) -> FanfareResult<f64> {
        if self.failing_text.contains(text) {
            return Err(FanfareError::layout(format!("cannot measure \"{text}\"")));
        }
        let size = crate::render::surface::check_font_size(font_size)?;
        Ok(text.chars().count() as f64 * self.advance * f64::from(size))
    }

    fn clear(&mut self) -> FanfareResult<()> {
        self.commands.clear();
        self.clears += 1;
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
        self.state.current_mut().global_alpha = alpha.clamp(0.0, 1.0);
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
        if self.failing_draws.contains(text) {
            return Err(FanfareError::render(format!("cannot draw \"{text}\"")));
        }
        self.commands.push(DrawCmd::Text {
            text: text.to_owned(),
            at,
            state: *self.state.current(),
        });
        Ok(())
    }

    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64) -> FanfareResult<()> {
        self.commands.push(DrawCmd::Ellipse {
            center,
            rx,
            ry,
            state: *self.state.current(),
        });
        Ok(())
    }

    fn stroke_polyline(&mut self, points: &[Point], width: f64) -> FanfareResult<()> {
        self.commands.push(DrawCmd::Polyline {
            points: points.to_vec(),
            width,
            state: *self.state.current(),
        });
        Ok(())
    }

    fn finish_frame(&mut self) -> FanfareResult<Option<crate::render::surface::FrameRGBA>> {
        self.frames_finished += 1;
        Ok(None)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/recording.rs"]
mod tests;
