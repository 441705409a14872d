use crate::foundation::core::{Point, Viewport};
use crate::foundation::error::FanfareResult;
use crate::render::surface::Surface;
use crate::scene::opts::GreetingOpts;

/// Where one character lands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphPlacement {
    pub ch: char,
    /// Index into `GreetingOpts::strings`.
    pub line: usize,
    /// Index of the character within its line.
    pub column: usize,
    pub target: Point,
}

/// Output of [`layout_text`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextLayout {
    pub placements: Vec<GlyphPlacement>,
    /// Widest measured line; the hue spread is scaled to it.
    pub total_width: f64,
    /// Lines dropped because measuring them failed.
    pub failed_lines: Vec<usize>,
}

/// Center every line of `opts.strings` on `viewport`, stacked `line_height` apart.
///
/// Character x positions come from measuring the line prefix before each character, so
/// proportional fonts keep their spacing. A line that cannot be measured is dropped on its
/// own; the other lines keep their positions.
pub fn layout_text(
    surface: &mut dyn Surface,
    viewport: Viewport,
    opts: &GreetingOpts,
) -> TextLayout {
    let mut out = TextLayout::default();
    if viewport.is_degenerate() || opts.strings.is_empty() {
        return out;
    }

    let hw = viewport.half_width();
    let hh = viewport.half_height();
    let line_count = opts.line_count();

    for (line, text) in opts.strings.iter().enumerate() {
        let y = hh + (line as f64 - (line_count as f64 - 1.0) / 2.0) * opts.line_height;
        match layout_line(surface, text, line, hw, y, opts) {
            Ok((width, placements)) => {
                out.total_width = out.total_width.max(width);
                out.placements.extend(placements);
            }
            Err(err) => {
                tracing::warn!(line, error = %err, "skipping line that failed to measure");
                out.failed_lines.push(line);
            }
        }
    }
    out
}

fn layout_line(
    surface: &mut dyn Surface,
    text: &str,
    line: usize,
    hw: f64,
    y: f64,
    opts: &GreetingOpts,
) -> FanfareResult<(f64, Vec<GlyphPlacement>)> {
    if text.is_empty() {
        return Ok((0.0, Vec::new()));
    }

    let width = surface.measure_text(text, opts.char_size)?;
    let start = hw - width / 2.0;
    let mut placements = Vec::with_capacity(text.len());
    for (column, (byte_idx, ch)) in text.char_indices().enumerate() {
        if opts.skip_whitespace && ch.is_whitespace() {
            continue;
        }
        let prefix = surface.measure_text(&text[..byte_idx], opts.char_size)?;
        placements.push(GlyphPlacement {
            ch,
            line,
            column,
            target: Point::new(start + prefix + opts.char_spacing / 2.0, y),
        });
    }
    Ok((width, placements))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/layout.rs"]
mod tests;
