use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::assets::color::ColorDef;
use crate::foundation::error::{FanfareError, FanfareResult};

/// Longest phase a letter may wait, travel or hold, in ticks (one hour at 60 fps).
pub const MAX_PHASE_TICKS: f64 = 216_000.0;

/// Read-only parameters for one run of the greeting.
///
/// Durations are in ticks (frames). Every randomized quantity is `base + added * r` with `r`
/// uniform in `[0, 1)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GreetingOpts {
    /// Lines of text, top to bottom.
    pub strings: Vec<String>,
    /// Font size in pixels.
    pub char_size: f64,
    /// Extra horizontal offset; half of it is added to every character position.
    pub char_spacing: f64,
    /// Vertical distance between line centers.
    pub line_height: f64,

    pub firework_base_spawn_time: f64,
    pub firework_added_spawn_time: f64,
    pub firework_base_reach_time: f64,
    pub firework_added_reach_time: f64,
    pub firework_base_line_width: f64,
    pub firework_added_line_width: f64,

    pub balloon_base_time: f64,
    pub balloon_added_time: f64,
    pub balloon_base_vel: f64,
    pub balloon_added_vel: f64,
    pub balloon_base_size: f64,
    pub balloon_added_size: f64,
    /// Alpha removed from a balloon every tick.
    pub balloon_fade_per_tick: f64,

    /// Whitespace characters take up room but get no letter.
    pub skip_whitespace: bool,
    /// Stroke the whole firework trajectory instead of only its leading glyph.
    pub draw_trail: bool,
    /// Clear color for raster surfaces.
    pub background: ColorDef,
}

impl Default for GreetingOpts {
    fn default() -> Self {
        Self {
            strings: vec!["HAPPY".to_owned(), "MOTHER'S".to_owned(), "DAY".to_owned()],
            char_size: 30.0,
            char_spacing: 35.0,
            line_height: 40.0,
            firework_base_spawn_time: 0.0,
            firework_added_spawn_time: 300.0,
            firework_base_reach_time: 60.0,
            firework_added_reach_time: 40.0,
            firework_base_line_width: 3.0,
            firework_added_line_width: 8.0,
            balloon_base_time: 40.0,
            balloon_added_time: 40.0,
            balloon_base_vel: 0.4,
            balloon_added_vel: 0.4,
            balloon_base_size: 12.0,
            balloon_added_size: 20.0,
            balloon_fade_per_tick: 0.01,
            skip_whitespace: true,
            draw_trail: false,
            background: ColorDef::black(),
        }
    }
}

impl GreetingOpts {
    /// Default options rendering `strings` instead of the stock greeting.
    pub fn with_strings<S: Into<String>>(strings: impl IntoIterator<Item = S>) -> Self {
        Self {
            strings: strings.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load options from a JSON file; missing fields keep their defaults.
    pub fn from_path(path: &Path) -> FanfareResult<Self> {
        use anyhow::Context as _;

        let f = std::fs::File::open(path)
            .with_context(|| format!("open options '{}'", path.display()))?;
        let opts: Self = serde_json::from_reader(std::io::BufReader::new(f))
            .map_err(|e| FanfareError::serde(format!("'{}': {e}", path.display())))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Parse options from a JSON string.
    pub fn from_json_str(json: &str) -> FanfareResult<Self> {
        let opts: Self =
            serde_json::from_str(json).map_err(|e| FanfareError::serde(e.to_string()))?;
        opts.validate()?;
        Ok(opts)
    }

    /// Reject values the animation cannot use.
    pub fn validate(&self) -> FanfareResult<()> {
        if !(self.char_size.is_finite() && self.char_size > 0.0) {
            return Err(FanfareError::validation(
                "char_size must be finite and > 0",
            ));
        }
        if !(self.line_height.is_finite() && self.line_height > 0.0) {
            return Err(FanfareError::validation(
                "line_height must be finite and > 0",
            ));
        }

        let non_negative = [
            ("char_spacing", self.char_spacing),
            ("firework_base_spawn_time", self.firework_base_spawn_time),
            ("firework_added_spawn_time", self.firework_added_spawn_time),
            ("firework_base_reach_time", self.firework_base_reach_time),
            ("firework_added_reach_time", self.firework_added_reach_time),
            ("firework_base_line_width", self.firework_base_line_width),
            ("firework_added_line_width", self.firework_added_line_width),
            ("balloon_base_time", self.balloon_base_time),
            ("balloon_added_time", self.balloon_added_time),
            ("balloon_base_vel", self.balloon_base_vel),
            ("balloon_added_vel", self.balloon_added_vel),
            ("balloon_base_size", self.balloon_base_size),
            ("balloon_added_size", self.balloon_added_size),
        ];
        for (name, v) in non_negative {
            if !(v.is_finite() && v >= 0.0) {
                return Err(FanfareError::validation(format!(
                    "{name} must be finite and >= 0 (got {v})"
                )));
            }
        }

        let tick_ranges = [
            (
                "firework spawn time",
                self.firework_base_spawn_time + self.firework_added_spawn_time,
            ),
            (
                "firework reach time",
                self.firework_base_reach_time + self.firework_added_reach_time,
            ),
            (
                "balloon time",
                self.balloon_base_time + self.balloon_added_time,
            ),
        ];
        for (name, max) in tick_ranges {
            if max > MAX_PHASE_TICKS {
                return Err(FanfareError::validation(format!(
                    "{name} can reach {max} ticks, above the {MAX_PHASE_TICKS} limit"
                )));
            }
        }

        if !(self.balloon_fade_per_tick.is_finite() && self.balloon_fade_per_tick > 0.0) {
            return Err(FanfareError::validation(
                "balloon_fade_per_tick must be finite and > 0",
            ));
        }
        Ok(())
    }

    pub(crate) fn line_count(&self) -> usize {
        self.strings.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/opts.rs"]
mod tests;
