use crate::assets::color::LetterPalette;
use crate::foundation::core::Point;
use crate::foundation::error::FanfareResult;
use crate::foundation::rng::RandomSource;
use crate::render::surface::Surface;
use crate::scene::opts::GreetingOpts;

/// Ratio of a balloon's horizontal radius to its vertical one.
const WIDTH_RATIO: f64 = 0.6;

/// A rising, fading particle released when a letter lands.
#[derive(Clone, Debug, PartialEq)]
pub struct Balloon {
    pos: Point,
    palette: LetterPalette,
    size: f64,
    vel_y: f64,
    fade: f64,
    alpha: f64,
}

impl Balloon {
    /// Balloon at `pos` with size and velocity drawn from `opts`.
    pub fn spawn(
        pos: Point,
        palette: LetterPalette,
        opts: &GreetingOpts,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let size = opts.balloon_base_size + opts.balloon_added_size * rng.next_unit();
        let vel_y = opts.balloon_base_vel + opts.balloon_added_vel * rng.next_unit();
        Self::new(pos, palette, size, vel_y, opts.balloon_fade_per_tick)
    }

    /// Balloon with explicit size, upward velocity and per-tick fade.
    pub fn new(pos: Point, palette: LetterPalette, size: f64, vel_y: f64, fade: f64) -> Self {
        Self {
            pos,
            palette,
            size,
            vel_y,
            fade,
            alpha: 1.0,
        }
    }

    /// Same balloon starting at `alpha` instead of fully opaque.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Rise by the velocity and fade, never below zero.
    pub fn step(&mut self) {
        self.pos.y -= self.vel_y;
        self.alpha = (self.alpha - self.fade).max(0.0);
    }

    pub fn draw(&self, surface: &mut dyn Surface) -> FanfareResult<()> {
        surface.save();
        surface.set_fill(self.palette.solid());
        surface.set_global_alpha(self.alpha);
        let res = surface.fill_ellipse(self.pos, self.size * WIDTH_RATIO, self.size);
        surface.restore();
        res
    }

    /// Fully faded; the owner drops it.
    pub fn is_expired(&self) -> bool {
        self.alpha <= 0.0
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn vel_y(&self) -> f64 {
        self.vel_y
    }

    pub fn palette(&self) -> LetterPalette {
        self.palette
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/balloon.rs"]
mod tests;
