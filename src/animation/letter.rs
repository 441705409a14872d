use crate::animation::balloon::Balloon;
use crate::assets::color::LetterPalette;
use crate::foundation::core::Point;
use crate::foundation::error::FanfareResult;
use crate::foundation::math::{lerp, ticks};
use crate::foundation::rng::RandomSource;
use crate::render::surface::{Surface, TextAlign, TextBaseline};
use crate::scene::opts::GreetingOpts;

/// Lifecycle stage of a [`Letter`], with the data only that stage needs.
///
/// Stages only move forward: `PreSpawn → Traveling → Balloon → Done`.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase {
    /// Waiting on the ground for `spawn_at` ticks.
    PreSpawn { spawn_at: u32 },
    /// Flying from the launch point to the target over `reach_time` ticks.
    ///
    /// `trajectory` keeps every interpolated point; the default rendering reads only the last
    /// one, trail rendering reads them all.
    Traveling {
        reach_time: u32,
        trajectory: Vec<Point>,
    },
    /// Landed; holding for `hold_time` ticks while the balloon rises.
    Balloon { hold_time: u32 },
    /// Settled at the target for good.
    Done,
}

/// Fieldless mirror of [`Phase`] for counting and comparisons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PhaseKind {
    PreSpawn,
    Traveling,
    Balloon,
    Done,
}

impl Phase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            Self::PreSpawn { .. } => PhaseKind::PreSpawn,
            Self::Traveling { .. } => PhaseKind::Traveling,
            Self::Balloon { .. } => PhaseKind::Balloon,
            Self::Done => PhaseKind::Done,
        }
    }
}

/// One character of the greeting and its animation state.
#[derive(Clone, Debug)]
pub struct Letter {
    ch: char,
    glyph: String,
    target: Point,
    launch: Point,
    palette: LetterPalette,
    line_width: f64,
    phase: Phase,
    tick: u32,
}

impl Letter {
    /// Letter waiting to launch from `launch` toward `target`, with its spawn delay and trail
    /// width drawn from `opts`.
    pub fn new(
        ch: char,
        target: Point,
        launch: Point,
        palette: LetterPalette,
        opts: &GreetingOpts,
        rng: &mut dyn RandomSource,
    ) -> Self {
        let spawn_at = ticks(
            opts.firework_base_spawn_time,
            opts.firework_added_spawn_time,
            rng.next_unit(),
        );
        let line_width =
            opts.firework_base_line_width + opts.firework_added_line_width * rng.next_unit();
        Self::with_phase(ch, target, launch, palette, line_width, Phase::PreSpawn { spawn_at })
    }

    /// Letter starting in an explicit phase, tick 0.
    pub fn with_phase(
        ch: char,
        target: Point,
        launch: Point,
        palette: LetterPalette,
        line_width: f64,
        phase: Phase,
    ) -> Self {
        Self {
            ch,
            glyph: ch.to_string(),
            target,
            launch,
            palette,
            line_width,
            phase,
            tick: 0,
        }
    }

    /// Advance one tick. Returns the balloon released on landing, exactly once per lifetime.
    pub fn step(&mut self, opts: &GreetingOpts, rng: &mut dyn RandomSource) -> Option<Balloon> {
        match &mut self.phase {
            Phase::PreSpawn { spawn_at } => {
                self.tick += 1;
                if self.tick >= *spawn_at {
                    let reach_time = ticks(
                        opts.firework_base_reach_time,
                        opts.firework_added_reach_time,
                        rng.next_unit(),
                    )
                    .max(1);
                    self.enter(Phase::Traveling {
                        reach_time,
                        trajectory: Vec::new(),
                    });
                }
                None
            }
            Phase::Traveling {
                reach_time,
                trajectory,
            } => {
                self.tick += 1;
                let reach_time = *reach_time;
                let p = (f64::from(self.tick) / f64::from(reach_time)).min(1.0);
                trajectory.push(Point::new(
                    lerp(self.launch.x, self.target.x, p),
                    lerp(self.launch.y, self.target.y, p),
                ));

                if self.tick < reach_time {
                    return None;
                }
                let hold_time = ticks(
                    opts.balloon_base_time,
                    opts.balloon_added_time,
                    rng.next_unit(),
                );
                self.enter(Phase::Balloon { hold_time });
                Some(Balloon::spawn(self.target, self.palette, opts, rng))
            }
            Phase::Balloon { hold_time } => {
                self.tick += 1;
                if self.tick > *hold_time {
                    self.enter(Phase::Done);
                }
                None
            }
            Phase::Done => None,
        }
    }

    fn enter(&mut self, phase: Phase) {
        tracing::trace!(
            ch = %self.ch,
            from = ?self.phase.kind(),
            to = ?phase.kind(),
            "letter phase transition"
        );
        self.phase = phase;
        self.tick = 0;
    }

    /// Draw the glyph where the current phase puts it.
    pub fn draw(&self, surface: &mut dyn Surface, opts: &GreetingOpts) -> FanfareResult<()> {
        let at = match &self.phase {
            Phase::PreSpawn { .. } => return Ok(()),
            Phase::Traveling { trajectory, .. } => match trajectory.last() {
                Some(p) => *p,
                None => return Ok(()),
            },
            Phase::Balloon { .. } | Phase::Done => self.target,
        };

        surface.save();
        let res = self.draw_inner(surface, opts, at);
        surface.restore();
        res
    }

    fn draw_inner(
        &self,
        surface: &mut dyn Surface,
        opts: &GreetingOpts,
        at: Point,
    ) -> FanfareResult<()> {
        if opts.draw_trail
            && let Phase::Traveling { trajectory, .. } = &self.phase
        {
            let mut trail = Vec::with_capacity(trajectory.len() + 1);
            trail.push(self.launch);
            trail.extend_from_slice(trajectory);
            surface.set_fill(self.palette.light());
            surface.stroke_polyline(&trail, self.line_width)?;
        }

        surface.set_fill(self.palette.solid());
        surface.set_font_size(opts.char_size);
        surface.set_text_baseline(TextBaseline::Middle);
        surface.set_text_align(TextAlign::Center);
        surface.fill_text(&self.glyph, at)
    }

    pub fn ch(&self) -> char {
        self.ch
    }

    pub fn target(&self) -> Point {
        self.target
    }

    pub fn launch(&self) -> Point {
        self.launch
    }

    pub fn palette(&self) -> LetterPalette {
        self.palette
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Trajectory points so far; empty outside the traveling phase.
    pub fn trajectory(&self) -> &[Point] {
        match &self.phase {
            Phase::Traveling { trajectory, .. } => trajectory,
            _ => &[],
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Done)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/letter.rs"]
mod tests;
