use crate::animation::balloon::Balloon;
use crate::animation::letter::{Letter, PhaseKind};
use crate::assets::color::LetterPalette;
use crate::foundation::core::{FrameIndex, Viewport};
use crate::foundation::error::FanfareResult;
use crate::foundation::rng::{RandomSource, Rng64};
use crate::render::surface::Surface;
use crate::scene::layout::{TextLayout, layout_text};
use crate::scene::opts::GreetingOpts;

/// What happened during one [`Scene::tick`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub frame: u64,
    pub pre_spawn: usize,
    pub traveling: usize,
    pub holding: usize,
    pub done: usize,
    pub balloons_live: usize,
    pub balloons_spawned: usize,
    pub balloons_pruned: usize,
    /// Entity draws that failed and were skipped.
    pub draw_failures: usize,
}

/// All mutable animation state: the viewport, every letter and every live balloon.
///
/// Layout replaces the contents wholesale; nothing survives a rebuild.
pub struct Scene<R: RandomSource = Rng64> {
    opts: GreetingOpts,
    viewport: Viewport,
    letters: Vec<Letter>,
    balloons: Vec<Balloon>,
    rng: R,
    frame: u64,
    total_width: f64,
}

impl<R: RandomSource> Scene<R> {
    /// Empty scene; call [`Scene::rebuild`] to lay out the letters.
    pub fn new(opts: GreetingOpts, rng: R) -> FanfareResult<Self> {
        opts.validate()?;
        Ok(Self {
            opts,
            viewport: Viewport::default(),
            letters: Vec::new(),
            balloons: Vec::new(),
            rng,
            frame: 0,
            total_width: 0.0,
        })
    }

    /// Discard every entity and lay the text out again for the surface's viewport.
    pub fn rebuild(&mut self, surface: &mut dyn Surface) -> TextLayout {
        let viewport = surface.viewport();
        let layout = layout_text(surface, viewport, &self.opts);

        let launch = viewport.launch_point();
        self.letters.clear();
        self.balloons.clear();
        for p in &layout.placements {
            let palette = LetterPalette::for_position(p.target.x, layout.total_width);
            self.letters.push(Letter::new(
                p.ch,
                p.target,
                launch,
                palette,
                &self.opts,
                &mut self.rng,
            ));
        }
        self.viewport = viewport;
        self.total_width = layout.total_width;

        tracing::info!(
            width = viewport.width,
            height = viewport.height,
            letters = self.letters.len(),
            failed_lines = layout.failed_lines.len(),
            "laid out scene"
        );
        layout
    }

    /// Resize the surface and rebuild when `viewport` differs from the current one.
    ///
    /// Returns `true` when a rebuild happened.
    pub fn resize(
        &mut self,
        surface: &mut dyn Surface,
        viewport: Viewport,
    ) -> FanfareResult<bool> {
        if viewport == self.viewport {
            return Ok(false);
        }
        surface.resize(viewport)?;
        self.rebuild(surface);
        Ok(true)
    }

    /// Advance every entity one tick and draw the frame.
    ///
    /// Letters step and draw first, in order, then balloons; a balloon is dropped only after
    /// its own step and draw. A failed entity draw is logged and counted, and the frame goes on.
    pub fn tick(&mut self, surface: &mut dyn Surface) -> FanfareResult<FrameStats> {
        surface.clear()?;

        let mut stats = FrameStats {
            frame: self.frame,
            ..FrameStats::default()
        };

        for letter in &mut self.letters {
            if let Some(balloon) = letter.step(&self.opts, &mut self.rng) {
                self.balloons.push(balloon);
                stats.balloons_spawned += 1;
            }
            if let Err(err) = letter.draw(surface, &self.opts) {
                tracing::warn!(ch = %letter.ch(), error = %err, "letter draw failed");
                stats.draw_failures += 1;
            }
            match letter.phase().kind() {
                PhaseKind::PreSpawn => stats.pre_spawn += 1,
                PhaseKind::Traveling => stats.traveling += 1,
                PhaseKind::Balloon => stats.holding += 1,
                PhaseKind::Done => stats.done += 1,
            }
        }

        for balloon in &mut self.balloons {
            balloon.step();
            if let Err(err) = balloon.draw(surface) {
                tracing::warn!(error = %err, "balloon draw failed");
                stats.draw_failures += 1;
            }
        }
        let before = self.balloons.len();
        self.balloons.retain(|b| !b.is_expired());
        stats.balloons_pruned = before - self.balloons.len();
        stats.balloons_live = self.balloons.len();

        self.frame += 1;
        tracing::debug!(?stats, "frame");
        Ok(stats)
    }

    /// Every letter has settled and every balloon has faded.
    ///
    /// An empty scene is complete.
    pub fn is_complete(&self) -> bool {
        self.balloons.is_empty() && self.letters.iter().all(Letter::is_done)
    }

    /// Add a balloon to the live set, as a landing letter would.
    pub fn release_balloon(&mut self, balloon: Balloon) {
        self.balloons.push(balloon);
    }

    pub fn letters(&self) -> &[Letter] {
        &self.letters
    }

    pub fn balloons(&self) -> &[Balloon] {
        &self.balloons
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn opts(&self) -> &GreetingOpts {
        &self.opts
    }

    /// Width of the widest laid-out line.
    pub fn total_width(&self) -> f64 {
        self.total_width
    }

    /// Frames ticked since the scene was created.
    pub fn frame(&self) -> FrameIndex {
        FrameIndex(self.frame)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/scene.rs"]
mod tests;
