use std::time::{Duration, Instant};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, Viewport};
use crate::foundation::error::FanfareResult;
use crate::foundation::rng::{RandomSource, Rng64};
use crate::render::surface::{FrameRGBA, Surface};
use crate::scene::scene::{FrameStats, Scene};
use crate::session::viewport::ViewportSource;

/// When [`Driver::run`] stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunLimit {
    /// Loop forever.
    #[default]
    Unbounded,
    /// Stop after this many frames.
    Frames(u64),
    /// Stop once every letter has settled and every balloon has faded, or after `max_frames`.
    ///
    /// At least one frame is always drawn, so an empty scene still yields a cleared frame.
    UntilComplete { max_frames: u64 },
}

/// Options controlling a [`Driver`] run.
#[derive(Clone, Copy, Debug, Default)]
pub struct DriverOpts {
    /// Output frame rate, used by sinks and pacing.
    pub fps: Fps,
    pub limit: RunLimit,
    /// Sleep between frames to hold `fps` in wall-clock time.
    pub pace: bool,
}

/// Totals for one [`Driver::run`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Frames ticked, including failed ones.
    pub frames: u64,
    /// Frames handed to the sink.
    pub frames_emitted: u64,
    /// Frames whose tick or readback failed and were skipped.
    pub frames_failed: u64,
    /// Frames read back at a size the sink was not configured for.
    pub frames_dropped: u64,
    pub balloons_spawned: u64,
    pub draw_failures: u64,
    /// First frame after which the scene was complete.
    pub completed_at: Option<FrameIndex>,
}

/// Owns the scene, its surface and the viewport feed, and runs the frame loop.
pub struct Driver<S: Surface, R: RandomSource = Rng64> {
    scene: Scene<R>,
    surface: S,
    viewports: Box<dyn ViewportSource>,
    opts: DriverOpts,
}

impl<S: Surface, R: RandomSource> Driver<S, R> {
    /// Size the surface to the initial viewport and lay the scene out.
    pub fn new(
        mut scene: Scene<R>,
        mut surface: S,
        viewports: Box<dyn ViewportSource>,
        opts: DriverOpts,
    ) -> FanfareResult<Self> {
        let initial = viewports.initial();
        if surface.viewport() != initial {
            surface.resize(initial)?;
        }
        scene.rebuild(&mut surface);
        Ok(Self {
            scene,
            surface,
            viewports,
            opts,
        })
    }

    /// Apply any pending resize, tick the scene and read the frame back.
    pub fn step_frame(&mut self) -> FanfareResult<(FrameStats, Option<FrameRGBA>)> {
        let frame = self.scene.frame();
        if let Some(viewport) = self.viewports.poll_resize(frame)
            && self.scene.resize(&mut self.surface, viewport)?
        {
            tracing::info!(
                frame = frame.0,
                width = viewport.width,
                height = viewport.height,
                "viewport resized"
            );
        }
        let stats = self.scene.tick(&mut self.surface)?;
        let out = self.surface.finish_frame()?;
        Ok((stats, out))
    }

    /// Run until the configured [`RunLimit`], streaming frames into `sink`.
    pub fn run(&mut self, sink: &mut dyn FrameSink) -> FanfareResult<RunStats> {
        self.run_with(sink, |_| {})
    }

    /// Like [`Driver::run`], calling `on_frame` after every successful tick.
    ///
    /// A failing frame is logged and skipped; a failing sink ends the run.
    pub fn run_with(
        &mut self,
        sink: &mut dyn FrameSink,
        mut on_frame: impl FnMut(&FrameStats),
    ) -> FanfareResult<RunStats> {
        let (width, height) = self.surface.viewport().pixel_size();
        let cfg = SinkConfig {
            width,
            height,
            fps: self.opts.fps,
        };
        sink.begin(cfg.clone())?;

        tracing::info!(
            width,
            height,
            fps = self.opts.fps.as_f64(),
            limit = ?self.opts.limit,
            letters = self.scene.letters().len(),
            "run started"
        );

        let frame_dur = Duration::from_secs_f64(self.opts.fps.frame_duration_secs());
        let start = Instant::now();
        let mut stats = RunStats::default();

        while !self.limit_reached(&stats) {
            let idx = self.scene.frame();
            stats.frames += 1;
            match self.step_frame() {
                Ok((frame_stats, out)) => {
                    stats.balloons_spawned += frame_stats.balloons_spawned as u64;
                    stats.draw_failures += frame_stats.draw_failures as u64;
                    on_frame(&frame_stats);
                    if let Some(frame) = out {
                        if frame.width == cfg.width && frame.height == cfg.height {
                            sink.push_frame(idx, &frame)?;
                            stats.frames_emitted += 1;
                        } else {
                            tracing::warn!(
                                frame = idx.0,
                                got_width = frame.width,
                                got_height = frame.height,
                                "frame size differs from sink, dropped"
                            );
                            stats.frames_dropped += 1;
                        }
                    }
                }
                Err(err) => {
                    tracing::warn!(frame = idx.0, error = %err, "frame failed, skipped");
                    stats.frames_failed += 1;
                }
            }
            if stats.completed_at.is_none() && self.scene.is_complete() {
                stats.completed_at = Some(idx);
            }

            if self.opts.pace {
                let due = frame_dur.saturating_mul(u32::try_from(stats.frames).unwrap_or(u32::MAX));
                if let Some(wait) = due.checked_sub(start.elapsed()) {
                    std::thread::sleep(wait);
                }
            }
        }

        sink.end()?;
        tracing::info!(
            frames = stats.frames,
            emitted = stats.frames_emitted,
            failed = stats.frames_failed,
            completed_at = ?stats.completed_at.map(|f| f.0),
            "run finished"
        );
        Ok(stats)
    }

    fn limit_reached(&self, stats: &RunStats) -> bool {
        match self.opts.limit {
            RunLimit::Unbounded => false,
            RunLimit::Frames(n) => stats.frames >= n,
            RunLimit::UntilComplete { max_frames } => {
                stats.completed_at.is_some() || stats.frames >= max_frames
            }
        }
    }

    pub fn scene(&self) -> &Scene<R> {
        &self.scene
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn viewport(&self) -> Viewport {
        self.scene.viewport()
    }

    pub fn opts(&self) -> &DriverOpts {
        &self.opts
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/driver.rs"]
mod tests;
