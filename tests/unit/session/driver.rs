use super::*;
use crate::assets::color::ColorDef;
use crate::encode::sink::{InMemorySink, NullSink};
use crate::foundation::core::Point;
use crate::foundation::error::FanfareError;
use crate::render::recording::RecordingSurface;
use crate::render::surface::{TextAlign, TextBaseline};
use crate::scene::opts::GreetingOpts;
use crate::session::viewport::{FixedViewport, ScriptedViewport};

/// Recording surface that also reads back a blank frame and can fail chosen clears.
struct BlankFrames {
    inner: RecordingSurface,
    fail_clear_at: Vec<u64>,
    clears: u64,
}

impl BlankFrames {
    fn new(viewport: Viewport) -> Self {
        Self {
            inner: RecordingSurface::new(viewport),
            fail_clear_at: Vec::new(),
            clears: 0,
        }
    }
}

impl Surface for BlankFrames {
    fn viewport(&self) -> Viewport {
        self.inner.viewport()
    }
    fn resize(&mut self, viewport: Viewport) -> FanfareResult<()> {
        self.inner.resize(viewport)
    }
    fn measure_text(&mut self, text: &str, font_size: f64) -> FanfareResult<f64> {
        self.inner.measure_text(text, font_size)
    }
    fn clear(&mut self) -> FanfareResult<()> {
        let n = self.clears;
        self.clears += 1;
        if self.fail_clear_at.contains(&n) {
            return Err(FanfareError::render("clear failed"));
        }
        self.inner.clear()
    }
    fn save(&mut self) {
        self.inner.save();
    }
    fn restore(&mut self) {
        self.inner.restore();
    }
    fn set_fill(&mut self, color: ColorDef) {
        self.inner.set_fill(color);
    }
    fn set_global_alpha(&mut self, alpha: f64) {
        self.inner.set_global_alpha(alpha);
    }
    fn set_font_size(&mut self, size: f64) {
        self.inner.set_font_size(size);
    }
    fn set_text_align(&mut self, align: TextAlign) {
        self.inner.set_text_align(align);
    }
    fn set_text_baseline(&mut self, baseline: TextBaseline) {
        self.inner.set_text_baseline(baseline);
    }
    fn fill_text(&mut self, text: &str, at: Point) -> FanfareResult<()> {
        self.inner.fill_text(text, at)
    }
    fn fill_ellipse(&mut self, center: Point, rx: f64, ry: f64) -> FanfareResult<()> {
        self.inner.fill_ellipse(center, rx, ry)
    }
    fn stroke_polyline(&mut self, points: &[Point], width: f64) -> FanfareResult<()> {
        self.inner.stroke_polyline(points, width)
    }
    fn finish_frame(&mut self) -> FanfareResult<Option<FrameRGBA>> {
        let (width, height) = self.viewport().pixel_size();
        Ok(Some(FrameRGBA {
            width,
            height,
            data: vec![0; (width * height * 4) as usize],
            premultiplied: true,
        }))
    }
}

fn quick_opts(strings: &[&str]) -> GreetingOpts {
    GreetingOpts {
        firework_base_spawn_time: 0.0,
        firework_added_spawn_time: 5.0,
        firework_base_reach_time: 2.0,
        firework_added_reach_time: 3.0,
        balloon_base_time: 1.0,
        balloon_added_time: 2.0,
        balloon_base_vel: 1.0,
        ..GreetingOpts::with_strings(strings.iter().copied())
    }
}

fn driver_with(
    strings: &[&str],
    viewports: Box<dyn ViewportSource>,
    limit: RunLimit,
) -> Driver<BlankFrames> {
    let initial = viewports.initial();
    let scene = Scene::new(quick_opts(strings), Rng64::new(7)).unwrap();
    Driver::new(
        scene,
        BlankFrames::new(initial),
        viewports,
        DriverOpts {
            limit,
            ..DriverOpts::default()
        },
    )
    .unwrap()
}

#[test]
fn new_lays_out_for_initial_viewport() {
    let scene = Scene::new(quick_opts(&["HI"]), Rng64::new(1)).unwrap();
    let driver = Driver::new(
        scene,
        RecordingSurface::new(Viewport::new(10.0, 10.0)),
        Box::new(FixedViewport(Viewport::new(800.0, 600.0))),
        DriverOpts::default(),
    )
    .unwrap();
    assert_eq!(driver.viewport(), Viewport::new(800.0, 600.0));
    assert_eq!(driver.surface().viewport(), Viewport::new(800.0, 600.0));
    assert_eq!(driver.scene().letters().len(), 2);
}

#[test]
fn frames_limit_emits_exact_count() {
    let mut driver = driver_with(
        &["HI"],
        Box::new(FixedViewport(Viewport::new(64.0, 48.0))),
        RunLimit::Frames(12),
    );
    let mut sink = InMemorySink::new();
    let stats = driver.run(&mut sink).unwrap();

    assert_eq!(stats.frames, 12);
    assert_eq!(stats.frames_emitted, 12);
    assert_eq!(sink.frames().len(), 12);
    assert!(sink.is_ended());
    let cfg = sink.config().unwrap();
    assert_eq!((cfg.width, cfg.height), (64, 48));
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, (0..12).collect::<Vec<_>>());
}

#[test]
fn until_complete_stops_after_last_balloon_fades() {
    let mut driver = driver_with(
        &["HEY"],
        Box::new(FixedViewport(Viewport::new(200.0, 100.0))),
        RunLimit::UntilComplete { max_frames: 10_000 },
    );
    let mut sink = NullSink::new();
    let stats = driver.run(&mut sink).unwrap();

    let done = stats.completed_at.unwrap();
    assert!(driver.scene().is_complete());
    assert_eq!(stats.frames, done.0 + 1);
    assert_eq!(stats.balloons_spawned, 3);
    // Each balloon needs 100 ticks at fade 0.01 before it goes.
    assert!(done.0 >= 100);
    assert_eq!(sink.frames(), stats.frames_emitted);
}

#[test]
fn until_complete_respects_max_frames() {
    let mut driver = driver_with(
        &["HEY"],
        Box::new(FixedViewport(Viewport::new(200.0, 100.0))),
        RunLimit::UntilComplete { max_frames: 5 },
    );
    let stats = driver.run(&mut NullSink::new()).unwrap();
    assert_eq!(stats.frames, 5);
    assert_eq!(stats.completed_at, None);
}

#[test]
fn empty_scene_still_emits_one_cleared_frame() {
    let mut driver = driver_with(
        &[],
        Box::new(FixedViewport(Viewport::new(100.0, 100.0))),
        RunLimit::UntilComplete { max_frames: 50 },
    );
    let mut sink = InMemorySink::new();
    let stats = driver.run(&mut sink).unwrap();

    assert_eq!(stats.frames, 1);
    assert_eq!(stats.frames_emitted, 1);
    assert_eq!(stats.completed_at, Some(FrameIndex(0)));
    assert_eq!(driver.surface().clears, 1);
    assert_eq!(sink.frames().len(), 1);
    assert_eq!(sink.frames()[0].0, FrameIndex(0));
}

#[test]
fn empty_scene_on_recording_surface_clears_once() {
    let scene = Scene::new(GreetingOpts::with_strings(Vec::<String>::new()), Rng64::new(1))
        .unwrap();
    let mut driver = Driver::new(
        scene,
        RecordingSurface::new(Viewport::new(100.0, 100.0)),
        Box::new(FixedViewport(Viewport::new(100.0, 100.0))),
        DriverOpts {
            limit: RunLimit::UntilComplete { max_frames: 100 },
            ..DriverOpts::default()
        },
    )
    .unwrap();
    let stats = driver.run(&mut NullSink::new()).unwrap();

    assert_eq!(stats.frames, 1);
    assert_eq!(driver.surface().clears(), 1);
    assert_eq!(driver.surface().frames_finished(), 1);
}

#[test]
fn scripted_resize_rebuilds_and_drops_mismatched_frames() {
    let viewports = ScriptedViewport::new(
        Viewport::new(100.0, 100.0),
        vec![(FrameIndex(3), Viewport::new(200.0, 100.0))],
    );
    let mut driver = driver_with(&["HI"], Box::new(viewports), RunLimit::Frames(6));
    let mut sink = InMemorySink::new();
    let stats = driver.run(&mut sink).unwrap();

    assert_eq!(driver.viewport(), Viewport::new(200.0, 100.0));
    assert_eq!(stats.frames_emitted, 3);
    assert_eq!(stats.frames_dropped, 3);
    for letter in driver.scene().letters() {
        assert_eq!(letter.launch(), Point::new(100.0, 100.0));
    }
}

#[test]
fn failed_frame_is_skipped_and_run_continues() {
    let mut driver = driver_with(
        &["HI"],
        Box::new(FixedViewport(Viewport::new(50.0, 50.0))),
        RunLimit::Frames(4),
    );
    driver.surface_mut().fail_clear_at = vec![1];
    let mut sink = InMemorySink::new();
    let stats = driver.run(&mut sink).unwrap();

    assert_eq!(stats.frames, 4);
    assert_eq!(stats.frames_failed, 1);
    assert_eq!(stats.frames_emitted, 3);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| i.0).collect();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn step_frame_applies_resize_before_tick() {
    let viewports = ScriptedViewport::new(
        Viewport::new(100.0, 100.0),
        vec![(FrameIndex(0), Viewport::new(300.0, 200.0))],
    );
    let mut driver = driver_with(&["A"], Box::new(viewports), RunLimit::Frames(1));
    let (_, frame) = driver.step_frame().unwrap();
    let frame = frame.unwrap();
    assert_eq!((frame.width, frame.height), (300, 200));
}
