use super::*;
use crate::foundation::core::Viewport;
use crate::foundation::rng::{Rng64, SequenceRandom};
use crate::render::recording::{DrawCmd, RecordingSurface};

fn fixed_opts(spawn: f64, reach: f64, hold: f64) -> GreetingOpts {
    GreetingOpts {
        firework_base_spawn_time: spawn,
        firework_added_spawn_time: 0.0,
        firework_base_reach_time: reach,
        firework_added_reach_time: 0.0,
        balloon_base_time: hold,
        balloon_added_time: 0.0,
        ..GreetingOpts::default()
    }
}

fn letter(opts: &GreetingOpts, rng: &mut dyn RandomSource) -> Letter {
    Letter::new(
        'H',
        Point::new(300.0, 100.0),
        Point::new(400.0, 600.0),
        LetterPalette::from_hue(90.0),
        opts,
        rng,
    )
}

#[test]
fn spawn_delay_is_drawn_at_creation() {
    let opts = GreetingOpts::default();
    let mut rng = SequenceRandom::new(vec![0.5]);
    let l = letter(&opts, &mut rng);
    assert_eq!(l.phase(), &Phase::PreSpawn { spawn_at: 150 });
    assert_eq!(l.tick(), 0);
}

#[test]
fn zero_spawn_and_unit_reach_lands_on_second_tick() {
    let opts = fixed_opts(0.0, 1.0, 40.0);
    let mut rng = SequenceRandom::constant(0.0);
    let mut l = letter(&opts, &mut rng);

    assert!(l.step(&opts, &mut rng).is_none());
    assert_eq!(l.phase().kind(), PhaseKind::Traveling);
    assert!(l.trajectory().is_empty());

    let balloon = l.step(&opts, &mut rng).expect("balloon on landing");
    assert_eq!(l.phase().kind(), PhaseKind::Balloon);
    assert!(l.trajectory().is_empty());
    assert_eq!(balloon.pos(), l.target());
    assert_eq!(balloon.palette(), l.palette());
}

#[test]
fn trajectory_grows_one_point_per_tick_and_interpolates() {
    let opts = fixed_opts(0.0, 4.0, 10.0);
    let mut rng = SequenceRandom::constant(0.0);
    let mut l = letter(&opts, &mut rng);
    l.step(&opts, &mut rng);

    for n in 1..4 {
        assert!(l.step(&opts, &mut rng).is_none());
        assert_eq!(l.trajectory().len(), n);
    }
    // Three quarters of the way from (400, 600) to (300, 100).
    let last = *l.trajectory().last().unwrap();
    assert!((last.x - 325.0).abs() < 1e-9);
    assert!((last.y - 225.0).abs() < 1e-9);

    assert!(l.step(&opts, &mut rng).is_some());
    assert!(l.trajectory().is_empty());
}

#[test]
fn balloon_hold_then_done() {
    let opts = fixed_opts(0.0, 1.0, 3.0);
    let mut rng = SequenceRandom::constant(0.0);
    let mut l = letter(&opts, &mut rng);
    l.step(&opts, &mut rng);
    l.step(&opts, &mut rng);
    assert_eq!(l.phase(), &Phase::Balloon { hold_time: 3 });

    for _ in 0..3 {
        l.step(&opts, &mut rng);
        assert_eq!(l.phase().kind(), PhaseKind::Balloon);
    }
    l.step(&opts, &mut rng);
    assert!(l.is_done());
    assert!(l.step(&opts, &mut rng).is_none());
    assert!(l.is_done());
}

#[test]
fn phases_are_monotonic_and_spawn_exactly_one_balloon() {
    let opts = GreetingOpts::default();
    let mut rng = Rng64::new(42);
    for _ in 0..20 {
        let mut l = letter(&opts, &mut rng);
        let mut prev = l.phase().kind();
        let mut balloons = 0;
        for _ in 0..1000 {
            let spawned = l.step(&opts, &mut rng);
            let kind = l.phase().kind();
            assert!(kind >= prev);
            let jump = kind as u8 - prev as u8;
            assert!(jump <= 1, "skipped a phase: {prev:?} -> {kind:?}");
            if spawned.is_some() {
                balloons += 1;
                assert_eq!(prev, PhaseKind::Traveling);
                assert_eq!(kind, PhaseKind::Balloon);
            }
            prev = kind;
        }
        assert!(l.is_done());
        assert_eq!(balloons, 1);
    }
}

#[test]
fn reach_time_never_zero() {
    let opts = fixed_opts(0.0, 0.0, 0.0);
    let mut rng = SequenceRandom::constant(0.0);
    let mut l = letter(&opts, &mut rng);
    l.step(&opts, &mut rng);
    match l.phase() {
        Phase::Traveling { reach_time, .. } => assert_eq!(*reach_time, 1),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn draw_follows_phase() {
    let opts = fixed_opts(1.0, 2.0, 5.0);
    let mut rng = SequenceRandom::constant(0.0);
    let mut surface = RecordingSurface::new(Viewport::new(800.0, 600.0));
    let mut l = letter(&opts, &mut rng);

    l.draw(&mut surface, &opts).unwrap();
    assert!(surface.commands().is_empty());

    l.step(&opts, &mut rng);
    l.step(&opts, &mut rng);
    l.draw(&mut surface, &opts).unwrap();
    let texts = surface.texts();
    assert_eq!(texts.len(), 1);
    assert_eq!(texts[0].0, "H");
    assert_eq!(texts[0].1, Point::new(350.0, 350.0));

    surface.clear().unwrap();
    l.step(&opts, &mut rng);
    l.draw(&mut surface, &opts).unwrap();
    match &surface.commands()[0] {
        DrawCmd::Text { at, state, .. } => {
            assert_eq!(*at, Point::new(300.0, 100.0));
            assert_eq!(state.font_size, 30.0);
            assert_eq!(state.align, TextAlign::Center);
            assert_eq!(state.baseline, TextBaseline::Middle);
            assert_eq!(state.fill, LetterPalette::from_hue(90.0).solid());
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(surface.save_depth(), 0);
}

#[test]
fn trail_mode_strokes_from_launch() {
    let opts = GreetingOpts {
        draw_trail: true,
        ..fixed_opts(0.0, 4.0, 5.0)
    };
    let mut rng = SequenceRandom::constant(0.0);
    let mut surface = RecordingSurface::new(Viewport::new(800.0, 600.0));
    let mut l = letter(&opts, &mut rng);
    l.step(&opts, &mut rng);
    l.step(&opts, &mut rng);
    l.step(&opts, &mut rng);
    l.draw(&mut surface, &opts).unwrap();

    match &surface.commands()[0] {
        DrawCmd::Polyline {
            points,
            width,
            state,
        } => {
            assert_eq!(points.len(), 3);
            assert_eq!(points[0], l.launch());
            assert_eq!(*width, opts.firework_base_line_width);
            assert_eq!(state.fill, LetterPalette::from_hue(90.0).light());
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(matches!(surface.commands()[1], DrawCmd::Text { .. }));
}

#[test]
fn huge_reach_time_does_not_preallocate() {
    // Built directly, bypassing validation.
    let opts = fixed_opts(0.0, 1.0e12, 1.0);
    let mut rng = SequenceRandom::constant(0.0);
    let mut l = letter(&opts, &mut rng);

    assert!(l.step(&opts, &mut rng).is_none());
    assert_eq!(l.phase().kind(), PhaseKind::Traveling);
    assert!(l.step(&opts, &mut rng).is_none());
    assert_eq!(l.trajectory().len(), 1);
}
