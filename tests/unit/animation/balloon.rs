use super::*;
use crate::foundation::core::Viewport;
use crate::foundation::rng::SequenceRandom;
use crate::render::recording::{DrawCmd, RecordingSurface};

fn balloon() -> Balloon {
    Balloon::new(
        Point::new(100.0, 200.0),
        LetterPalette::from_hue(120.0),
        20.0,
        0.5,
        0.01,
    )
}

#[test]
fn spawn_draws_size_then_velocity() {
    let opts = GreetingOpts::default();
    let mut rng = SequenceRandom::new(vec![0.5, 0.25]);
    let b = Balloon::spawn(Point::new(0.0, 0.0), LetterPalette::from_hue(0.0), &opts, &mut rng);
    assert_eq!(b.size(), 12.0 + 20.0 * 0.5);
    assert_eq!(b.vel_y(), 0.4 + 0.4 * 0.25);
    assert_eq!(b.alpha(), 1.0);
}

#[test]
fn step_rises_and_fades() {
    let mut b = balloon();
    b.step();
    assert_eq!(b.pos(), Point::new(100.0, 199.5));
    assert!((b.alpha() - 0.99).abs() < 1e-12);
    assert!(!b.is_expired());
}

#[test]
fn alpha_floors_at_zero() {
    let mut b = balloon().with_alpha(0.005);
    b.step();
    assert_eq!(b.alpha(), 0.0);
    assert!(b.is_expired());
    b.step();
    assert_eq!(b.alpha(), 0.0);
}

#[test]
fn alpha_is_non_increasing_until_expiry() {
    let mut b = balloon();
    let mut prev = b.alpha();
    let mut steps = 0;
    while !b.is_expired() {
        b.step();
        assert!(b.alpha() <= prev);
        prev = b.alpha();
        steps += 1;
        assert!(steps <= 101);
    }
    assert!(steps >= 100);
}

#[test]
fn draw_is_bracketed_ellipse_with_alpha() {
    let mut surface = RecordingSurface::new(Viewport::new(400.0, 400.0));
    let b = balloon().with_alpha(0.4);
    b.draw(&mut surface).unwrap();

    assert_eq!(surface.save_depth(), 0);
    match &surface.commands()[0] {
        DrawCmd::Ellipse {
            center,
            rx,
            ry,
            state,
        } => {
            assert_eq!(*center, Point::new(100.0, 200.0));
            assert!((rx - 12.0).abs() < 1e-12);
            assert_eq!(*ry, 20.0);
            assert_eq!(state.global_alpha, 0.4);
            assert_eq!(state.fill, LetterPalette::from_hue(120.0).solid());
        }
        other => panic!("unexpected {other:?}"),
    }
}
