use super::*;

#[test]
fn measures_with_fixed_advance() {
    let mut s = RecordingSurface::with_advance(Viewport::new(100.0, 100.0), 0.5);
    assert_eq!(s.measure_text("ABCD", 20.0).unwrap(), 40.0);
    assert_eq!(s.measure_text("", 20.0).unwrap(), 0.0);
    assert!(s.measure_text("A", 0.0).is_err());
}

#[test]
fn injected_measure_failures_are_per_text() {
    let mut s = RecordingSurface::new(Viewport::new(100.0, 100.0));
    s.fail_measuring("BAD");
    assert!(s.measure_text("BAD", 10.0).is_err());
    assert!(s.measure_text("GOOD", 10.0).is_ok());
}

#[test]
fn records_state_snapshot_per_command() {
    let mut s = RecordingSurface::new(Viewport::new(100.0, 100.0));
    s.save();
    s.set_global_alpha(0.25);
    s.fill_ellipse(Point::new(1.0, 2.0), 3.0, 5.0).unwrap();
    s.restore();
    s.fill_text("A", Point::new(0.0, 0.0)).unwrap();

    match &s.commands()[0] {
        DrawCmd::Ellipse { state, rx, ry, .. } => {
            assert_eq!(state.global_alpha, 0.25);
            assert_eq!((*rx, *ry), (3.0, 5.0));
        }
        other => panic!("unexpected {other:?}"),
    }
    match &s.commands()[1] {
        DrawCmd::Text { state, .. } => assert_eq!(state.global_alpha, 1.0),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(s.save_depth(), 0);
}

#[test]
fn clear_drops_commands() {
    let mut s = RecordingSurface::new(Viewport::new(100.0, 100.0));
    s.fill_text("A", Point::new(0.0, 0.0)).unwrap();
    s.clear().unwrap();
    assert!(s.commands().is_empty());
    assert_eq!(s.clears(), 1);
    assert!(s.finish_frame().unwrap().is_none());
    assert_eq!(s.frames_finished(), 1);
}
