use super::*;

#[test]
fn rng_is_deterministic() {
    let mut a = Rng64::new(123);
    let mut b = Rng64::new(123);
    for _ in 0..10 {
        assert_eq!(a.next_u64(), b.next_u64());
    }
}

#[test]
fn unit_samples_stay_in_range() {
    let mut rng = Rng64::new(7);
    for _ in 0..1000 {
        let v = rng.next_unit();
        assert!((0.0..1.0).contains(&v));
    }
}

#[test]
fn sequence_cycles_and_clamps() {
    let mut seq = SequenceRandom::new(vec![0.25, 2.0, -1.0]);
    assert_eq!(seq.next_unit(), 0.25);
    assert!(seq.next_unit() < 1.0);
    assert_eq!(seq.next_unit(), 0.0);
    assert_eq!(seq.next_unit(), 0.25);

    let mut empty = SequenceRandom::default();
    assert_eq!(empty.next_unit(), 0.0);
}

#[test]
fn boxed_source_forwards() {
    let mut boxed: Box<dyn RandomSource> = Box::new(SequenceRandom::constant(0.5));
    assert_eq!(boxed.next_unit(), 0.5);
}
