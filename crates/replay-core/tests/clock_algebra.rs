use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use replay_core::ClockRange;
use replay_core::clock::{change_speed, change_speed_range, insert_gap, merge, unchange_speed, unmerge};

/// Multiples of 1/8 up to 40: exact in binary floating point.
fn dyadic_clocks() -> impl Iterator<Item = f64> {
    (0..=320).map(|i| i as f64 / 8.0)
}

#[test]
fn test_insert_gap_then_merge_is_identity() {
    for at in [0.0, 2.0, 7.5] {
        for duration in [0.5, 3.0, 10.0] {
            let gap = ClockRange::new(at, at + duration).unwrap();
            for c in dyadic_clocks() {
                assert_eq!(merge(insert_gap(c, at, duration), gap), c, "c={c} at={at} dur={duration}");
            }
        }
    }
}

#[test]
fn test_change_speed_inverse_law() {
    let range = ClockRange::new(2.0, 6.0).unwrap();
    for factor in [0.25, 0.5, 2.0, 4.0] {
        let image = change_speed_range(range, factor);
        for c in dyadic_clocks() {
            let forward = change_speed(c, range, factor);
            assert_eq!(change_speed(forward, image, 1.0 / factor), c, "c={c} factor={factor}");
            assert_eq!(unchange_speed(forward, range, factor), c);
        }
    }
}

#[test]
fn test_inverse_laws_hold_approximately_for_arbitrary_values() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..10_000 {
        let start = rng.gen_range(0.0..100.0);
        let range = ClockRange::new(start, start + rng.gen_range(0.0..50.0)).unwrap();
        let factor = rng.gen_range(0.1..10.0);
        let c = rng.gen_range(0.0..200.0);

        let back = unchange_speed(change_speed(c, range, factor), range, factor);
        assert!((back - c).abs() < 1e-9 * c.max(1.0), "c={c} back={back}");

        let gap = rng.gen_range(0.0..20.0);
        let back = merge(insert_gap(c, start, gap), ClockRange::new(start, start + gap).unwrap());
        assert!((back - c).abs() < 1e-9 * c.max(1.0));
    }
}

#[test]
fn test_mappings_are_monotonic() {
    let range = ClockRange::new(3.0, 9.0).unwrap();
    let clocks: Vec<f64> = dyadic_clocks().collect();
    for pair in clocks.windows(2) {
        assert!(change_speed(pair[0], range, 3.0) <= change_speed(pair[1], range, 3.0));
        assert!(merge(pair[0], range) <= merge(pair[1], range));
        assert!(insert_gap(pair[0], 4.0, 2.0) <= insert_gap(pair[1], 4.0, 2.0));
    }
}

#[test]
fn test_unmerge_is_exact_away_from_merged_range() {
    let range = ClockRange::new(4.0, 10.0).unwrap();
    // Everything in [4, 10] lands on 4, so only 4 itself comes back.
    for c in dyadic_clocks().filter(|&c| c <= 4.0 || c > 10.0) {
        assert_eq!(unmerge(merge(c, range), range), c);
    }
}
