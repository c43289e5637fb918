mod common;

use common::{URI, assert_consistent, projection_at, record_session};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use replay_core::{
    Direction, Directive, Event, EventKind, FileKind, NoBlobs, Projection, Range, SessionBody,
    SessionHead, Snapshot, Stepper,
};

fn save_session(clocks: &[f64], duration: f64) -> Snapshot {
    let mut events = vec![Event::new(0.0, URI, EventKind::Init { file: FileKind::Empty })];
    events.extend(clocks.iter().map(|&c| Event::new(c, URI, EventKind::Save)));
    Snapshot::initial(
        SessionHead {
            duration,
            ..SessionHead::default()
        },
        SessionBody::new(events, Vec::new(), Vec::new()),
    )
}

#[test]
fn test_seek_scenario() {
    // Clocks [0, 1, 2, 3].
    let snapshot = save_session(&[1.0, 2.0, 3.0], 3.0);
    let mut stepper = Stepper::new(&NoBlobs);
    let mut projection = Projection::new();
    projection.load(&snapshot, &mut stepper).unwrap();
    projection.seek(&snapshot, 1.0, &mut stepper).unwrap();
    assert_eq!(projection.boundary(), Some(1));

    let plan = projection.seek(&snapshot, 2.5, &mut stepper).unwrap();
    assert_eq!(plan.steps, vec![2]);
    assert_eq!(plan.direction, Direction::Forward);
    assert_eq!(projection.boundary(), Some(2));
    assert_eq!(projection.clock(), 2.5);
}

#[test]
fn test_load_applies_events_at_zero() {
    let snapshot = record_session(1, 10);
    let projection = projection_at(&snapshot, 0.0);
    assert_eq!(projection.boundary(), Some(2));
    assert!(projection.state().editor(URI).is_some());
}

#[test]
fn test_seek_symmetry() {
    let mut rng = StdRng::seed_from_u64(7);
    for seed in 0..20 {
        let snapshot = record_session(seed, 80);
        let duration = snapshot.duration();
        for _ in 0..10 {
            // Quarter offsets never coincide with the integer event clocks.
            let a = rng.gen_range(0.0..duration).floor() + 0.25;
            let b = rng.gen_range(0.0..duration).floor() + 0.75;

            let mut stepper = Stepper::new(&NoBlobs);
            let mut projection = projection_at(&snapshot, a);
            let at_a = projection.clone();

            projection.seek(&snapshot, b, &mut stepper).unwrap();
            assert_consistent(&projection, &snapshot);
            projection.seek(&snapshot, a, &mut stepper).unwrap();

            assert!(projection == at_a, "seek {a} -> {b} -> {a} diverged (seed {seed})");
        }
    }
}

#[test]
fn test_seek_symmetry_on_event_clocks() {
    let snapshot = record_session(4, 60);
    let duration = snapshot.duration();
    let loaded = projection_at(&snapshot, 0.0);
    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..30 {
        // Integer clocks, 0 included, are shared by two events each.
        let a = rng.gen_range(0..=duration as u32) as f64;
        let b = rng.gen_range(0..=duration as u32) as f64;

        let mut stepper = Stepper::new(&NoBlobs);
        let mut projection = projection_at(&snapshot, a);
        let at_a = projection.clone();
        projection.seek(&snapshot, b, &mut stepper).unwrap();
        assert_consistent(&projection, &snapshot);
        projection.seek(&snapshot, a, &mut stepper).unwrap();
        assert!(projection == at_a, "seek {a} -> {b} -> {a} diverged");
    }

    // Back to zero reproduces the freshly loaded workspace.
    let mut stepper = Stepper::new(&NoBlobs);
    let mut projection = projection_at(&snapshot, duration);
    projection.seek(&snapshot, 0.0, &mut stepper).unwrap();
    assert_eq!(projection.boundary(), loaded.boundary());
    assert!(projection.state() == loaded.state());
    assert!(projection.state().editor(URI).is_some());
}

#[test]
fn test_random_seeks_stay_consistent() {
    let snapshot = record_session(99, 120);
    let mut rng = StdRng::seed_from_u64(99);
    let mut stepper = Stepper::new(&NoBlobs);
    let mut projection = projection_at(&snapshot, 0.0);
    for _ in 0..200 {
        // Integer targets land exactly on event clocks.
        let target = if rng.gen_bool(0.5) {
            rng.gen_range(0..=snapshot.duration() as u32) as f64
        } else {
            rng.gen_range(0.0..snapshot.duration())
        };
        projection.seek(&snapshot, target, &mut stepper).unwrap();
        assert_consistent(&projection, &snapshot);
    }
}

#[test]
fn test_seek_idempotence() {
    let snapshot = record_session(3, 40);
    let mut stepper = Stepper::new(&NoBlobs);
    let mut projection = projection_at(&snapshot, 15.0);
    for target in [7.0, 7.5, 12.0, 0.0, 20.0] {
        projection.seek(&snapshot, target, &mut stepper).unwrap();
        let once = projection.clone();
        let plan = projection.seek(&snapshot, target, &mut stepper).unwrap();
        assert!(plan.is_empty());
        assert!(projection == once);
    }
}

#[test]
fn test_tie_break_is_deterministic() {
    let insert = |text: &str, at: usize| {
        Event::new(
            1.0,
            URI,
            EventKind::TextInsert {
                text: text.into(),
                rev_range: Range::from_coords(0, at, 0, at + text.len()),
            },
        )
    };
    let events = vec![
        Event::new(0.0, URI, EventKind::Init { file: FileKind::Empty }),
        Event::new(
            0.0,
            URI,
            EventKind::OpenDocument {
                text: Some(String::new()),
                eol: Default::default(),
            },
        ),
        insert("a", 0),
        insert("b", 1),
    ];
    let snapshot = Snapshot::initial(
        SessionHead {
            duration: 2.0,
            ..SessionHead::default()
        },
        SessionBody::new(events, Vec::new(), Vec::new()),
    );

    let mut stepper = Stepper::new(&NoBlobs);
    let mut projection = projection_at(&snapshot, 0.0);
    let mut forward = Vec::new();
    let mut backward = Vec::new();
    for round in 0..5 {
        stepper.take_directives();
        let plan = projection.seek(&snapshot, 1.0, &mut stepper).unwrap();
        assert_eq!(plan.steps, vec![2, 3], "round {round}");
        forward.push(stepper.take_directives());
        assert_eq!(projection.state().document(URI).unwrap().text(), "ab");

        let plan = projection.seek(&snapshot, 0.5, &mut stepper).unwrap();
        assert_eq!(plan.steps, vec![3, 2], "round {round}");
        backward.push(stepper.take_directives());
        assert_eq!(projection.state().document(URI).unwrap().text(), "");
    }
    assert!(forward.windows(2).all(|w| w[0] == w[1]));
    assert!(backward.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(
        forward[0][0],
        Directive::ReplaceText {
            uri: URI.into(),
            range: Range::from_coords(0, 0, 0, 0),
            text: "a".into(),
        }
    );
}

#[test]
fn test_affected_uris() {
    let snapshot = record_session(5, 20);
    let mut stepper = Stepper::new(&NoBlobs);
    let mut projection = projection_at(&snapshot, 0.0);
    let plan = projection.seek(&snapshot, 5.0, &mut stepper).unwrap();
    let uris = plan.affected_uris(snapshot.events());
    assert_eq!(uris.into_iter().collect::<Vec<_>>(), vec![URI.to_string()]);
}
