#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use replay_core::{
    ContentChange, Document, Event, EventKind, FileKind, LineEnding, LineRange, NoBlobs,
    Position, Projection, Range, Selection, SessionBody, SessionHead, Snapshot, Stepper,
    WorkspaceState,
};

pub const URI: &str = "file:///src/main.rs";

const SNIPPETS: &[&str] = &[
    "x", "ab", "\n", "é", "😀", "foo\nbar", "", "  let y = 1;\r\n", "}\n\n",
];

pub fn random_position(rng: &mut StdRng, doc: &Document) -> Position {
    let line = rng.gen_range(0..doc.line_count());
    let character = rng.gen_range(0..=doc.line_len(line).unwrap());
    Position::new(line, character)
}

pub fn random_text(rng: &mut StdRng) -> String {
    SNIPPETS[rng.gen_range(0..SNIPPETS.len())].to_string()
}

/// Record a single-file session of `steps` random edits, selections and scrolls.
///
/// Clocks go `0, 1, 1, 2, 2, ...` so every clock after zero is shared by two events.
pub fn record_session(seed: u64, steps: usize) -> Snapshot {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut shadow = Document::new(URI, "fn main() {\n}\n", LineEnding::Lf);
    let mut selections = vec![Selection::caret(Position::new(0, 0))];
    let mut visible = LineRange::new(0, 20);

    let mut events = vec![
        Event::new(0.0, URI, EventKind::Init { file: FileKind::Empty }),
        Event::new(
            0.0,
            URI,
            EventKind::OpenDocument {
                text: Some(shadow.text()),
                eol: LineEnding::Lf,
            },
        ),
        Event::new(
            0.0,
            URI,
            EventKind::ShowEditor {
                selections: selections.clone(),
                visible_range: visible,
                rev_uri: None,
                rev_selections: None,
                rev_visible_range: None,
            },
        ),
    ];

    for i in 1..=steps {
        let clock = ((i + 1) / 2) as f64;
        let kind = match rng.gen_range(0..5) {
            0 | 1 => {
                let pos = random_position(&mut rng, &shadow);
                let text = random_text(&mut rng);
                let rev = shadow
                    .apply_content_change(&ContentChange::new(Range::caret(pos), text.clone()), true)
                    .unwrap()
                    .unwrap();
                EventKind::TextInsert {
                    text,
                    rev_range: rev.range,
                }
            }
            2 => {
                let a = random_position(&mut rng, &shadow);
                let b = random_position(&mut rng, &shadow);
                let change = ContentChange::new(Range::new(a, b), random_text(&mut rng));
                let rev = shadow
                    .apply_content_changes(std::slice::from_ref(&change), true)
                    .unwrap();
                EventKind::TextChange {
                    content_changes: vec![change],
                    rev_content_changes: rev,
                }
            }
            3 => {
                let next = vec![Selection::new(
                    random_position(&mut rng, &shadow),
                    random_position(&mut rng, &shadow),
                )];
                let rev = std::mem::replace(&mut selections, next.clone());
                EventKind::Select {
                    selections: next,
                    rev_selections: rev,
                }
            }
            _ => {
                let start = rng.gen_range(0..10);
                let next = LineRange::new(start, start + 20);
                let rev = std::mem::replace(&mut visible, next);
                EventKind::Scroll {
                    visible_range: next,
                    rev_visible_range: rev,
                }
            }
        };
        events.push(Event::new(clock, URI, kind));
    }

    let duration = events.last().map_or(0.0, |e| e.clock) + 1.0;
    Snapshot::initial(
        SessionHead {
            duration,
            ..SessionHead::default()
        },
        SessionBody::new(events, Vec::new(), Vec::new()),
    )
}

/// A fresh projection of `snapshot`, moved forward to `clock`.
pub fn projection_at(snapshot: &Snapshot, clock: f64) -> Projection {
    let mut stepper = Stepper::new(&NoBlobs);
    let mut projection = Projection::new();
    projection.load(snapshot, &mut stepper).unwrap();
    projection.seek(snapshot, clock, &mut stepper).unwrap();
    projection
}

/// The workspace after applying `events[..=boundary]` forward to an empty state.
pub fn prefix_state(events: &[Event], boundary: Option<usize>) -> WorkspaceState {
    let mut stepper = Stepper::new(&NoBlobs);
    let mut state = WorkspaceState::new();
    if let Some(b) = boundary {
        for event in &events[..=b] {
            stepper
                .step(&mut state, event, replay_core::Direction::Forward)
                .unwrap();
        }
    }
    state
}

/// Assert that `projection` is exactly the prefix of `snapshot` its boundary names, and that the
/// boundary agrees with its clock.
pub fn assert_consistent(projection: &Projection, snapshot: &Snapshot) {
    let events = snapshot.events();
    let boundary = projection.boundary();
    let clock = projection.clock();
    for (i, event) in events.iter().enumerate() {
        let applied = boundary.is_some_and(|b| i <= b);
        if applied {
            assert!(event.clock <= clock, "event {i} at {} applied past clock {clock}", event.clock);
        } else {
            assert!(event.clock > clock, "event {i} at {} missing at clock {clock}", event.clock);
        }
    }
    assert!(
        projection.state() == &prefix_state(events, boundary),
        "projection diverged from the prefix at {boundary:?}"
    );
}
