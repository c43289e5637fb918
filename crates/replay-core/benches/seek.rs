use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use replay_core::edit::insert_gap;
use replay_core::{
    ContentChange, Document, Event, EventKind, FileKind, LineEnding, NoBlobs, Position,
    Projection, Range, SessionBody, SessionHead, Snapshot, SnapshotStack, Stepper,
};

const URI: &str = "file:///bench.rs";

/// A typing session: one character every 10ms, a newline every 60 characters.
fn typing_session(keystrokes: usize) -> Snapshot {
    let mut shadow = Document::new(URI, "", LineEnding::Lf);
    let mut events = vec![
        Event::new(0.0, URI, EventKind::Init { file: FileKind::Empty }),
        Event::new(
            0.0,
            URI,
            EventKind::OpenDocument {
                text: Some(String::new()),
                eol: LineEnding::Lf,
            },
        ),
    ];
    let mut pos = Position::new(0, 0);
    for i in 0..keystrokes {
        let text = if i % 60 == 59 { "\n" } else { "x" };
        let rev = shadow
            .apply_content_change(&ContentChange::new(Range::caret(pos), text), true)
            .unwrap()
            .unwrap();
        pos = rev.range.end;
        events.push(Event::new(
            (i + 1) as f64 * 0.01,
            URI,
            EventKind::TextInsert {
                text: text.to_string(),
                rev_range: rev.range,
            },
        ));
    }
    let duration = keystrokes as f64 * 0.01 + 1.0;
    Snapshot::initial(
        SessionHead {
            duration,
            ..SessionHead::default()
        },
        SessionBody::new(events, Vec::new(), Vec::new()),
    )
}

fn bench_full_seek(c: &mut Criterion) {
    let snapshot = typing_session(20_000);
    c.bench_function("seek/20k_events_start_to_end", |b| {
        b.iter_batched(
            || {
                let mut projection = Projection::new();
                projection
                    .load(&snapshot, &mut Stepper::new(&NoBlobs))
                    .unwrap();
                projection
            },
            |mut projection| {
                let mut stepper = Stepper::new(&NoBlobs);
                projection
                    .seek(&snapshot, black_box(snapshot.duration()), &mut stepper)
                    .unwrap();
                black_box(projection.boundary());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_scrub(c: &mut Criterion) {
    let snapshot = typing_session(20_000);
    let mut projection = Projection::new();
    let mut stepper = Stepper::new(&NoBlobs);
    projection.load(&snapshot, &mut stepper).unwrap();
    projection.seek(&snapshot, 100.0, &mut stepper).unwrap();

    c.bench_function("seek/scrub_one_second", |b| {
        let mut forward = true;
        b.iter(|| {
            let target = if forward { 101.0 } else { 100.0 };
            forward = !forward;
            projection.seek(&snapshot, target, &mut stepper).unwrap();
            stepper.take_directives();
        })
    });
}

fn bench_effect_replay(c: &mut Criterion) {
    let snapshot = typing_session(20_000);
    c.bench_function("replay/insert_gap_then_undo", |b| {
        b.iter_batched(
            || {
                let mut projection = Projection::new();
                let mut stepper = Stepper::new(&NoBlobs);
                projection.load(&snapshot, &mut stepper).unwrap();
                projection.seek(&snapshot, 150.0, &mut stepper).unwrap();
                (SnapshotStack::new(snapshot.clone()), projection)
            },
            |(mut stack, mut projection)| {
                let mut stepper = Stepper::new(&NoBlobs);
                let edit = insert_gap(stack.current(), &projection.edit_context(), 50.0, 5.0).unwrap();
                let transition = stack.push_edit(edit, false);
                projection.replay(&transition, &mut stepper).unwrap();
                let transition = stack.undo().unwrap();
                projection.replay(&transition, &mut stepper).unwrap();
                black_box(projection.clock());
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_full_seek, bench_scrub, bench_effect_replay);
criterion_main!(benches);
