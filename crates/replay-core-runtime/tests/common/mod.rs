#![allow(dead_code)]

use replay_core::{
    Event, EventKind, FileKind, LineEnding, LineRange, Position, Range, Selection, SessionBody,
    SessionHead, Snapshot,
};

pub const URI: &str = "file:///notes.txt";

fn opening(uri: &str, file: FileKind, text: Option<&str>) -> Vec<Event> {
    vec![
        Event::new(0.0, uri, EventKind::Init { file }),
        Event::new(
            0.0,
            uri,
            EventKind::OpenDocument {
                text: text.map(str::to_string),
                eol: LineEnding::Lf,
            },
        ),
        Event::new(
            0.0,
            uri,
            EventKind::ShowEditor {
                selections: vec![Selection::caret(Position::new(0, 0))],
                visible_range: LineRange::new(0, 20),
                rev_uri: None,
                rev_selections: None,
                rev_visible_range: None,
            },
        ),
    ]
}

fn snapshot(events: Vec<Event>, duration: f64) -> Snapshot {
    Snapshot::initial(
        SessionHead {
            duration,
            ..SessionHead::default()
        },
        SessionBody::new(events, Vec::new(), Vec::new()),
    )
}

/// An empty document typed into: "hello" at 1s, " world" at 2s, three seconds long.
pub fn hello_world() -> Snapshot {
    let mut events = opening(URI, FileKind::Empty, Some(""));
    events.push(Event::new(
        1.0,
        URI,
        EventKind::TextInsert {
            text: "hello".into(),
            rev_range: Range::from_coords(0, 0, 0, 5),
        },
    ));
    events.push(Event::new(
        2.0,
        URI,
        EventKind::TextInsert {
            text: " world".into(),
            rev_range: Range::from_coords(0, 5, 0, 11),
        },
    ));
    snapshot(events, 3.0)
}

/// A zero-length session with one open, empty document.
pub fn blank() -> Snapshot {
    snapshot(opening(URI, FileKind::Empty, Some("")), 0.0)
}

/// A session whose only document lives in a blob nobody can provide.
pub fn missing_blob() -> Snapshot {
    let file = FileKind::LocalBlob {
        hash: "f".repeat(64),
    };
    snapshot(opening(URI, file, None), 1.0)
}
