//! Structural session edits.
//!
//! Every edit is a pure function from the current [`Snapshot`] (plus the live runtime's
//! [`EditContext`]) to an [`Edit`]: a [`BodyPatch`] describing the new values and the
//! [`Effect`]s a live runtime replays to follow along. Nothing here touches a runtime.

use crate::clock::{self, ClockRange};
use crate::effect::Effect;
use crate::error::{ReplayError, Result};
use crate::event::Event;
use crate::session::{
    FocusMarker, MediaTrack, SessionBody, SessionHead, Snapshot, SurfaceSelection, TocItem,
};
use std::sync::Arc;

/// Live runtime values an edit needs but does not own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditContext {
    /// Runtime clock when the edit is made.
    pub clock: f64,
    /// Current surface selection.
    pub selection: Option<SurfaceSelection>,
}

impl EditContext {
    /// Create a context.
    pub fn new(clock: f64, selection: Option<SurfaceSelection>) -> Self {
        Self { clock, selection }
    }
}

/// Replacement values for the parts of a snapshot an edit changes. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BodyPatch {
    /// New event sequence.
    pub events: Option<Vec<Event>>,
    /// New focus markers.
    pub focus_markers: Option<Vec<FocusMarker>>,
    /// New media tracks.
    pub media_tracks: Option<Vec<MediaTrack>>,
    /// New duration.
    pub duration: Option<f64>,
    /// New table of contents.
    pub toc: Option<Vec<TocItem>>,
    /// New modification time.
    pub modification_time: Option<u64>,
}

impl BodyPatch {
    /// Returns `true` if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.events.is_none()
            && self.focus_markers.is_none()
            && self.media_tracks.is_none()
            && self.duration.is_none()
            && self.toc.is_none()
            && self.modification_time.is_none()
    }

    /// Build the snapshot that results from applying this patch to `base`.
    ///
    /// Untouched collections keep sharing their storage with `base`.
    pub fn apply(self, base: &Snapshot, effects: Vec<Effect>) -> Snapshot {
        let head = SessionHead {
            duration: self.duration.unwrap_or(base.head.duration),
            toc: self.toc.unwrap_or_else(|| base.head.toc.clone()),
            modification_time: self
                .modification_time
                .unwrap_or(base.head.modification_time),
        };
        let body = SessionBody {
            events: self
                .events
                .map(Arc::new)
                .unwrap_or_else(|| Arc::clone(&base.body.events)),
            focus_markers: self
                .focus_markers
                .map(Arc::new)
                .unwrap_or_else(|| Arc::clone(&base.body.focus_markers)),
            media_tracks: self
                .media_tracks
                .map(Arc::new)
                .unwrap_or_else(|| Arc::clone(&base.body.media_tracks)),
        };
        Snapshot {
            head,
            body,
            effects,
        }
    }
}

/// The result of an edit function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Edit {
    /// New values.
    pub patch: BodyPatch,
    /// Effects to replay on a live runtime.
    pub effects: Vec<Effect>,
}

impl Edit {
    /// Stamp the edit with a modification time.
    pub fn with_modification_time(mut self, millis: u64) -> Self {
        self.patch.modification_time = Some(millis);
        self
    }

    fn select(mut self, ctx: &EditContext, after: Option<SurfaceSelection>) -> Self {
        if ctx.selection != after {
            self.effects.push(Effect::SetSelection {
                before: ctx.selection.clone(),
                after,
            });
        }
        self
    }
}

fn check_order(events: &[Event], index: usize, clock: f64) -> Result<()> {
    clock::check_clock(clock)?;
    let after_prev = index == 0 || events[index - 1].clock <= clock;
    let before_next = events.get(index).is_none_or(|next| clock <= next.clock);
    if after_prev && before_next {
        Ok(())
    } else {
        Err(ReplayError::UnorderedClock { index, clock })
    }
}

/// Insert `event` at `index`. Its clock must fit between its neighbors.
pub fn insert_event(snapshot: &Snapshot, index: usize, event: Event) -> Result<Edit> {
    let events = snapshot.events();
    if index > events.len() {
        return Err(ReplayError::EventIndexOutOfBounds {
            index,
            len: events.len(),
        });
    }
    check_order(events, index, event.clock)?;

    let mut new_events = Vec::with_capacity(events.len() + 1);
    new_events.extend_from_slice(&events[..index]);
    new_events.push(event.clone());
    new_events.extend_from_slice(&events[index..]);

    Ok(Edit {
        patch: BodyPatch {
            duration: Some(snapshot.duration().max(event.clock)),
            events: Some(new_events),
            ..BodyPatch::default()
        },
        effects: vec![Effect::InsertEvent { event, index }],
    })
}

/// Replace the event at `index`. The new clock must fit between the neighbors.
pub fn update_event(snapshot: &Snapshot, index: usize, event: Event) -> Result<Edit> {
    let events = snapshot.events();
    let Some(before) = events.get(index) else {
        return Err(ReplayError::EventIndexOutOfBounds {
            index,
            len: events.len(),
        });
    };
    clock::check_clock(event.clock)?;
    let after_prev = index == 0 || events[index - 1].clock <= event.clock;
    let before_next = events.get(index + 1).is_none_or(|next| event.clock <= next.clock);
    if !(after_prev && before_next) {
        return Err(ReplayError::UnorderedClock {
            index,
            clock: event.clock,
        });
    }

    let mut new_events = events.to_vec();
    new_events[index] = event.clone();
    Ok(Edit {
        patch: BodyPatch {
            duration: Some(snapshot.duration().max(event.clock)),
            events: Some(new_events),
            ..BodyPatch::default()
        },
        effects: vec![Effect::UpdateEvent {
            before: before.clone(),
            after: event,
            index,
        }],
    })
}

/// Raise the duration to at least `duration` (used when recording ran past the end).
pub fn extend_duration(snapshot: &Snapshot, duration: f64) -> Result<Edit> {
    clock::check_clock(duration)?;
    let mut edit = Edit::default();
    if duration > snapshot.duration() {
        edit.patch.duration = Some(duration);
    }
    Ok(edit)
}

/// Delete everything stamped at or after `at`; the duration becomes `at`.
///
/// `at` beyond the current duration is clamped to it.
pub fn crop(snapshot: &Snapshot, ctx: &EditContext, at: f64) -> Result<Edit> {
    clock::check_clock(at)?;
    let at = at.min(snapshot.duration());
    let events = snapshot.events();
    let index = clock::crop_index(events.iter().map(|e| e.clock), at).unwrap_or(events.len());

    let focus_markers = snapshot
        .body
        .focus_markers
        .iter()
        .filter(|m| !clock::is_cropped(m.clock, at))
        .cloned()
        .collect();
    let toc = snapshot
        .head
        .toc
        .iter()
        .filter(|t| !clock::is_cropped(t.clock, at))
        .cloned()
        .collect();
    let media_tracks = snapshot
        .body
        .media_tracks
        .iter()
        .filter(|t| !clock::is_cropped(t.clock_range.start, at))
        .map(|t| MediaTrack {
            clock_range: ClockRange {
                start: t.clock_range.start,
                end: t.clock_range.end.min(at),
            },
            ..t.clone()
        })
        .collect();

    let selection = match &ctx.selection {
        Some(SurfaceSelection::Range(range)) if range.start < at => {
            Some(SurfaceSelection::Range(ClockRange {
                start: range.start,
                end: range.end.min(at),
            }))
        }
        Some(SurfaceSelection::Track(id))
            if snapshot
                .body
                .media_tracks
                .iter()
                .any(|t| &t.id == id && !clock::is_cropped(t.clock_range.start, at)) =>
        {
            ctx.selection.clone()
        }
        _ => None,
    };

    Ok(Edit {
        patch: BodyPatch {
            events: Some(events[..index].to_vec()),
            focus_markers: Some(focus_markers),
            media_tracks: Some(media_tracks),
            duration: Some(at),
            toc: Some(toc),
            modification_time: None,
        },
        effects: vec![Effect::CropEvents {
            events: events[index..].to_vec(),
            index,
            clock: at,
            prior_clock: ctx.clock,
        }],
    }
    .select(ctx, selection))
}

/// Map every clock of the session through `f`.
fn map_clocks(snapshot: &Snapshot, f: impl Fn(f64) -> f64) -> BodyPatch {
    BodyPatch {
        events: Some(
            snapshot
                .events()
                .iter()
                .map(|e| e.with_clock(f(e.clock)))
                .collect(),
        ),
        focus_markers: Some(
            snapshot
                .body
                .focus_markers
                .iter()
                .map(|m| FocusMarker {
                    clock: f(m.clock),
                    ..m.clone()
                })
                .collect(),
        ),
        media_tracks: Some(
            snapshot
                .body
                .media_tracks
                .iter()
                .map(|t| MediaTrack {
                    clock_range: t.clock_range.map(&f),
                    ..t.clone()
                })
                .collect(),
        ),
        duration: Some(f(snapshot.duration())),
        toc: Some(
            snapshot
                .head
                .toc
                .iter()
                .map(|t| TocItem {
                    clock: f(t.clock),
                    ..t.clone()
                })
                .collect(),
        ),
        modification_time: None,
    }
}

/// Play `range` at `factor` times its original speed.
pub fn change_speed(
    snapshot: &Snapshot,
    ctx: &EditContext,
    range: ClockRange,
    factor: f64,
) -> Result<Edit> {
    clock::check_factor(factor)?;
    let range = ClockRange::new(range.start, range.end)?;
    let patch = map_clocks(snapshot, |c| clock::change_speed(c, range, factor));
    Ok(Edit {
        patch,
        effects: vec![Effect::ChangeSpeed {
            range,
            factor,
            prior_clock: ctx.clock,
        }],
    }
    .select(
        ctx,
        Some(SurfaceSelection::Range(clock::change_speed_range(
            range, factor,
        ))),
    ))
}

/// Cut `range` out of the timeline, collapsing it onto its start.
pub fn merge(snapshot: &Snapshot, ctx: &EditContext, range: ClockRange) -> Result<Edit> {
    let range = ClockRange::new(range.start, range.end)?;
    let patch = map_clocks(snapshot, |c| clock::merge(c, range));
    Ok(Edit {
        patch,
        effects: vec![Effect::Merge {
            range,
            prior_clock: ctx.clock,
        }],
    }
    .select(ctx, None))
}

/// Insert `duration` seconds of empty timeline at `at`.
pub fn insert_gap(snapshot: &Snapshot, ctx: &EditContext, at: f64, duration: f64) -> Result<Edit> {
    let range = ClockRange::new(at, at + duration)?;
    let patch = map_clocks(snapshot, |c| clock::insert_gap(c, at, duration));
    Ok(Edit {
        patch,
        effects: vec![Effect::InsertGap {
            clock: at,
            duration,
            prior_clock: ctx.clock,
        }],
    }
    .select(ctx, Some(SurfaceSelection::Range(range))))
}

fn toc_insert_position(toc: &[TocItem], clock: f64) -> usize {
    toc.partition_point(|t| t.clock <= clock)
}

/// Add a table-of-contents entry, keeping the table sorted by clock.
pub fn insert_toc_item(snapshot: &Snapshot, ctx: &EditContext, item: TocItem) -> Result<Edit> {
    clock::check_clock(item.clock)?;
    let mut toc = snapshot.head.toc.clone();
    let index = toc_insert_position(&toc, item.clock);
    toc.insert(index, item);
    Ok(Edit {
        patch: BodyPatch {
            toc: Some(toc),
            ..BodyPatch::default()
        },
        effects: Vec::new(),
    }
    .select(ctx, Some(SurfaceSelection::Toc(index))))
}

/// Replace the table-of-contents entry at `index`, moving it if its clock changed.
pub fn update_toc_item(
    snapshot: &Snapshot,
    ctx: &EditContext,
    index: usize,
    item: TocItem,
) -> Result<Edit> {
    clock::check_clock(item.clock)?;
    let mut toc = snapshot.head.toc.clone();
    if index >= toc.len() {
        return Err(ReplayError::TocIndexOutOfBounds(index));
    }
    toc.remove(index);
    let new_index = toc_insert_position(&toc, item.clock);
    toc.insert(new_index, item);
    Ok(Edit {
        patch: BodyPatch {
            toc: Some(toc),
            ..BodyPatch::default()
        },
        effects: Vec::new(),
    }
    .select(ctx, Some(SurfaceSelection::Toc(new_index))))
}

/// Remove the table-of-contents entry at `index`.
pub fn delete_toc_item(snapshot: &Snapshot, ctx: &EditContext, index: usize) -> Result<Edit> {
    let mut toc = snapshot.head.toc.clone();
    if index >= toc.len() {
        return Err(ReplayError::TocIndexOutOfBounds(index));
    }
    toc.remove(index);
    let selection = match &ctx.selection {
        Some(SurfaceSelection::Toc(_)) => None,
        other => other.clone(),
    };
    Ok(Edit {
        patch: BodyPatch {
            toc: Some(toc),
            ..BodyPatch::default()
        },
        effects: Vec::new(),
    }
    .select(ctx, selection))
}

/// Add a media track. The duration grows to cover it.
pub fn insert_media_track(
    snapshot: &Snapshot,
    ctx: &EditContext,
    track: MediaTrack,
) -> Result<Edit> {
    let tracks = &snapshot.body.media_tracks;
    if tracks.iter().any(|t| t.id == track.id) {
        return Err(ReplayError::DuplicateMediaTrack(track.id));
    }
    let mut media_tracks = tracks.to_vec();
    let id = track.id.clone();
    let end = track.clock_range.end;
    media_tracks.push(track);
    Ok(Edit {
        patch: BodyPatch {
            media_tracks: Some(media_tracks),
            duration: Some(snapshot.duration().max(end)),
            ..BodyPatch::default()
        },
        effects: Vec::new(),
    }
    .select(ctx, Some(SurfaceSelection::Track(id))))
}

/// Replace the media track with the same id and select it. The duration grows to cover it.
pub fn update_media_track(
    snapshot: &Snapshot,
    ctx: &EditContext,
    track: MediaTrack,
) -> Result<Edit> {
    let mut media_tracks = snapshot.body.media_tracks.to_vec();
    let Some(slot) = media_tracks.iter_mut().find(|t| t.id == track.id) else {
        return Err(ReplayError::MediaTrackNotFound(track.id));
    };
    let id = track.id.clone();
    let end = track.clock_range.end;
    *slot = track;
    Ok(Edit {
        patch: BodyPatch {
            media_tracks: Some(media_tracks),
            duration: Some(snapshot.duration().max(end)),
            ..BodyPatch::default()
        },
        effects: Vec::new(),
    }
    .select(ctx, Some(SurfaceSelection::Track(id))))
}

/// Remove the media track `id`.
pub fn delete_media_track(snapshot: &Snapshot, ctx: &EditContext, id: &str) -> Result<Edit> {
    let tracks = &snapshot.body.media_tracks;
    if !tracks.iter().any(|t| t.id == id) {
        return Err(ReplayError::MediaTrackNotFound(id.to_string()));
    }
    let media_tracks = tracks.iter().filter(|t| t.id != id).cloned().collect();
    let selection = match &ctx.selection {
        Some(SurfaceSelection::Track(selected)) if selected == id => None,
        other => other.clone(),
    };
    Ok(Edit {
        patch: BodyPatch {
            media_tracks: Some(media_tracks),
            ..BodyPatch::default()
        },
        effects: Vec::new(),
    }
    .select(ctx, selection))
}
