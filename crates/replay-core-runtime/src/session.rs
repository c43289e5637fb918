//! The live session: an undo/redo stack plus the projection following it.
//!
//! [`LiveSession`] is synchronous and single-owner. Every method runs to completion and leaves
//! the projection consistent with the current snapshot. The
//! [`RuntimeHandle`](crate::RuntimeHandle) drives one from its serializer task.

use crate::config::RuntimeConfig;
use crate::error::{Result, RuntimeError, RuntimeStatus};
use crate::host::Host;
use crate::recorder::{Notification, record};
use replay_core::edit::{self, Edit};
use replay_core::{
    ClockRange, ContentSource, Directive, Event, MediaTrack, Projection, Snapshot, SnapshotStack,
    Stepper, SurfaceSelection, TocItem, Transition,
};
use replay_core_store::{load_session, save_session};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, trace};

/// A structural or metadata edit requested by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum EditCommand {
    /// Insert an event at an index.
    InsertEvent {
        /// Position in the sequence.
        index: usize,
        /// The event.
        event: Event,
    },
    /// Replace the event at an index.
    UpdateEvent {
        /// Position in the sequence.
        index: usize,
        /// The replacement.
        event: Event,
    },
    /// Delete everything at or after a clock.
    Crop {
        /// First deleted clock.
        at: f64,
    },
    /// Play a range faster or slower.
    ChangeSpeed {
        /// Affected range.
        range: ClockRange,
        /// Speed multiplier.
        factor: f64,
    },
    /// Collapse a range to its start.
    Merge {
        /// Collapsed range.
        range: ClockRange,
    },
    /// Open an empty stretch of time.
    InsertGap {
        /// Where the gap starts.
        at: f64,
        /// Gap length.
        duration: f64,
    },
    /// Add a table-of-contents entry.
    InsertTocItem(TocItem),
    /// Replace a table-of-contents entry.
    UpdateTocItem {
        /// Entry index.
        index: usize,
        /// Replacement.
        item: TocItem,
    },
    /// Remove a table-of-contents entry.
    DeleteTocItem(usize),
    /// Add a media track.
    InsertMediaTrack(MediaTrack),
    /// Replace the media track with the same id.
    UpdateMediaTrack(MediaTrack),
    /// Remove a media track by id.
    DeleteMediaTrack(String),
}

impl EditCommand {
    fn build(self, snapshot: &Snapshot, projection: &Projection) -> replay_core::Result<Edit> {
        let ctx = projection.edit_context();
        match self {
            Self::InsertEvent { index, event } => edit::insert_event(snapshot, index, event),
            Self::UpdateEvent { index, event } => edit::update_event(snapshot, index, event),
            Self::Crop { at } => edit::crop(snapshot, &ctx, at),
            Self::ChangeSpeed { range, factor } => edit::change_speed(snapshot, &ctx, range, factor),
            Self::Merge { range } => edit::merge(snapshot, &ctx, range),
            Self::InsertGap { at, duration } => edit::insert_gap(snapshot, &ctx, at, duration),
            Self::InsertTocItem(item) => edit::insert_toc_item(snapshot, &ctx, item),
            Self::UpdateTocItem { index, item } => edit::update_toc_item(snapshot, &ctx, index, item),
            Self::DeleteTocItem(index) => edit::delete_toc_item(snapshot, &ctx, index),
            Self::InsertMediaTrack(track) => edit::insert_media_track(snapshot, &ctx, track),
            Self::UpdateMediaTrack(track) => edit::update_media_track(snapshot, &ctx, track),
            Self::DeleteMediaTrack(id) => edit::delete_media_track(snapshot, &ctx, &id),
        }
    }
}

/// Point-in-time summary of a live session.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Runtime status.
    pub status: RuntimeStatus,
    /// Runtime clock.
    pub clock: f64,
    /// Index of the last applied event.
    pub boundary: Option<usize>,
    /// Session duration.
    pub duration: f64,
    /// Number of undo steps available.
    pub undo_depth: usize,
    /// Number of redo steps available.
    pub redo_depth: usize,
    /// Whether the current snapshot matches the last save.
    pub is_clean: bool,
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64)
}

/// Undo/redo stack, live projection and status of one session.
pub struct LiveSession {
    config: RuntimeConfig,
    stack: SnapshotStack,
    projection: Projection,
    status: RuntimeStatus,
    host: Box<dyn Host>,
    content: Arc<dyn ContentSource + Send + Sync>,
}

impl fmt::Debug for LiveSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveSession")
            .field("status", &self.status)
            .field("clock", &self.projection.clock())
            .field("boundary", &self.projection.boundary())
            .field("snapshot", &self.stack.index())
            .finish()
    }
}

impl LiveSession {
    /// An empty, paused session.
    pub fn new(
        config: RuntimeConfig,
        host: Box<dyn Host>,
        content: Arc<dyn ContentSource + Send + Sync>,
    ) -> Self {
        let stack = SnapshotStack::with_max_history(Snapshot::default(), config.max_history);
        Self {
            config,
            stack,
            projection: Projection::new(),
            status: RuntimeStatus::Paused,
            host,
            content,
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Current status.
    pub fn status(&self) -> &RuntimeStatus {
        &self.status
    }

    /// The undo/redo stack.
    pub fn stack(&self) -> &SnapshotStack {
        &self.stack
    }

    /// The snapshot the projection reflects.
    pub fn current(&self) -> &Arc<Snapshot> {
        self.stack.current()
    }

    /// The live projection.
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Summary of the session.
    pub fn progress(&self) -> Progress {
        Progress {
            status: self.status.clone(),
            clock: self.projection.clock(),
            boundary: self.projection.boundary(),
            duration: self.current().duration(),
            undo_depth: self.stack.undo_depth(),
            redo_depth: self.stack.redo_depth(),
            is_clean: self.stack.is_clean(),
        }
    }

    /// Enter [`RuntimeStatus::Failed`].
    pub fn fail(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(%reason, "runtime failed");
        self.status = RuntimeStatus::Failed(reason);
    }

    fn ensure_usable(&self, operation: &'static str) -> Result<()> {
        match &self.status {
            RuntimeStatus::Failed(reason) => Err(RuntimeError::Failed(reason.clone())),
            RuntimeStatus::Recording => Err(RuntimeError::InvalidState {
                operation,
                status: self.status.clone(),
            }),
            _ => Ok(()),
        }
    }

    fn deliver(&mut self, directives: Vec<Directive>) {
        if !directives.is_empty() {
            trace!(count = directives.len(), "delivering directives");
            self.host.apply(directives);
        }
    }

    /// Replace the session with `snapshot` and apply everything at clock 0.
    ///
    /// Leaves [`RuntimeStatus::Failed`] on success.
    pub fn load(&mut self, snapshot: Snapshot) -> Result<()> {
        self.stack = SnapshotStack::with_max_history(snapshot, self.config.max_history);
        self.projection = Projection::new();
        self.status = RuntimeStatus::Paused;

        let mut stepper = Stepper::new(self.content.as_ref());
        let result = self.projection.load(self.stack.current(), &mut stepper);
        let directives = stepper.take_directives();
        self.deliver(directives);
        result?;
        debug!(
            events = self.current().events().len(),
            duration = self.current().duration(),
            "session loaded"
        );
        Ok(())
    }

    /// Read a session document and [`load`](Self::load) it.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let snapshot = load_session(path)?;
        self.load(snapshot)
    }

    /// Write the current snapshot and mark it clean.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if let RuntimeStatus::Failed(reason) = &self.status {
            return Err(RuntimeError::Failed(reason.clone()));
        }
        save_session(path, self.current())?;
        self.stack.mark_clean();
        Ok(())
    }

    /// Seek to `clock` and return where the runtime landed.
    pub fn seek(&mut self, clock: f64) -> Result<f64> {
        self.ensure_usable("seek")?;
        self.seek_unchecked(clock)
    }

    fn seek_unchecked(&mut self, clock: f64) -> Result<f64> {
        let mut stepper = Stepper::new(self.content.as_ref());
        let result = self.projection.seek(self.stack.current(), clock, &mut stepper);
        let directives = stepper.take_directives();
        self.deliver(directives);
        result?;
        Ok(self.projection.clock())
    }

    /// Start playback; from the end, playback restarts at 0.
    pub fn play(&mut self) -> Result<()> {
        self.ensure_usable("play")?;
        if self.projection.clock() >= self.current().duration() {
            self.seek_unchecked(0.0)?;
        }
        self.status = RuntimeStatus::Playing;
        Ok(())
    }

    /// Start recording at the current clock. Anything after the clock is cropped first.
    pub fn record(&mut self) -> Result<()> {
        self.ensure_usable("record")?;
        let clock = self.projection.clock();
        if clock < self.current().duration() {
            debug!(clock, "cropping before recording");
            self.edit(EditCommand::Crop { at: clock })?;
        }
        self.stack.end_group();
        self.status = RuntimeStatus::Recording;
        Ok(())
    }

    /// Stop playing or recording. A recording is closed by extending the duration to the clock.
    pub fn pause(&mut self) -> Result<()> {
        match self.status {
            RuntimeStatus::Recording => {
                let edit = edit::extend_duration(self.current(), self.projection.clock())
                    .map_err(RuntimeError::InvalidEdit)?;
                self.status = RuntimeStatus::Paused;
                if !edit.patch.is_empty() {
                    let coalesce = self.config.coalesce_recording;
                    self.push(edit, coalesce, false)?;
                }
                self.stack.end_group();
            }
            RuntimeStatus::Playing => self.status = RuntimeStatus::Paused,
            RuntimeStatus::Paused | RuntimeStatus::Failed(_) => {}
        }
        Ok(())
    }

    /// Advance the clock by `elapsed` wall time.
    pub fn tick(&mut self, elapsed: Duration) -> Result<()> {
        match self.status {
            RuntimeStatus::Playing => {
                let duration = self.current().duration();
                let target = (self.projection.clock()
                    + elapsed.as_secs_f64() * self.config.playback_rate)
                    .min(duration);
                self.seek_unchecked(target)?;
                if target >= duration {
                    debug!(duration, "playback reached the end");
                    self.status = RuntimeStatus::Paused;
                }
            }
            RuntimeStatus::Recording => {
                let clock = self.projection.clock() + elapsed.as_secs_f64();
                self.projection.set_clock_past_end(self.stack.current(), clock);
            }
            RuntimeStatus::Paused | RuntimeStatus::Failed(_) => {}
        }
        Ok(())
    }

    /// Record a host notification as an event at the current clock.
    pub fn notify(&mut self, notification: Notification) -> Result<()> {
        if self.status != RuntimeStatus::Recording {
            return Err(RuntimeError::InvalidState {
                operation: "record a notification",
                status: self.status.clone(),
            });
        }
        let event = record(
            self.projection.state(),
            self.content.as_ref(),
            self.projection.clock(),
            notification,
        )
        .map_err(RuntimeError::InvalidNotification)?;
        trace!(kind = event.kind.name(), uri = %event.uri, clock = event.clock, "recorded");
        let index = self.current().events().len();
        let edit = edit::insert_event(self.current(), index, event)
            .map_err(RuntimeError::InvalidNotification)?;
        let coalesce = self.config.coalesce_recording;
        // The host already shows the change.
        self.push(edit, coalesce, false)
    }

    /// Apply an edit and replay its effects.
    pub fn edit(&mut self, command: EditCommand) -> Result<()> {
        self.ensure_usable("edit")?;
        let edit = command
            .build(self.current(), &self.projection)
            .map_err(RuntimeError::InvalidEdit)?;
        self.push(edit, false, true)
    }

    fn push(&mut self, edit: Edit, coalescing: bool, deliver: bool) -> Result<()> {
        let edit = edit.with_modification_time(now_millis());
        let transition = self.stack.push_edit(edit, coalescing);
        self.follow(&transition, deliver)
    }

    fn follow(&mut self, transition: &Transition, deliver: bool) -> Result<()> {
        let mut stepper = Stepper::new(self.content.as_ref());
        let result = self.projection.replay(transition, &mut stepper);
        let directives = stepper.take_directives();
        if deliver {
            self.deliver(directives);
        }
        result.map_err(RuntimeError::from)
    }

    /// Undo one step. Returns `false` at the oldest snapshot.
    pub fn undo(&mut self) -> Result<bool> {
        self.ensure_usable("undo")?;
        match self.stack.undo() {
            Some(transition) => self.follow(&transition, true).map(|()| true),
            None => Ok(false),
        }
    }

    /// Redo one step. Returns `false` at the newest snapshot.
    pub fn redo(&mut self) -> Result<bool> {
        self.ensure_usable("redo")?;
        match self.stack.redo() {
            Some(transition) => self.follow(&transition, true).map(|()| true),
            None => Ok(false),
        }
    }

    /// Select a range, track or TOC entry in the editing surface.
    pub fn set_surface_selection(&mut self, selection: Option<SurfaceSelection>) {
        self.projection.set_selection(selection);
    }
}
