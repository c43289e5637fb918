//! Live projection: the mutable "current position" of a session.
//!
//! A [`Projection`] owns a boundary, a clock, the reconstructed [`WorkspaceState`] and the
//! auxiliary surface selection. It never reads the undo/redo stack directly; it is told which
//! snapshot it reflects and follows [`Transition`]s by replaying their [`Effect`]s, touching only
//! the events the transition changed.

use crate::edit::EditContext;
use crate::effect::Effect;
use crate::error::Result;
use crate::event::Direction;
use crate::history::Transition;
use crate::seek::{SeekPlan, compute_seek_plan, compute_sync_plan};
use crate::session::{Snapshot, SurfaceSelection};
use crate::stepper::Stepper;
use crate::worktree::WorkspaceState;
use tracing::{debug, trace};

/// Mutable replay state of one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    state: WorkspaceState,
    boundary: Option<usize>,
    clock: f64,
    selection: Option<SurfaceSelection>,
}

impl Projection {
    /// An empty projection before the first event.
    pub fn new() -> Self {
        Self::default()
    }

    /// The reconstructed workspace.
    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    /// Index of the last applied event.
    pub fn boundary(&self) -> Option<usize> {
        self.boundary
    }

    /// Current clock.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Current surface selection.
    pub fn selection(&self) -> Option<&SurfaceSelection> {
        self.selection.as_ref()
    }

    /// Replace the surface selection (a user gesture, not an edit).
    pub fn set_selection(&mut self, selection: Option<SurfaceSelection>) {
        self.selection = selection;
    }

    /// The context edit functions need from this projection.
    pub fn edit_context(&self) -> EditContext {
        EditContext::new(self.clock, self.selection.clone())
    }

    /// Move the clock without applying events. Only valid past the last event, as when recording.
    pub fn set_clock_past_end(&mut self, snapshot: &Snapshot, clock: f64) {
        let last = snapshot.events().last().map_or(0.0, |e| e.clock);
        self.clock = clock.max(last).max(self.clock);
    }

    /// Reset to an empty workspace and apply every event stamped at clock 0.
    pub fn load(&mut self, snapshot: &Snapshot, stepper: &mut Stepper<'_>) -> Result<SeekPlan> {
        *self = Self::new();
        let events = snapshot.events();
        let plan = compute_sync_plan(events, None, 0.0);
        plan.execute(events, &mut self.state, stepper, &mut self.boundary)?;
        debug!(applied = plan.steps.len(), "loaded session");
        Ok(plan)
    }

    /// Seek to `target` (clamped to the session).
    pub fn seek(
        &mut self,
        snapshot: &Snapshot,
        target: f64,
        stepper: &mut Stepper<'_>,
    ) -> Result<SeekPlan> {
        let events = snapshot.events();
        let plan = compute_seek_plan(
            events,
            self.boundary,
            self.clock,
            target,
            snapshot.duration(),
        );
        trace!(
            target,
            clock = plan.clock,
            steps = plan.steps.len(),
            direction = ?plan.direction,
            "seek"
        );
        plan.execute(events, &mut self.state, stepper, &mut self.boundary)?;
        self.clock = plan.clock;
        Ok(plan)
    }

    /// Follow a snapshot transition.
    ///
    /// 1. If a structural effect touches an index at or below the boundary, the events from
    ///    that index up to the boundary are un-applied, newest first, using the sequence the
    ///    projection currently reflects.
    /// 2. Clock effects move the runtime clock; selection effects set the surface selection.
    /// 3. If anything structural or clock-related happened, the applied prefix is
    ///    re-synchronized against the new sequence at the new clock.
    pub fn replay(&mut self, transition: &Transition, stepper: &mut Stepper<'_>) -> Result<()> {
        let direction = transition.direction;
        let before = transition.from.events();
        let after = transition.to.events();

        let lowest = transition.effects.iter().filter_map(|e| e.event_index()).min();
        if let Some(lowest) = lowest
            && let Some(boundary) = self.boundary
            && boundary >= lowest
        {
            debug!(lowest, boundary, "rewinding for structural effect");
            for j in (lowest..=boundary).rev() {
                stepper.step(&mut self.state, &before[j], Direction::Backward)?;
                self.boundary = j.checked_sub(1);
            }
        }

        let mut ordered: Vec<&Effect> = transition.effects.iter().collect();
        if direction == Direction::Backward {
            ordered.reverse();
        }
        let mut moved = false;
        for effect in ordered {
            moved |= effect.moves_clock();
            self.clock = effect.map_runtime_clock(self.clock, direction);
            if let Some(selection) = effect.surface_selection(direction) {
                self.selection = selection;
            }
        }

        if lowest.is_some() || moved {
            let plan = compute_sync_plan(after, self.boundary, self.clock);
            trace!(
                clock = self.clock,
                steps = plan.steps.len(),
                direction = ?plan.direction,
                "resync after transition"
            );
            plan.execute(after, &mut self.state, stepper, &mut self.boundary)?;
        }
        Ok(())
    }
}
