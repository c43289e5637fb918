//! Seek Algorithm
//!
//! Given a target clock and the current boundary, computes which events to apply or un-apply,
//! and in what order.
//!
//! The boundary is `Some(i)` when events `0..=i` are applied and `None` before the first event.
//! Seeks never skip an event: reverse data is only valid relative to the immediately adjacent
//! state, so forward steps run in increasing and backward steps in decreasing index order.
//!
//! Ties in clock are resolved by stored order. The state at clock `t` is every event with
//! `clock <= t` applied, whichever direction it is reached from: seeking forward applies events
//! up to and including `t`, seeking backward un-applies only events stamped after `t`. Loading
//! and resynchronizing after an edit use the same rule. A seek to the clock the runtime is
//! already at is a no-op.

use crate::error::Result;
use crate::event::{Direction, Event};
use crate::stepper::Stepper;
use crate::worktree::WorkspaceState;
use std::collections::BTreeSet;

/// Events to step over to reach a target clock.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekPlan {
    /// Event indices, in execution order.
    pub steps: Vec<usize>,
    /// Direction every step is applied in.
    pub direction: Direction,
    /// Boundary after all steps ran.
    pub new_boundary: Option<usize>,
    /// Target clock after clamping.
    pub clock: f64,
}

impl SeekPlan {
    /// Returns `true` if the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// URIs touched by the plan, so callers can resynchronize only those resources.
    pub fn affected_uris(&self, events: &[Event]) -> BTreeSet<String> {
        self.steps
            .iter()
            .filter_map(|&i| events.get(i))
            .map(|e| e.uri.clone())
            .collect()
    }

    /// Run the plan.
    ///
    /// `boundary` is updated after every successful step, so on error it still names the last
    /// event that is actually applied.
    pub fn execute(
        &self,
        events: &[Event],
        state: &mut WorkspaceState,
        stepper: &mut Stepper<'_>,
        boundary: &mut Option<usize>,
    ) -> Result<()> {
        for &i in &self.steps {
            stepper.step(state, &events[i], self.direction)?;
            *boundary = match self.direction {
                Direction::Forward => Some(i),
                Direction::Backward => i.checked_sub(1),
            };
        }
        Ok(())
    }
}

fn clamp_clock(clock: f64, duration: f64) -> f64 {
    if clock.is_nan() {
        return 0.0;
    }
    clock.clamp(0.0, duration.max(0.0))
}

/// Compute the steps needed to move from `boundary` (reached at `current_clock`) to
/// `target_clock`.
///
/// `target_clock` is clamped to `[0, duration]`.
pub fn compute_seek_plan(
    events: &[Event],
    boundary: Option<usize>,
    current_clock: f64,
    target_clock: f64,
    duration: f64,
) -> SeekPlan {
    let clock = clamp_clock(target_clock, duration);
    if clock == current_clock {
        return SeekPlan {
            steps: Vec::new(),
            direction: Direction::Forward,
            new_boundary: boundary.filter(|&b| b < events.len()),
            clock,
        };
    }
    compute_sync_plan(events, boundary, clock)
}

/// Compute the steps that make the applied prefix exactly "every event with
/// `clock <= target_clock`", walking forward first and backward only if nothing was applied.
///
/// Used after structural edits, when the event at the boundary may no longer be the last one at
/// or before the runtime clock.
pub fn compute_sync_plan(events: &[Event], boundary: Option<usize>, target_clock: f64) -> SeekPlan {
    let boundary = boundary.filter(|&b| b < events.len());
    let first = boundary.map_or(0, |b| b + 1);
    let steps: Vec<usize> = (first..events.len())
        .take_while(|&j| events[j].clock <= target_clock)
        .collect();
    if !steps.is_empty() {
        let new_boundary = steps.last().copied();
        return SeekPlan {
            steps,
            direction: Direction::Forward,
            new_boundary,
            clock: target_clock,
        };
    }

    let mut steps = Vec::new();
    if let Some(b) = boundary {
        for j in (0..=b).rev() {
            if events[j].clock <= target_clock {
                break;
            }
            steps.push(j);
        }
    }
    let new_boundary = match steps.last() {
        Some(&lowest) => lowest.checked_sub(1),
        None => boundary,
    };
    SeekPlan {
        steps,
        direction: Direction::Backward,
        new_boundary,
        clock: target_clock,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;

    fn events(clocks: &[f64]) -> Vec<Event> {
        clocks
            .iter()
            .map(|&c| Event::new(c, "file:///a", EventKind::Save))
            .collect()
    }

    #[test]
    fn test_forward_from_start() {
        let evs = events(&[0.0, 1.0, 2.0]);
        let plan = compute_seek_plan(&evs, None, 0.0, 1.0, 2.0);
        assert_eq!(plan.steps, vec![0, 1]);
        assert_eq!(plan.direction, Direction::Forward);
        assert_eq!(plan.new_boundary, Some(1));
    }

    #[test]
    fn test_backward_excludes_events_before_target() {
        let evs = events(&[0.0, 1.0, 2.0, 3.0]);
        let plan = compute_seek_plan(&evs, Some(3), 3.0, 1.5, 3.0);
        assert_eq!(plan.steps, vec![3, 2]);
        assert_eq!(plan.direction, Direction::Backward);
        assert_eq!(plan.new_boundary, Some(1));
    }

    #[test]
    fn test_backward_to_zero_keeps_events_at_zero() {
        let evs = events(&[0.0, 0.0, 1.0]);
        let plan = compute_seek_plan(&evs, Some(2), 1.0, 0.0, 1.0);
        assert_eq!(plan.steps, vec![2]);
        assert_eq!(plan.new_boundary, Some(1));
    }

    #[test]
    fn test_backward_onto_event_clock_keeps_it() {
        let evs = events(&[0.0, 1.0, 1.0, 2.0]);
        let plan = compute_seek_plan(&evs, Some(3), 2.0, 1.0, 2.0);
        assert_eq!(plan.steps, vec![3]);
        assert_eq!(plan.direction, Direction::Backward);
        assert_eq!(plan.new_boundary, Some(2));
    }

    #[test]
    fn test_equal_clock_is_noop() {
        let evs = events(&[0.0, 1.0, 2.0]);
        let plan = compute_seek_plan(&evs, Some(1), 1.5, 1.0, 2.0);
        assert!(plan.is_empty());
        assert_eq!(plan.new_boundary, Some(1));
    }

    #[test]
    fn test_seek_to_current_clock_is_noop() {
        let evs = events(&[0.0, 1.0, 2.0]);
        let plan = compute_seek_plan(&evs, Some(1), 1.0, 1.0, 2.0);
        assert!(plan.is_empty());
        assert_eq!(plan.new_boundary, Some(1));
    }

    #[test]
    fn test_target_is_clamped() {
        let evs = events(&[0.0, 1.0]);
        let plan = compute_seek_plan(&evs, None, 0.0, 99.0, 1.0);
        assert_eq!(plan.clock, 1.0);
        assert_eq!(plan.steps, vec![0, 1]);

        let plan = compute_seek_plan(&evs, Some(1), 1.0, -5.0, 1.0);
        assert_eq!(plan.clock, 0.0);
    }

    #[test]
    fn test_sync_plan_applies_ties_at_clock() {
        let evs = events(&[1.0, 2.0, 2.0]);
        let plan = compute_sync_plan(&evs, Some(1), 2.0);
        assert_eq!(plan.steps, vec![2]);
        assert_eq!(plan.new_boundary, Some(2));

        let plan = compute_sync_plan(&evs, Some(2), 1.5);
        assert_eq!(plan.steps, vec![2, 1]);
        assert_eq!(plan.new_boundary, Some(0));
    }
}
