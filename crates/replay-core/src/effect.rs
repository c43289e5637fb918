//! Effects: minimal incremental adjustments attached to a snapshot.
//!
//! A snapshot's effects describe how a live runtime crosses from the previous snapshot into it.
//! They are replayed in order when moving forward (a new edit or a redo) and in reverse order
//! when moving backward (an undo).

use crate::clock::{self, ClockRange};
use crate::event::{Direction, Event};
use crate::session::SurfaceSelection;

/// An incremental adjustment for the live runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `event` was inserted at `index`.
    InsertEvent {
        /// The inserted event.
        event: Event,
        /// Its index in the new sequence.
        index: usize,
    },
    /// The event at `index` was replaced.
    UpdateEvent {
        /// The event before the edit.
        before: Event,
        /// The event after the edit.
        after: Event,
        /// Index of the event.
        index: usize,
    },
    /// Events from `index` on (all stamped at or after `clock`) were deleted.
    CropEvents {
        /// The deleted suffix, in stored order.
        events: Vec<Event>,
        /// Index of the first deleted event.
        index: usize,
        /// Crop point, which becomes the session duration.
        clock: f64,
        /// Runtime clock when the edit was made.
        prior_clock: f64,
    },
    /// `range` now plays at `factor` times its original speed.
    ChangeSpeed {
        /// Affected range, before the edit.
        range: ClockRange,
        /// Speed factor.
        factor: f64,
        /// Runtime clock when the edit was made.
        prior_clock: f64,
    },
    /// `range` was collapsed onto its start.
    Merge {
        /// Collapsed range, before the edit.
        range: ClockRange,
        /// Runtime clock when the edit was made.
        prior_clock: f64,
    },
    /// `duration` seconds were inserted at `clock`.
    InsertGap {
        /// Insertion point.
        clock: f64,
        /// Inserted length.
        duration: f64,
        /// Runtime clock when the edit was made.
        prior_clock: f64,
    },
    /// The editing surface's selection changed.
    SetSelection {
        /// Selection before the edit.
        before: Option<SurfaceSelection>,
        /// Selection after the edit.
        after: Option<SurfaceSelection>,
    },
}

/// `prior` if the playhead still sits on its forward image, else the closed-form inverse.
fn restore_or_invert(
    clock: f64,
    prior: f64,
    forward: impl Fn(f64) -> f64,
    inverse: impl Fn(f64) -> f64,
) -> f64 {
    if forward(prior) == clock {
        prior
    } else {
        inverse(clock)
    }
}

impl Effect {
    /// Index of the first event whose content this effect changes, for effects that alter the
    /// event sequence itself (as opposed to only its clocks).
    pub fn event_index(&self) -> Option<usize> {
        match self {
            Self::InsertEvent { index, .. }
            | Self::UpdateEvent { index, .. }
            | Self::CropEvents { index, .. } => Some(*index),
            Self::ChangeSpeed { .. }
            | Self::Merge { .. }
            | Self::InsertGap { .. }
            | Self::SetSelection { .. } => None,
        }
    }

    /// Returns `true` if crossing this effect can move event clocks or the runtime clock.
    pub fn moves_clock(&self) -> bool {
        matches!(
            self,
            Self::CropEvents { .. }
                | Self::ChangeSpeed { .. }
                | Self::Merge { .. }
                | Self::InsertGap { .. }
        )
    }

    /// Where a runtime standing at `clock` stands after crossing this effect in `direction`.
    ///
    /// Crossing a clock effect backward restores `prior_clock` verbatim when its forward image
    /// is exactly `clock` (the playhead has not moved since the edit). The closed-form inverse
    /// is only used otherwise, since it can be off by rounding or undefined inside a merge.
    pub fn map_runtime_clock(&self, clock: f64, direction: Direction) -> f64 {
        match (self, direction) {
            (Self::CropEvents { clock: at, .. }, Direction::Forward) => clock.min(*at),
            (
                Self::CropEvents {
                    clock: at,
                    prior_clock,
                    ..
                },
                Direction::Backward,
            ) => {
                if *prior_clock > *at && clock >= *at {
                    *prior_clock
                } else {
                    clock
                }
            }
            (Self::ChangeSpeed { range, factor, .. }, Direction::Forward) => {
                clock::change_speed(clock, *range, *factor)
            }
            (
                Self::ChangeSpeed {
                    range,
                    factor,
                    prior_clock,
                },
                Direction::Backward,
            ) => restore_or_invert(
                clock,
                *prior_clock,
                |c| clock::change_speed(c, *range, *factor),
                |c| clock::unchange_speed(c, *range, *factor),
            ),
            (Self::Merge { range, .. }, Direction::Forward) => clock::merge(clock, *range),
            (Self::Merge { range, prior_clock }, Direction::Backward) => restore_or_invert(
                clock,
                *prior_clock,
                |c| clock::merge(c, *range),
                |c| clock::unmerge(c, *range),
            ),
            (
                Self::InsertGap {
                    clock: at,
                    duration,
                    ..
                },
                Direction::Forward,
            ) => clock::insert_gap(clock, *at, *duration),
            (
                Self::InsertGap {
                    clock: at,
                    duration,
                    prior_clock,
                },
                Direction::Backward,
            ) => restore_or_invert(
                clock,
                *prior_clock,
                |c| clock::insert_gap(c, *at, *duration),
                |c| {
                    clock::merge(
                        c,
                        ClockRange {
                            start: *at,
                            end: *at + *duration,
                        },
                    )
                },
            ),
            (
                Self::InsertEvent { .. } | Self::UpdateEvent { .. } | Self::SetSelection { .. },
                _,
            ) => clock,
        }
    }

    /// The surface selection after crossing this effect in `direction`, if it sets one.
    pub fn surface_selection(&self, direction: Direction) -> Option<Option<SurfaceSelection>> {
        match self {
            Self::SetSelection { before, after } => Some(match direction {
                Direction::Forward => after.clone(),
                Direction::Backward => before.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_restores_prior_clock_inside_range() {
        let range = ClockRange::new(2.0, 6.0).unwrap();
        let effect = Effect::Merge {
            range,
            prior_clock: 4.0,
        };
        let after = effect.map_runtime_clock(4.0, Direction::Forward);
        assert_eq!(after, 2.0);
        assert_eq!(effect.map_runtime_clock(after, Direction::Backward), 4.0);
        // The playhead moved after the edit: fall back to the closed-form inverse.
        assert_eq!(effect.map_runtime_clock(3.0, Direction::Backward), 7.0);
    }

    #[test]
    fn test_crop_clamps_then_restores() {
        let effect = Effect::CropEvents {
            events: Vec::new(),
            index: 0,
            clock: 5.0,
            prior_clock: 8.0,
        };
        assert_eq!(effect.map_runtime_clock(8.0, Direction::Forward), 5.0);
        assert_eq!(effect.map_runtime_clock(5.0, Direction::Backward), 8.0);
        assert_eq!(effect.map_runtime_clock(3.0, Direction::Backward), 3.0);
    }

    #[test]
    fn test_change_speed_inverse_outside_range() {
        let range = ClockRange::new(2.0, 6.0).unwrap();
        let effect = Effect::ChangeSpeed {
            range,
            factor: 2.0,
            prior_clock: 10.0,
        };
        let after = effect.map_runtime_clock(10.0, Direction::Forward);
        assert_eq!(after, 8.0);
        assert_eq!(effect.map_runtime_clock(after, Direction::Backward), 10.0);
    }

    #[test]
    fn test_gap_undo_restores_non_dyadic_clock() {
        // 0.5 + 0.2 - 0.2 rounds to 0.49999999999999994.
        assert_ne!(clock::insert_gap(0.5, 0.0, 0.2) - 0.2, 0.5);
        let effect = Effect::InsertGap {
            clock: 0.0,
            duration: 0.2,
            prior_clock: 0.5,
        };
        let after = effect.map_runtime_clock(0.5, Direction::Forward);
        assert_eq!(effect.map_runtime_clock(after, Direction::Backward), 0.5);
    }

    #[test]
    fn test_speed_undo_restores_non_dyadic_clock() {
        let range = ClockRange::new(0.1, 0.3).unwrap();
        for prior in [0.7, 0.2, 1.1, 0.05] {
            let effect = Effect::ChangeSpeed {
                range,
                factor: 3.0,
                prior_clock: prior,
            };
            let after = effect.map_runtime_clock(prior, Direction::Forward);
            assert_eq!(effect.map_runtime_clock(after, Direction::Backward), prior);
        }
    }
}
