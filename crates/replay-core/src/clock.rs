//! Clock Algebra
//!
//! Pure functions transforming clock values under the structural session edits. Every edit
//! function and every effect replay uses these, so the session body and the live runtime always
//! agree on where a clock lands.
//!
//! All functions are total over `[0, ∞)`.

use crate::error::{ReplayError, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A clock interval `{start, end}` with `start <= end`, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClockRange {
    /// Range start.
    pub start: f64,
    /// Range end.
    pub end: f64,
}

impl ClockRange {
    /// Create a validated clock range.
    pub fn new(start: f64, end: f64) -> Result<Self> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 || start > end {
            return Err(ReplayError::InvalidClockRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `end - start`.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Returns `true` if `clock` lies in `[start, end]`.
    pub fn contains(&self, clock: f64) -> bool {
        self.start <= clock && clock <= self.end
    }

    /// Returns `true` if `clock` lies in `(start, end)`.
    pub fn strictly_contains(&self, clock: f64) -> bool {
        self.start < clock && clock < self.end
    }

    /// Map both endpoints through `f`.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            start: f(self.start),
            end: f(self.end),
        }
    }
}

impl Serialize for ClockRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.start, self.end].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ClockRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [start, end] = <[f64; 2]>::deserialize(deserializer)?;
        ClockRange::new(start, end).map_err(D::Error::custom)
    }
}

/// Validate a speed factor.
pub fn check_factor(factor: f64) -> Result<()> {
    if factor.is_finite() && factor > 0.0 {
        Ok(())
    } else {
        Err(ReplayError::InvalidSpeedFactor(factor))
    }
}

/// Validate a single clock value.
pub fn check_clock(clock: f64) -> Result<()> {
    if clock.is_finite() && clock >= 0.0 {
        Ok(())
    } else {
        Err(ReplayError::InvalidClock(clock))
    }
}

/// Play `range` at `factor` times the original speed.
///
/// Identity below `range.start`; inside the range scaled as
/// `start + (clock - start) / factor`; above the range shifted by the net change of the range's
/// duration.
pub fn change_speed(clock: f64, range: ClockRange, factor: f64) -> f64 {
    if clock <= range.start {
        clock
    } else if clock <= range.end {
        range.start + (clock - range.start) / factor
    } else {
        clock + (range.duration() / factor - range.duration())
    }
}

/// The image of `range` under [`change_speed`]. Passing it with `1.0 / factor` inverts the edit.
pub fn change_speed_range(range: ClockRange, factor: f64) -> ClockRange {
    ClockRange {
        start: range.start,
        end: range.start + range.duration() / factor,
    }
}

/// Inverse of [`change_speed`] with the same `range` and `factor`.
pub fn unchange_speed(clock: f64, range: ClockRange, factor: f64) -> f64 {
    change_speed(clock, change_speed_range(range, factor), 1.0 / factor)
}

/// Collapse `[range.start, range.end)` onto `range.start` and shift everything above down.
///
/// Not invertible inside the range; callers that must undo a merge keep the original clock.
pub fn merge(clock: f64, range: ClockRange) -> f64 {
    if clock < range.start {
        clock
    } else if clock < range.end {
        range.start
    } else {
        clock - range.duration()
    }
}

/// Best-effort inverse of [`merge`]: exact for clocks outside the merged range, and maps the
/// collapse point to `range.start`.
pub fn unmerge(clock: f64, range: ClockRange) -> f64 {
    if clock <= range.start {
        clock
    } else {
        clock + range.duration()
    }
}

/// Insert `duration` seconds of silence at `at`: clocks at or above `at` move forward.
///
/// The exact inverse is [`merge`] over `[at, at + duration)`.
pub fn insert_gap(clock: f64, at: f64, duration: f64) -> f64 {
    if clock < at { clock } else { clock + duration }
}

/// Returns `true` if a crop at `at` deletes something stamped `clock`.
///
/// Cropping is a filter, not a mapping: kept clocks are unchanged.
pub fn is_cropped(clock: f64, at: f64) -> bool {
    clock >= at
}

/// Index of the first clock in the non-decreasing `clocks` that a crop at `at` deletes.
pub fn crop_index(clocks: impl IntoIterator<Item = f64>, at: f64) -> Option<usize> {
    clocks.into_iter().position(|c| is_cropped(c, at))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_gap_scenario() {
        assert_eq!(insert_gap(1.0, 2.0, 3.0), 1.0);
        assert_eq!(insert_gap(2.0, 2.0, 3.0), 5.0);
        assert_eq!(insert_gap(10.0, 2.0, 3.0), 13.0);
    }

    #[test]
    fn test_change_speed_scenario() {
        let range = ClockRange::new(2.0, 6.0).unwrap();
        assert_eq!(change_speed(1.0, range, 2.0), 1.0);
        assert_eq!(change_speed(4.0, range, 2.0), 3.0);
        assert_eq!(change_speed(8.0, range, 2.0), 6.0);
        assert_eq!(change_speed_range(range, 2.0), ClockRange::new(2.0, 4.0).unwrap());
    }

    #[test]
    fn test_merge_collapses_range() {
        let range = ClockRange::new(2.0, 5.0).unwrap();
        assert_eq!(merge(1.0, range), 1.0);
        assert_eq!(merge(2.0, range), 2.0);
        assert_eq!(merge(4.9, range), 2.0);
        assert_eq!(merge(5.0, range), 2.0);
        assert_eq!(merge(7.0, range), 4.0);
        assert_eq!(unmerge(4.0, range), 7.0);
        assert_eq!(unmerge(2.0, range), 2.0);
    }

    #[test]
    fn test_invalid_ranges_and_factors() {
        assert!(ClockRange::new(3.0, 1.0).is_err());
        assert!(ClockRange::new(f64::NAN, 1.0).is_err());
        assert!(check_factor(0.0).is_err());
        assert!(check_factor(-1.0).is_err());
        assert!(check_factor(f64::INFINITY).is_err());
        assert!(check_factor(0.5).is_ok());
    }

    #[test]
    fn test_crop_index() {
        assert_eq!(crop_index([0.0, 1.0, 2.0, 2.0], 2.0), Some(2));
        assert_eq!(crop_index([0.0, 1.0], 5.0), None);
    }
}
