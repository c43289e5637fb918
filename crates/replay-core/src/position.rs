//! Text coordinates shared by documents, events and editors.
//!
//! All coordinates are zero-based. Columns (`character`) count Unicode scalar values within a
//! logical line, never bytes.
//!
//! On the wire every coordinate type is a flat JSON array:
//!
//! ```text
//! Position   [line, character]
//! Range      [startLine, startChar, endLine, endChar]
//! Selection  [anchorLine, anchorChar, activeLine, activeChar]
//! LineRange  [start, end]
//! ```

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;

/// Position coordinates (line and character).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    /// Zero-based logical line index.
    pub line: usize,
    /// Zero-based column in characters within the logical line.
    pub character: usize,
}

impl Position {
    /// Create a new logical position.
    pub fn new(line: usize, character: usize) -> Self {
        Self { line, character }
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then_with(|| self.character.cmp(&other.character))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.line, self.character].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Position {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [line, character] = <[usize; 2]>::deserialize(deserializer)?;
        Ok(Self { line, character })
    }
}

/// A half-open text range `[start, end)`. `start <= end` always holds for ranges built through
/// [`Range::new`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Range {
    /// Inclusive start position.
    pub start: Position,
    /// Exclusive end position.
    pub end: Position,
}

impl Range {
    /// Create a range, swapping the endpoints if they are given in reverse order.
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Shorthand for `Range::new(Position::new(..), Position::new(..))`.
    pub fn from_coords(start_line: usize, start_char: usize, end_line: usize, end_char: usize) -> Self {
        Self::new(
            Position::new(start_line, start_char),
            Position::new(end_line, end_char),
        )
    }

    /// A collapsed range at `pos`.
    pub fn caret(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    /// Returns `true` if the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns `true` if the two ranges share at least one character, or if one of them is a
    /// caret strictly inside the other.
    ///
    /// Ranges that merely touch (`a.end == b.start`) do not overlap.
    pub fn overlaps(&self, other: &Range) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl Serialize for Range {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [
            self.start.line,
            self.start.character,
            self.end.line,
            self.end.character,
        ]
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Range {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [sl, sc, el, ec] = <[usize; 4]>::deserialize(deserializer)?;
        let start = Position::new(sl, sc);
        let end = Position::new(el, ec);
        if end < start {
            return Err(D::Error::custom("range end precedes start"));
        }
        Ok(Self { start, end })
    }
}

/// A cursor selection. `anchor` stays fixed while `active` follows the caret.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Selection {
    /// Fixed end of the selection.
    pub anchor: Position,
    /// Moving end of the selection (the caret).
    pub active: Position,
}

impl Selection {
    /// Create a selection from its anchor and active positions.
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// An empty selection (caret only) at `pos`.
    pub fn caret(pos: Position) -> Self {
        Self {
            anchor: pos,
            active: pos,
        }
    }

    /// The selected text range, regardless of direction.
    pub fn range(&self) -> Range {
        Range::new(self.anchor, self.active)
    }

    /// Returns `true` if the active end precedes the anchor.
    pub fn is_reversed(&self) -> bool {
        self.active < self.anchor
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [
            self.anchor.line,
            self.anchor.character,
            self.active.line,
            self.active.character,
        ]
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Selection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [al, ac, bl, bc] = <[usize; 4]>::deserialize(deserializer)?;
        Ok(Self::new(Position::new(al, ac), Position::new(bl, bc)))
    }
}

/// A range of logical lines, `start..end` (end exclusive), used for editor viewports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LineRange {
    /// First visible line.
    pub start: usize,
    /// One past the last visible line.
    pub end: usize,
}

impl LineRange {
    /// Create a line range; endpoints given in reverse order are swapped.
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }
}

impl Serialize for LineRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.start, self.end].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for LineRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [start, end] = <[usize; 2]>::deserialize(deserializer)?;
        Ok(Self::new(start, end))
    }
}
