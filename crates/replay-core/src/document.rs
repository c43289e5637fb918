//! Document Engine
//!
//! An in-memory, line-oriented text buffer with an exact, reversible content-change operation.
//!
//! Text is stored LF-normalized in a [`ropey::Rope`] (O(log N) line access and editing); the
//! document's own end-of-line marker is re-applied whenever text leaves the buffer, so the
//! reverse data of a change restores the document byte-for-byte.
//!
//! # Example
//!
//! ```rust
//! use replay_core::{ContentChange, Document, LineEnding, Range};
//!
//! let mut doc = Document::new("file:///a.txt", "a\nb\nc", LineEnding::Lf);
//! let change = ContentChange::new(Range::from_coords(1, 0, 1, 1), "X");
//! let reverse = doc.apply_content_change(&change, true).unwrap().unwrap();
//! assert_eq!(doc.text(), "a\nX\nc");
//!
//! doc.apply_content_change(&reverse, false).unwrap();
//! assert_eq!(doc.text(), "a\nb\nc");
//! ```

use crate::error::{ReplayError, Result};
use crate::line_ending::{LineEnding, split_lines};
use crate::position::{Position, Range};
use ropey::Rope;
use serde::{Deserialize, Serialize};

/// Replace the text inside `range` with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentChange {
    /// Range in the document **before** this change is applied.
    pub range: Range,
    /// Replacement text; may contain `"\n"` or `"\r\n"` line breaks.
    pub text: String,
}

impl ContentChange {
    /// Create a content change.
    pub fn new(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            text: text.into(),
        }
    }
}

/// A text document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    uri: String,
    rope: Rope,
    eol: LineEnding,
}

impl Document {
    /// Create a document from text. Both `"\n"` and `"\r\n"` in `text` are line breaks; `eol`
    /// decides how lines are joined when text is read back.
    pub fn new(uri: impl Into<String>, text: &str, eol: LineEnding) -> Self {
        let normalized = split_lines(text).join("\n");
        Self {
            uri: uri.into(),
            rope: Rope::from_str(&normalized),
            eol,
        }
    }

    /// Create a document, detecting the end-of-line marker from `text`.
    pub fn from_text(uri: impl Into<String>, text: &str) -> Self {
        Self::new(uri, text, LineEnding::detect_in_text(text))
    }

    /// The document's URI.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The document's end-of-line marker.
    pub fn eol(&self) -> LineEnding {
        self.eol
    }

    /// Number of logical lines (always at least 1).
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Text of line `line`, without its line break.
    pub fn line(&self, line: usize) -> Option<String> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let mut text = self.rope.line(line).to_string();
        if text.ends_with('\n') {
            text.pop();
        }
        Some(text)
    }

    /// Lines of the document, without line breaks.
    pub fn lines(&self) -> Vec<String> {
        (0..self.line_count())
            .filter_map(|i| self.line(i))
            .collect()
    }

    /// Length of line `line` in characters, excluding the line break.
    pub fn line_len(&self, line: usize) -> Option<usize> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            Some(len - 1)
        } else {
            Some(len)
        }
    }

    /// The full text, joined with the document's end-of-line marker.
    pub fn text(&self) -> String {
        self.eol.apply_to_text(&self.rope.to_string())
    }

    /// The range covering the whole document: `[(0,0), (last, lastLine.len)]`.
    pub fn get_range(&self) -> Range {
        let last = self.line_count() - 1;
        let len = self.line_len(last).unwrap_or(0);
        Range::from_coords(0, 0, last, len)
    }

    /// Returns `true` if `pos` addresses a character boundary inside the document.
    pub fn is_valid_position(&self, pos: Position) -> bool {
        self.line_len(pos.line)
            .is_some_and(|len| pos.character <= len)
    }

    /// Returns `true` if `range` lies within [`Document::get_range`].
    pub fn is_valid_range(&self, range: &Range) -> bool {
        range.start <= range.end
            && self.is_valid_position(range.start)
            && self.is_valid_position(range.end)
    }

    /// Text inside `range`, with line breaks rendered using the document's marker.
    pub fn get_text(&self, range: &Range) -> Result<String> {
        self.validate_range(range)?;
        let start = self.char_index(range.start);
        let end = self.char_index(range.end);
        Ok(self
            .eol
            .apply_to_text(&self.rope.slice(start..end).to_string()))
    }

    /// Apply one content change.
    ///
    /// When `compute_reverse` is set, returns the change that restores the document exactly:
    /// its range spans the inserted text and its text is the replaced text.
    ///
    /// # Errors
    ///
    /// [`ReplayError::InvalidRange`] if `change.range` is not within the document. The document
    /// is left untouched in that case.
    pub fn apply_content_change(
        &mut self,
        change: &ContentChange,
        compute_reverse: bool,
    ) -> Result<Option<ContentChange>> {
        self.validate_range(&change.range)?;
        let range = change.range;

        let rev_text = if compute_reverse {
            Some(self.get_text(&range)?)
        } else {
            None
        };

        let new_lines = split_lines(&change.text);
        let prefix_len = range.start.character;
        let start = self.char_index(range.start);
        let end = self.char_index(range.end);

        self.rope.remove(start..end);
        self.rope.insert(start, &new_lines.join("\n"));

        Ok(rev_text.map(|text| {
            // `new_lines.len() - spanned lines` lines were added; the last inserted line ends
            // where the untouched suffix of the original end line begins.
            let end_line = range.start.line + new_lines.len() - 1;
            let last_len = new_lines.last().map_or(0, |l| l.chars().count());
            let end_char = if new_lines.len() == 1 {
                prefix_len + last_len
            } else {
                last_len
            };
            ContentChange {
                range: Range::new(range.start, Position::new(end_line, end_char)),
                text,
            }
        }))
    }

    /// Apply several disjoint content changes of a single event.
    ///
    /// All ranges refer to the document before any of them is applied. They are validated,
    /// checked for overlap and applied bottom-of-document first, so line shifts caused by one
    /// change never invalidate the coordinates of another.
    ///
    /// When `compute_reverse` is set, the returned changes refer to the document **after** this
    /// call and restore it exactly when passed back to this method.
    pub fn apply_content_changes(
        &mut self,
        changes: &[ContentChange],
        compute_reverse: bool,
    ) -> Result<Vec<ContentChange>> {
        for change in changes {
            self.validate_range(&change.range)?;
        }

        // Document order; ties keep carets before ranges starting at the same position, and
        // otherwise keep the given order.
        let mut order: Vec<usize> = (0..changes.len()).collect();
        order.sort_by(|&a, &b| {
            let (ra, rb) = (changes[a].range, changes[b].range);
            ra.start
                .cmp(&rb.start)
                .then_with(|| ra.end.cmp(&rb.end))
                .then_with(|| a.cmp(&b))
        });

        for pair in order.windows(2) {
            let (first, second) = (changes[pair[0]].range, changes[pair[1]].range);
            if first.end > second.start {
                return Err(ReplayError::OverlappingRanges {
                    uri: self.uri.clone(),
                    first,
                    second,
                });
            }
        }

        let reverse = if compute_reverse {
            self.reverse_changes(changes, &order)?
        } else {
            Vec::new()
        };

        for &i in order.iter().rev() {
            self.apply_content_change(&changes[i], false)?;
        }

        Ok(reverse)
    }

    /// Map every change (visited in document order) to its position in the final document.
    fn reverse_changes(&self, changes: &[ContentChange], order: &[usize]) -> Result<Vec<ContentChange>> {
        let mut reverse = Vec::with_capacity(order.len());
        let mut line_shift: isize = 0;
        // Original and final end position of the previously visited change.
        let mut prev: Option<(Position, Position)> = None;

        for &i in order {
            let change = &changes[i];
            let range = change.range;
            let start = match prev {
                Some((orig_end, final_end)) if orig_end.line == range.start.line => Position::new(
                    final_end.line,
                    final_end.character + (range.start.character - orig_end.character),
                ),
                _ => Position::new(shift_line(range.start.line, line_shift), range.start.character),
            };

            let new_lines = split_lines(&change.text);
            let last_len = new_lines.last().map_or(0, |l| l.chars().count());
            let end = if new_lines.len() == 1 {
                Position::new(start.line, start.character + last_len)
            } else {
                Position::new(start.line + new_lines.len() - 1, last_len)
            };

            line_shift = end.line as isize - range.end.line as isize;
            prev = Some((range.end, end));
            reverse.push(ContentChange {
                range: Range::new(start, end),
                text: self.get_text(&range)?,
            });
        }

        Ok(reverse)
    }

    fn validate_range(&self, range: &Range) -> Result<()> {
        if self.is_valid_range(range) {
            Ok(())
        } else {
            Err(ReplayError::InvalidRange {
                uri: self.uri.clone(),
                range: *range,
                line_count: self.line_count(),
            })
        }
    }

    fn char_index(&self, pos: Position) -> usize {
        self.rope.line_to_char(pos.line) + pos.character
    }
}

fn shift_line(line: usize, shift: isize) -> usize {
    line.checked_add_signed(shift).unwrap_or(0)
}
