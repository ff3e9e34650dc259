// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Source location tracking.
//!
//! Every token and AST node carries a [`SourceSpan`] indicating its position
//! in one of the files registered in a [`SourceMap`](super::SourceMap). Points
//! record the file, the byte offset and the zero-based line and column so that
//! diagnostics can be rendered without re-scanning the source.

use std::cmp::Ordering;
use std::ops::Range;

/// Identifies a file in a [`SourceMap`](super::SourceMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct FileId(pub u32);

impl FileId {
    /// Returns the index of this file in its source map.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single location in a source file.
///
/// All fields are zero-based. `column` counts bytes from the start of the
/// line; consumers that need codepoint columns (the diagnostic formatter)
/// convert using the line text.
///
/// Ordering is lexicographic on `(file, index)`: line and column are derived
/// from the byte offset and never break ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourcePoint {
    /// The file this point lies in.
    pub file: FileId,
    /// Byte offset from the start of the file.
    pub index: u32,
    /// Line number.
    pub line: u32,
    /// Column number, in bytes.
    pub column: u32,
}

impl SourcePoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(file: FileId, index: u32, line: u32, column: u32) -> Self {
        Self {
            file,
            index,
            line,
            column,
        }
    }

    /// The first byte of `file`.
    #[must_use]
    pub const fn file_start(file: FileId) -> Self {
        Self::new(file, 0, 0, 0)
    }

    /// Returns the point one byte further along the same line.
    ///
    /// Positions saturate at `u32::MAX`, so text past 4 GiB reports the last
    /// representable position instead of wrapping to the file start.
    #[must_use]
    pub const fn next_column(self) -> Self {
        Self {
            index: self.index.saturating_add(1),
            column: self.column.saturating_add(1),
            ..self
        }
    }

    /// Returns the point after consuming `byte` at this point.
    #[must_use]
    pub const fn advance(self, byte: u8) -> Self {
        if byte == b'\n' {
            Self {
                index: self.index.saturating_add(1),
                line: self.line.saturating_add(1),
                column: 0,
                ..self
            }
        } else {
            self.next_column()
        }
    }
}

impl PartialOrd for SourcePoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SourcePoint {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.file, self.index).cmp(&(other.file, other.index))
    }
}

/// An inclusive range of source points.
///
/// `end` is the position of the last byte covered, so a one-character token
/// has `start == end`. A span with `start == end` is also used for zero-width
/// locations such as "just past the end of this directive".
///
/// # Examples
///
/// ```
/// use fil_core::source_analysis::{FileId, SourcePoint, SourceSpan};
///
/// let file = FileId(0);
/// let span = SourceSpan::new(
///     SourcePoint::new(file, 4, 0, 4),
///     SourcePoint::new(file, 9, 0, 9),
/// );
/// assert_eq!(span.len(), 6);
/// assert!(span.is_single_line());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceSpan {
    /// First covered point.
    pub start: SourcePoint,
    /// Last covered point (inclusive).
    pub end: SourcePoint,
}

impl SourceSpan {
    /// Creates a span from its inclusive bounds.
    ///
    /// Callers must keep `start <= end`; this is checked in debug builds.
    #[must_use]
    pub fn new(start: SourcePoint, end: SourcePoint) -> Self {
        debug_assert!(start <= end, "span start {start:?} is after end {end:?}");
        Self { start, end }
    }

    /// Creates a span covering a single point.
    #[must_use]
    pub const fn at(point: SourcePoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    /// Returns the number of bytes covered, for spans within one file.
    #[must_use]
    pub const fn len(self) -> u32 {
        (self.end.index - self.start.index).saturating_add(1)
    }

    /// Always false: an inclusive span covers at least its start point.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        false
    }

    /// Returns true if both ends lie in the same file.
    #[must_use]
    pub fn is_single_file(self) -> bool {
        self.start.file == self.end.file
    }

    /// Returns true if both ends lie on the same line of the same file.
    #[must_use]
    pub fn is_single_line(self) -> bool {
        self.is_single_file() && self.start.line == self.end.line
    }

    /// Returns true if `point` lies within this span.
    #[must_use]
    pub fn contains(self, point: SourcePoint) -> bool {
        self.start <= point && point <= self.end
    }

    /// Creates a span that covers both `self` and `other`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Converts to a half-open byte range for indexing into the file text.
    #[must_use]
    pub const fn as_range(self) -> Range<usize> {
        self.start.index as usize..self.end.index as usize + 1
    }
}

impl From<SourceSpan> for Range<usize> {
    fn from(span: SourceSpan) -> Self {
        span.as_range()
    }
}

impl From<SourceSpan> for miette::SourceSpan {
    fn from(span: SourceSpan) -> Self {
        (span.start.index as usize, span.len() as usize).into()
    }
}
