// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The file table shared by every stage of a compilation.
//!
//! Files are only ever appended: the [`FileId`] handed out for a file stays
//! valid for the lifetime of the map, and spans recorded by earlier stages can
//! always be resolved back to their text.

use ecow::EcoString;

use super::FileId;

/// A file registered in a [`SourceMap`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// The name the file was loaded under (a path or an include target).
    pub name: EcoString,
    /// The full text of the file.
    pub text: String,
}

/// Read-only access to source names and lines, as needed by the formatter.
pub trait SourceLookup {
    /// Returns the display name of `file`.
    fn file_name(&self, file: FileId) -> Option<&str>;

    /// Returns the text of zero-based `line` in `file`, without its terminator.
    fn line_text(&self, file: FileId, line: u32) -> Option<&str>;
}

/// Append-only table of source files.
#[derive(Debug, Clone, Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Creates an empty source map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file and returns its id.
    ///
    /// Positions in text longer than `u32::MAX` bytes saturate, see
    /// [`SourcePoint::next_column`](super::SourcePoint::next_column).
    #[expect(
        clippy::cast_possible_truncation,
        reason = "more than 4 billion source files are not supported"
    )]
    pub fn add(&mut self, name: impl Into<EcoString>, text: impl Into<String>) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile {
            name: name.into(),
            text: text.into(),
        });
        id
    }

    /// Returns the file registered under `id`.
    #[must_use]
    pub fn get(&self, id: FileId) -> Option<&SourceFile> {
        self.files.get(id.index())
    }

    /// Returns the text of `id`.
    #[must_use]
    pub fn text(&self, id: FileId) -> Option<&str> {
        self.get(id).map(|file| file.text.as_str())
    }

    /// Returns the number of registered files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns true if no file has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterates over all files with their ids.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "ids are created from u32 indices"
    )]
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &SourceFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| (FileId(i as u32), file))
    }
}

impl SourceLookup for SourceMap {
    fn file_name(&self, file: FileId) -> Option<&str> {
        self.get(file).map(|f| f.name.as_str())
    }

    fn line_text(&self, file: FileId, line: u32) -> Option<&str> {
        let text = self.text(file)?;
        let raw = text.split('\n').nth(line as usize)?;
        Some(raw.strip_suffix('\r').unwrap_or(raw))
    }
}
