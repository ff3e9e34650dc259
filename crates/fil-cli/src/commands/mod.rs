// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Subcommand implementations.
//!
//! Every command resolves its [`Settings`], runs the stages it needs,
//! prints the collected messages through a [`Console`] and reports how far
//! it got as a [`Status`]. Failures that are not compiler messages, such as
//! unreadable input or a broken config file, are returned as errors.

use std::fs;
use std::io::Write;

use camino::Utf8Path;
use fil_core::ast::Node;
use fil_core::diagnostics::Message;
use fil_core::il::{IlBinary, decode_with};
use fil_core::pipeline::{self, Stage};
use fil_core::source_analysis::{FileId, SourceMap};
use miette::{Context, IntoDiagnostic, Report, Result};

use crate::config::{Overrides, Settings};
use crate::console::{Console, Origin};
use crate::reader::IncludeReader;

pub mod ast;
pub mod check;
pub mod il;
pub mod tokens;
pub mod transpile;

/// How a command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every stage ran without errors.
    Success,
    /// A stage reported errors.
    Failed(Stage),
}

impl Status {
    /// Process exit status.
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failed(stage) => stage.exit_code(),
        }
    }
}

impl From<Result<(), Stage>> for Status {
    fn from(result: Result<(), Stage>) -> Self {
        match result {
            Ok(()) => Self::Success,
            Err(stage) => Self::Failed(stage),
        }
    }
}

/// A source file loaded into a fresh source map.
pub(crate) struct SourceInput {
    pub sources: SourceMap,
    pub file: FileId,
    pub settings: Settings,
}

impl SourceInput {
    pub fn load(path: &Utf8Path, overrides: &Overrides) -> Result<Self> {
        let settings = Settings::resolve(path, overrides)?;
        let text = fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read '{path}'"))?;
        let mut sources = SourceMap::new();
        let file = sources.add(path.as_str(), text);
        Ok(Self {
            sources,
            file,
            settings,
        })
    }

    pub fn reader(&self, path: &Utf8Path) -> IncludeReader {
        IncludeReader::for_input(path, &self.settings.include_paths)
    }
}

/// Runs tokenizing, preprocessing and parsing on `path` and prints the
/// messages.
pub(crate) fn front_end<O: Write, E: Write>(
    path: &Utf8Path,
    overrides: &Overrides,
    console: &mut Console<O, E>,
) -> Result<Result<Node, Stage>> {
    let mut input = SourceInput::load(path, overrides)?;
    let mut reader = input.reader(path);
    let mut messages: Vec<Message> = Vec::new();
    let result = pipeline::front_end(
        input.file,
        &mut input.sources,
        &mut reader,
        &input.settings.macros,
        input.settings.tokenizer,
        &mut messages,
    );
    console
        .report(&messages, Origin::Sources(&input.sources))
        .into_diagnostic()?;
    Ok(result)
}

/// Reads and decodes a FIL binary.
pub(crate) fn load_binary(path: &Utf8Path, settings: &Settings) -> Result<IlBinary> {
    let bytes = fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read '{path}'"))?;
    decode_with(&bytes, settings.il_mode)
        .map_err(|error| Report::new(error).wrap_err(format!("Failed to decode '{path}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_exit_codes() {
        assert_eq!(Status::Success.exit_code(), 0);
        assert_eq!(Status::Failed(Stage::Tokenize).exit_code(), 2);
        assert_eq!(Status::Failed(Stage::Transpile).exit_code(), 5);
    }

    #[test]
    fn test_status_from_stage_result() {
        assert_eq!(Status::from(Ok(())), Status::Success);
        assert_eq!(
            Status::from(Err(Stage::Parse)),
            Status::Failed(Stage::Parse)
        );
    }
}
