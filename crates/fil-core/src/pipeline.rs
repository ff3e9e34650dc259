// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The stage boundary of a compilation.
//!
//! Each stage runs to completion, reporting every problem it finds, and
//! returns its output together with whether it reported an error. Callers
//! stop before the next stage when a stage errored:
//!
//! ```
//! use fil_core::diagnostics::Message;
//! use fil_core::pipeline::{self, Stage};
//! use fil_core::source_analysis::{MacroTable, ReadError, SourceMap, TokenizerOptions};
//!
//! let mut sources = SourceMap::new();
//! let file = sources.add("main.fsl", "void main() { return }");
//! let mut reader = |_: &str| -> Result<String, ReadError> { Err(ReadError::NotFound) };
//! let mut messages: Vec<Message> = Vec::new();
//!
//! let result = pipeline::front_end(
//!     file,
//!     &mut sources,
//!     &mut reader,
//!     &MacroTable::new(),
//!     TokenizerOptions::default(),
//!     &mut messages,
//! );
//! assert_eq!(result.err(), Some(Stage::Parse));
//! assert_eq!(Stage::Parse.exit_code(), 4);
//! ```

use std::fmt;

use tracing::{debug, instrument};

use crate::ast::Node;
use crate::diagnostics::{CountingSink, Message, MessageSink};
use crate::il::IlBinary;
use crate::source_analysis::{
    FileId, FileReader, MacroTable, SourceMap, SourcePoint, SourceSpan, Token, TokenClass,
    TokenizerOptions, parse, preprocess, tokenize,
};
use crate::spirv::{TranspileOptions, transpile};

/// A stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Tokenize,
    Preprocess,
    Parse,
    Transpile,
}

impl Stage {
    /// Process exit status used when the stage errors.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Tokenize => 2,
            Self::Preprocess => 3,
            Self::Parse => 4,
            Self::Transpile => 5,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Tokenize => "tokenizing",
            Self::Preprocess => "preprocessing",
            Self::Parse => "parsing",
            Self::Transpile => "transpiling",
        })
    }
}

/// The output of one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageOutcome<T> {
    pub value: T,
    /// `true` if the stage reported at least one error.
    pub errored: bool,
}

impl<T> StageOutcome<T> {
    /// Returns the value, or `stage` if it errored.
    ///
    /// # Errors
    ///
    /// Returns `stage` when [`Self::errored`] is set.
    pub fn into_result(self, stage: Stage) -> Result<T, Stage> {
        if self.errored {
            debug!(%stage, "stage errored");
            Err(stage)
        } else {
            Ok(self.value)
        }
    }
}

/// Runs `f` with a counting wrapper around `sink`.
fn counted<'a, T>(
    sink: &'a mut dyn MessageSink,
    f: impl FnOnce(&mut CountingSink<&'a mut dyn MessageSink>) -> T,
) -> StageOutcome<T> {
    let mut counter = CountingSink::new(sink);
    let value = f(&mut counter);
    StageOutcome {
        value,
        errored: counter.errored(),
    }
}

/// Tokenizes `file`.
///
/// The tokenizer itself never fails; runs of bytes it cannot classify are
/// reported here as errors.
#[instrument(skip_all, fields(file = file.0))]
pub fn run_tokenize(
    sources: &SourceMap,
    file: FileId,
    options: TokenizerOptions,
    sink: &mut dyn MessageSink,
) -> StageOutcome<Vec<Token>> {
    counted(sink, |sink| {
        let text = sources.text(file).unwrap_or_default();
        let tokens = tokenize(text, SourcePoint::file_start(file), options);
        for token in tokens.iter().filter(|t| t.class == TokenClass::Unknown) {
            sink.report(Message::error(
                token.span,
                format!("Unexpected characters \"{}\"", token.text),
            ));
        }
        tokens
    })
}

/// Expands the directives in the tokens of `file`.
pub fn run_preprocess(
    file: FileId,
    tokens: Vec<Token>,
    sources: &mut SourceMap,
    reader: &mut dyn FileReader,
    macros: &MacroTable,
    sink: &mut dyn MessageSink,
) -> StageOutcome<Vec<Token>> {
    counted(sink, |sink| {
        preprocess(file, tokens, sources, reader, macros, sink)
    })
}

/// Parses a preprocessed token stream.
pub fn run_parse(tokens: &[Token], sink: &mut dyn MessageSink) -> StageOutcome<Node> {
    counted(sink, |sink| parse(tokens, sink))
}

/// Transpiles a FIL binary loaded from `file` to SPIR-V words.
pub fn run_transpile(
    il: &IlBinary,
    options: TranspileOptions,
    file: FileId,
    sink: &mut dyn MessageSink,
) -> StageOutcome<Vec<u32>> {
    counted(sink, |sink| transpile(il, options, file, sink))
}

/// Runs tokenizing, preprocessing and parsing of `file`, stopping after the
/// first stage that errors.
///
/// # Errors
///
/// Returns the stage that reported an error.
pub fn front_end(
    file: FileId,
    sources: &mut SourceMap,
    reader: &mut dyn FileReader,
    macros: &MacroTable,
    options: TokenizerOptions,
    sink: &mut dyn MessageSink,
) -> Result<Node, Stage> {
    let tokens = run_tokenize(sources, file, options, sink).into_result(Stage::Tokenize)?;
    let tokens = run_preprocess(file, tokens, sources, reader, macros, sink)
        .into_result(Stage::Preprocess)?;
    run_parse(&tokens, sink).into_result(Stage::Parse)
}

/// A zero-width span at the start of `file`, for messages about a whole
/// file.
#[must_use]
pub fn file_span(file: FileId) -> SourceSpan {
    SourceSpan::at(SourcePoint::file_start(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::il::{BuiltinType, EntrypointKind, call_body};
    use crate::source_analysis::ReadError;

    fn no_files(_: &str) -> Result<String, ReadError> {
        Err(ReadError::NotFound)
    }

    fn front(source: &str) -> (Result<Node, Stage>, Vec<Message>) {
        let mut sources = SourceMap::new();
        let file = sources.add("main.fsl", source);
        let mut messages = Vec::new();
        let result = front_end(
            file,
            &mut sources,
            &mut no_files,
            &MacroTable::new(),
            TokenizerOptions::default(),
            &mut messages,
        );
        (result, messages)
    }

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [Stage::Tokenize, Stage::Preprocess, Stage::Parse, Stage::Transpile]
            .map(Stage::exit_code);
        assert_eq!(codes, [2, 3, 4, 5]);
    }

    #[test]
    fn clean_source_reaches_the_tree() {
        let (result, messages) = front("void main() { return; }");
        assert!(messages.is_empty());
        assert_eq!(result.map(|root| root.children.len()), Ok(1));
    }

    #[test]
    fn unknown_characters_stop_after_tokenizing() {
        let (result, messages) = front("void main() { \u{e9} }");
        assert_eq!(result.err(), Some(Stage::Tokenize));
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn unreadable_include_stops_after_preprocessing() {
        let (result, messages) = front("#include \"missing.fsl\"\nvoid main() {}");
        assert_eq!(result.err(), Some(Stage::Preprocess));
        assert!(messages[0].text.starts_with("Could not read"));
    }

    #[test]
    fn warnings_do_not_stop_the_pipeline() {
        let (result, messages) = front("#pragma once\nvoid main() {}");
        assert!(result.is_ok());
        assert_eq!(messages.len(), 1);
        assert!(!messages[0].is_error());
    }

    #[test]
    fn grammar_errors_stop_after_parsing() {
        let (result, _) = front("void main( {}");
        assert_eq!(result.err(), Some(Stage::Parse));
    }

    #[test]
    fn transpile_stage_reports_errors() {
        let mut il = IlBinary::new();
        il.add_entrypoint(EntrypointKind::Vertex, "vs", Vec::new(), Vec::new(), &call_body(&[]));
        let mut messages = Vec::new();
        let outcome = run_transpile(&il, TranspileOptions::default(), FileId(0), &mut messages);
        assert!(!outcome.errored);
        assert!(!outcome.value.is_empty());

        il.add_function("f", BuiltinType::Vec2.id(), Vec::new(), &call_body(&[]));
        let outcome = run_transpile(&il, TranspileOptions::default(), FileId(0), &mut messages);
        assert_eq!(outcome.into_result(Stage::Transpile), Err(Stage::Transpile));
    }
}
