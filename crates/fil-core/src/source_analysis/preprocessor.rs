// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Directive expansion.
//!
//! The preprocessor walks a token stream and replaces every
//! [`TokenClass::Preprocessor`] token by its effect. The only directive is
//! `include`, which splices in the tokens of another file:
//!
//! ```text
//! #include "lighting.fsl"   // a file name
//! #include LIGHTING         // a macro naming a file
//! ```
//!
//! Every file is included at most once per compilation, so include cycles
//! terminate without an error. Files are told apart by the key the
//! [`FileReader`] gives them, so two spellings of one file count as one. Problems are reported to the message sink and
//! the offending directive is dropped; expansion always continues.
//!
//! Macros are not defined by directives. They come from outside (the
//! configuration file or the command line) through a [`MacroTable`].

use std::collections::{BTreeMap, HashSet};

use ecow::{EcoString, eco_format};
use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, instrument};

use super::tokenizer::{TokenizerOptions, tokenize};
use super::{FileId, SourceMap, SourcePoint, SourceSpan, Token, TokenClass};
use crate::diagnostics::{Message, MessageSink};

/// Include chains deeper than this are rejected.
pub const MAX_INCLUDE_DEPTH: usize = 64;

/// Why an include target could not be read.
#[derive(Debug, Error, Diagnostic)]
pub enum ReadError {
    /// No search location has a file with this name.
    #[error("no such file")]
    #[diagnostic(code(fil::read::not_found))]
    NotFound,

    /// The file exists but reading it failed.
    #[error("{0}")]
    #[diagnostic(code(fil::read::io))]
    Io(#[from] std::io::Error),
}

/// Loads the text of include targets.
pub trait FileReader {
    /// Returns the contents of the file called `name`.
    fn read(&mut self, name: &str) -> Result<String, ReadError>;

    /// Returns the identity of the file the include target `name` refers
    /// to. Targets with equal keys are included once.
    fn include_key(&mut self, name: &str) -> EcoString {
        name.into()
    }

    /// Returns the identity of the root file registered as `name`, in the
    /// same key space as [`FileReader::include_key`].
    fn root_key(&mut self, name: &str) -> EcoString {
        name.into()
    }
}

impl<F> FileReader for F
where
    F: FnMut(&str) -> Result<String, ReadError>,
{
    fn read(&mut self, name: &str) -> Result<String, ReadError> {
        self(name)
    }
}

/// Macro names and the include targets they stand for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroTable {
    entries: BTreeMap<EcoString, EcoString>,
}

impl MacroTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines or redefines `name`.
    pub fn define(&mut self, name: impl Into<EcoString>, target: impl Into<EcoString>) {
        self.entries.insert(name.into(), target.into());
    }

    /// Looks up `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&EcoString> {
        self.entries.get(name)
    }

    /// Number of defined macros.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no macro is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over definitions in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&EcoString, &EcoString)> {
        self.entries.iter()
    }
}

impl<N: Into<EcoString>, T: Into<EcoString>> FromIterator<(N, T)> for MacroTable {
    fn from_iter<I: IntoIterator<Item = (N, T)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, target) in iter {
            table.define(name, target);
        }
        table
    }
}

/// Expands directives for one compilation.
pub struct Preprocessor<'a> {
    sources: &'a mut SourceMap,
    reader: &'a mut dyn FileReader,
    macros: &'a MacroTable,
    sink: &'a mut dyn MessageSink,
    options: TokenizerOptions,
    included: HashSet<EcoString>,
}

impl std::fmt::Debug for Preprocessor<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preprocessor")
            .field("files", &self.sources.len())
            .field("macros", &self.macros.len())
            .field("included", &self.included)
            .finish_non_exhaustive()
    }
}

impl<'a> Preprocessor<'a> {
    /// Creates a preprocessor. Included files are added to `sources`.
    pub fn new(
        sources: &'a mut SourceMap,
        reader: &'a mut dyn FileReader,
        macros: &'a MacroTable,
        sink: &'a mut dyn MessageSink,
    ) -> Self {
        Self {
            sources,
            reader,
            macros,
            sink,
            options: TokenizerOptions::default(),
            included: HashSet::new(),
        }
    }

    /// Sets the options used to tokenize included files.
    #[must_use]
    pub fn with_options(mut self, options: TokenizerOptions) -> Self {
        self.options = options;
        self
    }

    /// Expands the tokens of `root`.
    ///
    /// The root file counts as already included, so a file that includes the
    /// root back does not re-insert it.
    #[instrument(skip_all, fields(root = root.0, tokens = tokens.len()))]
    pub fn run(&mut self, root: FileId, tokens: Vec<Token>) -> Vec<Token> {
        if let Some(name) = self.sources.get(root).map(|file| file.name.clone()) {
            let key = self.reader.root_key(&name);
            self.included.insert(key);
        }
        let mut out = Vec::with_capacity(tokens.len());
        self.expand(tokens, 0, &mut out);
        out
    }

    fn expand(&mut self, tokens: Vec<Token>, depth: usize, out: &mut Vec<Token>) {
        for token in tokens {
            if token.class == TokenClass::Preprocessor {
                self.directive(&token, depth, out);
            } else {
                out.push(token);
            }
        }
    }

    fn directive(&mut self, directive: &Token, depth: usize, out: &mut Vec<Token>) {
        let body = directive.text.get(1..).unwrap_or_default();
        let parts = tokenize(
            body,
            directive.span.start.next_column(),
            TokenizerOptions::default(),
        );

        let Some((name, args)) = parts.split_first() else {
            self.sink.report(Message::error(
                SourceSpan::at(directive.span.start),
                "Expected identifier",
            ));
            return;
        };
        if name.class != TokenClass::Identifier {
            self.sink
                .report(Message::error(name.span, "Expected identifier"));
            return;
        }

        match name.text.as_str() {
            "include" => self.include(directive, args, depth, out),
            other => self.sink.report(Message::warning(
                name.span,
                eco_format!("Unknown preprocessor directive \"{other}\""),
            )),
        }
    }

    fn include(&mut self, directive: &Token, args: &[Token], depth: usize, out: &mut Vec<Token>) {
        let Some((argument, surplus)) = args.split_first() else {
            self.sink.report(Message::error(
                SourceSpan::at(directive.span.end.next_column()),
                "Expected string or identifier",
            ));
            return;
        };
        if let (Some(first), Some(last)) = (surplus.first(), surplus.last()) {
            self.sink
                .report(Message::warning(first.span.merge(last.span), "Unused"));
        }

        let target = match argument.class {
            TokenClass::String => argument.text.clone(),
            TokenClass::Identifier => {
                let Some(target) = self.macros.get(&argument.text) else {
                    self.sink
                        .report(Message::error(argument.span, "Macro has not been defined"));
                    return;
                };
                target.clone()
            }
            _ => {
                self.sink.report(Message::error(
                    argument.span,
                    "Expected string or identifier",
                ));
                return;
            }
        };

        let key = self.reader.include_key(&target);
        if self.included.contains(&key) {
            debug!(%target, %key, "already included, skipping");
            return;
        }
        if depth >= MAX_INCLUDE_DEPTH {
            self.sink
                .report(Message::error(argument.span, "Include nesting is too deep"));
            return;
        }

        let text = match self.reader.read(&target) {
            Ok(text) => text,
            Err(error) => {
                self.sink.report(Message::error(
                    argument.span,
                    eco_format!("Could not read \"{target}\": {error}"),
                ));
                return;
            }
        };
        self.included.insert(key);

        let file = self.sources.add(target.clone(), text);
        let tokens = self
            .sources
            .text(file)
            .map(|text| tokenize(text, SourcePoint::file_start(file), self.options))
            .unwrap_or_default();
        debug!(%target, file = file.0, tokens = tokens.len(), "included");
        self.expand(tokens, depth + 1, out);
    }
}

/// Expands `tokens` of `root` with a fresh include-once set.
pub fn preprocess(
    root: FileId,
    tokens: Vec<Token>,
    sources: &mut SourceMap,
    reader: &mut dyn FileReader,
    macros: &MacroTable,
    sink: &mut dyn MessageSink,
) -> Vec<Token> {
    Preprocessor::new(sources, reader, macros, sink).run(root, tokens)
}
