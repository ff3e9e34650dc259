// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `filc tokens`: print the token stream of a file.
//!
//! One token per line, prefixed by the file it came from:
//!
//! ```text
//! main.fsl 1:1 Identifier "void"
//! ```

use std::io::Write;

use camino::Utf8Path;
use fil_core::diagnostics::Message;
use fil_core::pipeline::{self, Stage};
use fil_core::source_analysis::{SourceLookup, Token};
use miette::{IntoDiagnostic, Result};

use super::{SourceInput, Status};
use crate::config::Overrides;
use crate::console::{Console, Origin};

/// Prints the tokens of `path`; with `expand`, after include expansion.
pub fn run<O: Write, E: Write>(
    path: &Utf8Path,
    expand: bool,
    overrides: &Overrides,
    console: &mut Console<O, E>,
) -> Result<Status> {
    let mut input = SourceInput::load(path, overrides)?;
    let mut messages: Vec<Message> = Vec::new();

    let tokenized = pipeline::run_tokenize(
        &input.sources,
        input.file,
        input.settings.tokenizer,
        &mut messages,
    );
    let mut result = tokenized.into_result(Stage::Tokenize);
    if expand {
        let mut reader = input.reader(path);
        result = result.and_then(|tokens| {
            pipeline::run_preprocess(
                input.file,
                tokens,
                &mut input.sources,
                &mut reader,
                &input.settings.macros,
                &mut messages,
            )
            .into_result(Stage::Preprocess)
        });
    }

    console
        .report(&messages, Origin::Sources(&input.sources))
        .into_diagnostic()?;
    let tokens = match result {
        Ok(tokens) => tokens,
        Err(stage) => return Ok(Status::Failed(stage)),
    };
    for token in &tokens {
        print_token(console.out(), &input.sources, token).into_diagnostic()?;
    }
    Ok(Status::Success)
}

fn print_token(
    out: &mut impl Write,
    sources: &impl SourceLookup,
    token: &Token,
) -> std::io::Result<()> {
    let file = sources
        .file_name(token.span.start.file)
        .unwrap_or("<unknown>");
    writeln!(out, "{file} {token}")
}
