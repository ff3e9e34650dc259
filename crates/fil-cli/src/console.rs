// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Printing of compiler messages.
//!
//! Warnings go to standard output and errors to standard error. Stages
//! collect their messages first; the console prints them once the stage is
//! done and the source map is no longer borrowed.

use std::io::{self, Write};

use clap::ValueEnum;
use fil_core::diagnostics::{Message, format_message};
use fil_core::source_analysis::{FileId, SourceLookup, SourceMap};

use crate::diagnostic::CompileDiagnostic;

/// How messages are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum DiagnosticStyle {
    /// One header line plus a caret underline
    #[default]
    Plain,
    /// miette reports with labelled source context
    Fancy,
}

/// Where the messages being printed point into.
#[derive(Debug, Clone, Copy)]
pub enum Origin<'a> {
    /// Source files with text.
    Sources(&'a SourceMap),
    /// A binary input known only by name.
    Binary(&'a str),
}

/// Lookup for a binary input: a name, no lines.
struct BinaryLookup<'a>(&'a str);

impl SourceLookup for BinaryLookup<'_> {
    fn file_name(&self, _: FileId) -> Option<&str> {
        Some(self.0)
    }

    fn line_text(&self, _: FileId, _: u32) -> Option<&str> {
        None
    }
}

/// Writes messages to a pair of streams.
#[derive(Debug)]
pub struct Console<O, E> {
    out: O,
    err: E,
    style: DiagnosticStyle,
}

impl Console<io::Stdout, io::Stderr> {
    /// A console on the process streams.
    pub fn stdio(style: DiagnosticStyle) -> Self {
        Self::new(io::stdout(), io::stderr(), style)
    }
}

impl<O: Write, E: Write> Console<O, E> {
    /// A console writing regular output and warnings to `out`, errors to
    /// `err`.
    pub fn new(out: O, err: E, style: DiagnosticStyle) -> Self {
        Self { out, err, style }
    }

    /// Prints every message in order.
    pub fn report(&mut self, messages: &[Message], origin: Origin<'_>) -> io::Result<()> {
        for message in messages {
            let rendered = self.render(message, origin);
            let stream: &mut dyn Write = if message.is_error() {
                &mut self.err
            } else {
                &mut self.out
            };
            writeln!(stream, "{rendered}")?;
        }
        Ok(())
    }

    fn render(&self, message: &Message, origin: Origin<'_>) -> String {
        match (self.style, origin) {
            (DiagnosticStyle::Plain, Origin::Sources(sources)) => format_message(message, sources),
            (DiagnosticStyle::Plain, Origin::Binary(name)) => {
                format_message(message, &BinaryLookup(name))
            }
            (DiagnosticStyle::Fancy, Origin::Sources(sources)) => {
                let file = message.span.start.file;
                let name = sources.file_name(file).unwrap_or("<unknown>");
                fancy(CompileDiagnostic::from_message(message, name, sources.text(file)))
            }
            (DiagnosticStyle::Fancy, Origin::Binary(name)) => {
                fancy(CompileDiagnostic::from_message(message, name, None))
            }
        }
    }

    /// The stream for regular command output.
    pub fn out(&mut self) -> &mut O {
        &mut self.out
    }

    /// Consumes the console and returns its output and error streams.
    pub fn into_streams(self) -> (O, E) {
        (self.out, self.err)
    }
}

fn fancy(diagnostic: CompileDiagnostic) -> String {
    format!("{:?}", miette::Report::new(diagnostic))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fil_core::source_analysis::{SourcePoint, SourceSpan};

    fn console(style: DiagnosticStyle) -> Console<Vec<u8>, Vec<u8>> {
        Console::new(Vec::new(), Vec::new(), style)
    }

    fn streams(console: Console<Vec<u8>, Vec<u8>>) -> (String, String) {
        let (out, err) = console.into_streams();
        (String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    fn sample() -> (SourceMap, Vec<Message>) {
        let mut sources = SourceMap::new();
        let file = sources.add("main.fsl", "#pragma once\nlet x = 1");
        let pragma = SourceSpan::new(
            SourcePoint::new(file, 0, 0, 0),
            SourcePoint::new(file, 6, 0, 6),
        );
        let let_kw = SourceSpan::new(
            SourcePoint::new(file, 13, 1, 0),
            SourcePoint::new(file, 15, 1, 2),
        );
        let messages = vec![
            Message::warning(pragma, "Unsupported directive"),
            Message::error(let_kw, "Expected a declaration"),
        ];
        (sources, messages)
    }

    #[test]
    fn test_plain_splits_streams_by_kind() {
        let (sources, messages) = sample();
        let mut console = console(DiagnosticStyle::Plain);
        console.report(&messages, Origin::Sources(&sources)).unwrap();
        let (out, err) = streams(console);

        assert_eq!(
            out,
            "main.fsl 1:1 Warning: Unsupported directive\n#pragma once\n^~~~~~~\n"
        );
        assert_eq!(
            err,
            "main.fsl 2:1 Error: Expected a declaration\nlet x = 1\n^~~\n"
        );
    }

    #[test]
    fn test_plain_binary_prints_header_only() {
        let message = Message::error(
            SourceSpan::at(SourcePoint::file_start(FileId(0))),
            "Invalid FIL binary: bad magic",
        );
        let mut console = console(DiagnosticStyle::Plain);
        console
            .report(&[message], Origin::Binary("shader.fil"))
            .unwrap();
        let (out, err) = streams(console);

        assert!(out.is_empty());
        assert_eq!(err, "shader.fil 1:1 Error: Invalid FIL binary: bad magic\n");
    }

    #[test]
    fn test_fancy_includes_message_text() {
        let (sources, messages) = sample();
        let mut console = console(DiagnosticStyle::Fancy);
        console.report(&messages, Origin::Sources(&sources)).unwrap();
        let (out, err) = streams(console);

        assert!(out.contains("Unsupported directive"));
        assert!(err.contains("Expected a declaration"));
    }
}
