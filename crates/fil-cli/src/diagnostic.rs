// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! miette rendering of compiler messages.
//!
//! Used by `--diagnostics fancy`. Only spans inside a single file with
//! available text get a label; everything else renders as a bare message.

// Suppress unused_assignments for struct fields used by derive macros
#![allow(unused_assignments)]

use fil_core::diagnostics::{Message, MessageKind};
use miette::{Diagnostic, SourceSpan};

/// A compiler message with source context for miette.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(fil::compile))]
pub struct CompileDiagnostic {
    /// Error or warning
    pub kind: MessageKind,
    /// Human-readable message
    pub message: String,
    #[source_code]
    pub src: miette::NamedSource<String>,
    /// Location of the problem, when the source text is known
    #[label("{label}")]
    pub span: Option<SourceSpan>,
    /// Label for the span (interpolated by miette derive macro)
    pub label: String,
}

impl CompileDiagnostic {
    /// Converts `message`, whose span lies in the file `source_path`.
    ///
    /// `source` is the file text, or `None` for inputs without text such as
    /// FIL binaries.
    pub fn from_message(message: &Message, source_path: &str, source: Option<&str>) -> Self {
        let label = match message.kind {
            MessageKind::Error => "error here",
            MessageKind::Warning => "warning here",
        };

        let span = source
            .filter(|_| message.span.is_single_file())
            .map(|text| clamp(message.span.into(), text.len()));

        Self {
            kind: message.kind,
            message: message.text.to_string(),
            src: miette::NamedSource::new(source_path, source.unwrap_or_default().to_string()),
            span,
            label: label.to_string(),
        }
    }
}

/// Keeps `span` inside a text of `len` bytes. Spans at end of input become
/// zero-length.
fn clamp(span: SourceSpan, len: usize) -> SourceSpan {
    let offset = span.offset().min(len);
    let end = (span.offset() + span.len()).min(len);
    (offset, end - offset).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fil_core::source_analysis::{FileId, SourcePoint, SourceSpan as CoreSpan};

    fn span(start: u32, end: u32) -> CoreSpan {
        CoreSpan::new(
            SourcePoint::new(FileId(0), start, 0, start),
            SourcePoint::new(FileId(0), end, 0, end),
        )
    }

    #[test]
    fn test_from_message_error() {
        let message = Message::error(span(10, 14), "Expected ';'");
        let source = "void f() { x = 1 }";
        let diag = CompileDiagnostic::from_message(&message, "test.fsl", Some(source));

        assert_eq!(diag.kind, MessageKind::Error);
        assert_eq!(diag.message, "Expected ';'");
        let label = diag.span.unwrap();
        assert_eq!(label.offset(), 10);
        assert_eq!(label.len(), 5);
        assert_eq!(diag.label, "error here");
    }

    #[test]
    fn test_from_message_warning() {
        let message = Message::warning(span(0, 6), "Unsupported directive");
        let source = "#pragma once";
        let diag = CompileDiagnostic::from_message(&message, "test.fsl", Some(source));

        assert_eq!(diag.kind, MessageKind::Warning);
        assert_eq!(diag.span.unwrap().len(), 7);
        assert_eq!(diag.label, "warning here");
    }

    #[test]
    fn test_from_message_at_end_of_input() {
        let message = Message::error(span(10, 10), "Unexpected end of input");
        let source = "void f() {";
        let diag = CompileDiagnostic::from_message(&message, "test.fsl", Some(source));

        let label = diag.span.unwrap();
        assert_eq!(label.offset(), 10);
        assert_eq!(label.len(), 0);
    }

    #[test]
    fn test_from_message_without_source() {
        let message = Message::error(span(0, 0), "Invalid FIL binary");
        let diag = CompileDiagnostic::from_message(&message, "shader.fil", None);

        assert!(diag.span.is_none());
        assert_eq!(diag.message, "Invalid FIL binary");
    }

    #[test]
    fn test_from_message_across_files_has_no_label() {
        let message = Message::error(
            CoreSpan::new(
                SourcePoint::new(FileId(0), 2, 0, 2),
                SourcePoint::new(FileId(1), 3, 0, 3),
            ),
            "Spans two files",
        );
        let diag = CompileDiagnostic::from_message(&message, "a.fsl", Some("abcdef"));
        assert!(diag.span.is_none());
    }
}
