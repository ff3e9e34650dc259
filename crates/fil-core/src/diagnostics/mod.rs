// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Diagnostic messages produced by the front-end stages.
//!
//! Stages never stop at the first problem. They report a [`Message`] to a
//! [`MessageSink`] and keep going; the pipeline decides afterwards whether
//! the stage output can be trusted (see [`crate::pipeline`]).
//!
//! Messages are rendered for humans by [`format_message`].

mod formatter;

use std::fmt;

use ecow::EcoString;

use crate::source_analysis::{SourcePoint, SourceSpan};

pub use formatter::format_message;

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessageKind {
    /// Informational; the stage output is still usable.
    Warning,
    /// The stage output must not be trusted.
    Error,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("Warning"),
            Self::Error => f.write_str("Error"),
        }
    }
}

/// A diagnostic message with a focus point inside its span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Severity.
    pub kind: MessageKind,
    /// The source range the message is about.
    pub span: SourceSpan,
    /// The point within `span` the caret is drawn under.
    pub point: SourcePoint,
    /// Human readable text.
    pub text: EcoString,
}

impl Message {
    /// Creates an error focused on the start of `span`.
    #[must_use]
    pub fn error(span: SourceSpan, text: impl Into<EcoString>) -> Self {
        Self {
            kind: MessageKind::Error,
            span,
            point: span.start,
            text: text.into(),
        }
    }

    /// Creates a warning focused on the start of `span`.
    #[must_use]
    pub fn warning(span: SourceSpan, text: impl Into<EcoString>) -> Self {
        Self {
            kind: MessageKind::Warning,
            span,
            point: span.start,
            text: text.into(),
        }
    }

    /// Moves the focus point.
    #[must_use]
    pub fn with_point(mut self, point: SourcePoint) -> Self {
        self.point = point;
        self
    }

    /// Returns `true` for error messages.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}

/// Receives messages as they are produced.
pub trait MessageSink {
    /// Accepts one message.
    fn report(&mut self, message: Message);
}

impl MessageSink for Vec<Message> {
    fn report(&mut self, message: Message) {
        self.push(message);
    }
}

impl<S: MessageSink + ?Sized> MessageSink for &mut S {
    fn report(&mut self, message: Message) {
        (**self).report(message);
    }
}

/// Forwards messages to another sink while counting them by kind.
#[derive(Debug)]
pub struct CountingSink<S> {
    inner: S,
    errors: usize,
    warnings: usize,
}

impl<S: MessageSink> CountingSink<S> {
    /// Wraps `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            errors: 0,
            warnings: 0,
        }
    }

    /// Number of errors reported so far.
    #[must_use]
    pub fn errors(&self) -> usize {
        self.errors
    }

    /// Number of warnings reported so far.
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Returns `true` once any error has been reported.
    #[must_use]
    pub fn errored(&self) -> bool {
        self.errors > 0
    }

    /// Unwraps the inner sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: MessageSink> MessageSink for CountingSink<S> {
    fn report(&mut self, message: Message) {
        match message.kind {
            MessageKind::Error => self.errors += 1,
            MessageKind::Warning => self.warnings += 1,
        }
        self.inner.report(message);
    }
}
