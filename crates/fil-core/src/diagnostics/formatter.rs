// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Plain-text rendering of messages with a caret underline.
//!
//! ```text
//! main.fsl 1:7 Error: Expected ';'
//! let x = 1;
//!     ~~^~~~
//! ```
//!
//! Only spans that stay within one line of one file get an underline. Other
//! spans print the header and a note instead.

use std::fmt::Write as _;

use super::Message;
use crate::source_analysis::SourceLookup;

const CROSS_FILE_NOTE: &str = "note: rendering a span across multiple files is not supported";
const MULTI_LINE_NOTE: &str = "note: rendering a span across multiple lines is not supported";

/// Renders `message` against the source text available through `sources`.
///
/// Lines and columns are displayed 1-based; columns count codepoints. The
/// result has no trailing newline.
#[must_use]
pub fn format_message(message: &Message, sources: &impl SourceLookup) -> String {
    let point = message.point;
    let file_name = sources.file_name(point.file).unwrap_or("<unknown>");
    let line = sources.line_text(point.file, point.line);

    let column = line.map_or(point.column as usize, |line| {
        char_count(line, 0, point.column as usize)
    });
    let mut out = format!(
        "{file_name} {}:{} {}: {}",
        point.line + 1,
        column + 1,
        message.kind,
        message.text
    );

    let span = message.span;
    if !span.is_single_file() {
        let _ = write!(out, "\n{CROSS_FILE_NOTE}");
        return out;
    }
    if !span.is_single_line() {
        let _ = write!(out, "\n{MULTI_LINE_NOTE}");
        return out;
    }
    let Some(line) = sources.line_text(span.start.file, span.start.line) else {
        return out;
    };

    let start = span.start.column as usize;
    let end = span.end.column as usize;
    let focus = (point.column as usize).clamp(start, end);

    let prefix: String = line
        .get(..start.min(line.len()))
        .unwrap_or_default()
        .chars()
        .map(|c| if c == '\t' { '\t' } else { ' ' })
        .chain(std::iter::repeat_n(' ', start.saturating_sub(line.len())))
        .collect();
    let before = char_count(line, start, focus);
    let after = char_count(line, focus, end + 1).saturating_sub(1);

    let _ = write!(
        out,
        "\n{line}\n{prefix}{}^{}",
        "~".repeat(before),
        "~".repeat(after)
    );
    out
}

/// Counts the codepoints starting in the byte range `[from, to)` of `line`.
///
/// Positions past the end of the line count as one column each, so a point
/// just past the last character still gets a caret.
fn char_count(line: &str, from: usize, to: usize) -> usize {
    if to <= from {
        return 0;
    }
    let inside = line
        .char_indices()
        .filter(|&(index, _)| index >= from && index < to)
        .count();
    inside + to.saturating_sub(from.max(line.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MessageKind;
    use crate::source_analysis::{FileId, SourceMap, SourcePoint, SourceSpan};

    fn point(line: u32, column: u32, index: u32) -> SourcePoint {
        SourcePoint::new(FileId(0), index, line, column)
    }

    fn map(text: &str) -> SourceMap {
        let mut map = SourceMap::new();
        map.add("main.fsl", text);
        map
    }

    #[test]
    fn single_line_underline() {
        let sources = map("let x = 1;");
        let message = Message::error(SourceSpan::new(point(0, 4, 4), point(0, 9, 9)), "oops")
            .with_point(point(0, 6, 6));
        let rendered = format_message(&message, &sources);
        assert_eq!(
            rendered,
            "main.fsl 1:7 Error: oops\nlet x = 1;\n    ~~^~~~"
        );
        let underline = rendered.lines().nth(2).unwrap_or_default();
        assert!(underline.starts_with("    ~~^"));
        assert_eq!(underline.matches('~').count(), 5);
    }

    #[test]
    fn single_character_span_is_just_a_caret() {
        let sources = map("a b");
        let message = Message::warning(SourceSpan::at(point(0, 2, 2)), "Unused");
        assert_eq!(
            format_message(&message, &sources),
            "main.fsl 1:3 Warning: Unused\na b\n  ^"
        );
    }

    #[test]
    fn tabs_are_preserved_in_prefix() {
        let sources = map("\tx;");
        let message = Message::error(SourceSpan::at(point(0, 1, 1)), "e");
        let rendered = format_message(&message, &sources);
        assert_eq!(rendered.lines().nth(2), Some("\t^"));
    }

    #[test]
    fn columns_count_codepoints() {
        // "é" is two bytes; the caret under "x" must be one column in.
        let sources = map("\u{e9}x");
        let message = Message::error(SourceSpan::at(point(0, 2, 2)), "e");
        let rendered = format_message(&message, &sources);
        assert!(rendered.starts_with("main.fsl 1:2 Error: e"));
        assert_eq!(rendered.lines().nth(2), Some(" ^"));
    }

    #[test]
    fn point_past_end_of_line() {
        let sources = map("#include");
        let message = Message::error(SourceSpan::at(point(0, 8, 8)), "Expected string or identifier");
        let rendered = format_message(&message, &sources);
        assert_eq!(rendered.lines().nth(2), Some("        ^"));
    }

    #[test]
    fn multi_line_spans_are_not_underlined() {
        let sources = map("a\nb");
        let message = Message::error(SourceSpan::new(point(0, 0, 0), point(1, 0, 2)), "e");
        assert_eq!(
            format_message(&message, &sources),
            format!("main.fsl 1:1 Error: e\n{MULTI_LINE_NOTE}")
        );
    }

    #[test]
    fn cross_file_spans_are_not_underlined() {
        let mut sources = map("a");
        sources.add("other.fsl", "b");
        let message = Message::error(
            SourceSpan::new(point(0, 0, 0), SourcePoint::new(FileId(1), 0, 0, 0)),
            "e",
        );
        let rendered = format_message(&message, &sources);
        assert!(rendered.ends_with(CROSS_FILE_NOTE));
        assert_eq!(rendered.lines().count(), 2);
    }

    #[test]
    fn unknown_file_prints_header_only() {
        let sources = SourceMap::new();
        let message = Message {
            kind: MessageKind::Warning,
            span: SourceSpan::at(point(2, 3, 10)),
            point: point(2, 3, 10),
            text: "w".into(),
        };
        assert_eq!(
            format_message(&message, &sources),
            "<unknown> 3:4 Warning: w"
        );
    }
}
