// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the parser.
//!
//! 1. **Parser never panics** on arbitrary or near-valid input
//! 2. **Diagnostic spans within input**: every span lies inside the source
//! 3. **Unknown nodes produce diagnostics**: `NodeType::Unknown` implies at
//!    least one error
//! 4. **Valid programs parse cleanly**

use proptest::prelude::*;

use crate::ast::Node;
use crate::diagnostics::Message;
use crate::source_analysis::{FileId, SourcePoint, TokenizerOptions, parse, tokenize};

// ============================================================================
// Near-valid generators
// ============================================================================

/// Complete functions, all valid.
const FUNCTIONS: &[&str] = &[
    "void main() {}",
    "float4 shade(in float2 uv) { return sample(tex, uv * 2.0); }",
    "[[entry(fragment)]] float4 main(in float4 color) { return color; }",
    "float area(float w, float h);",
    "void f() { float x = 1.0; x = x + 1.0; }",
    "void g() { int i = 0x10; { i = -i; } ; }",
    "void h() { float4 c = {1, 2, {3, 4}}; c.x = c[0] * 2; }",
    "bool test(const float a) { return a >= 0.5 && !(a > 1.0) || a == 2; }",
    "buffer<vec<float>> load(uniform texture<float> t);",
];

fn valid_function() -> impl Strategy<Value = String> {
    prop::sample::select(FUNCTIONS).prop_map(std::string::ToString::to_string)
}

fn valid_program() -> impl Strategy<Value = String> {
    prop::collection::vec(valid_function(), 0..6).prop_map(|parts| parts.join("\n"))
}

/// A valid program cut at a random point. The seeds are ASCII, so every cut
/// is a char boundary.
fn truncated_program() -> impl Strategy<Value = String> {
    valid_function().prop_flat_map(|s| {
        let len = s.len();
        (0..len).prop_map(move |cut| s[..cut].to_string())
    })
}

/// A valid program with its brackets swapped around.
fn mismatched_brackets() -> impl Strategy<Value = String> {
    valid_function().prop_map(|s| {
        s.chars()
            .map(|ch| match ch {
                '(' => '{',
                '}' => ')',
                '[' => '(',
                _ => ch,
            })
            .collect()
    })
}

/// A valid program with one token-ish chunk removed.
fn dropped_symbol() -> impl Strategy<Value = String> {
    (valid_function(), prop::sample::select(&[";", ")", "}", "(", "=", ","][..])).prop_map(
        |(s, symbol)| s.replacen(symbol, "", 1),
    )
}

fn near_valid_program() -> impl Strategy<Value = String> {
    prop_oneof![
        valid_program(),
        truncated_program(),
        mismatched_brackets(),
        dropped_symbol(),
    ]
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_str(source: &str) -> (Node, Vec<Message>) {
    let tokens = tokenize(
        source,
        SourcePoint::file_start(FileId(0)),
        TokenizerOptions::default(),
    );
    let mut messages = Vec::new();
    let root = parse(&tokens, &mut messages);
    (root, messages)
}

/// Default is 512 cases for standard CI; override via `PROPTEST_CASES` env var
/// for longer runs.
fn proptest_config() -> ProptestConfig {
    let default = ProptestConfig::default();
    ProptestConfig {
        cases: default.cases.max(512),
        ..default
    }
}

proptest! {
    #![proptest_config(proptest_config())]

    /// Property 1: the parser always returns a tree.
    #[test]
    fn parser_never_panics(input in "\\PC{0,500}") {
        let (_root, _messages) = parse_str(&input);
    }

    /// Property 1b: near-valid input exercises recovery without panicking.
    #[test]
    fn parser_never_panics_near_valid(input in near_valid_program()) {
        let (_root, _messages) = parse_str(&input);
    }

    /// Property 2: every diagnostic points into the input, or one past its
    /// end.
    #[test]
    fn diagnostic_spans_within_input(input in near_valid_program()) {
        let (_root, messages) = parse_str(&input);
        let input_len = u32::try_from(input.len()).unwrap_or(u32::MAX);
        for message in &messages {
            prop_assert!(
                message.span.start <= message.span.end,
                "span start after end for {:?}: {}",
                input,
                message.text,
            );
            prop_assert!(
                message.span.end.index <= input_len,
                "span end {} exceeds input length {} for {:?}: {}",
                message.span.end.index,
                input_len,
                input,
                message.text,
            );
        }
    }

    /// Property 3: an `Unknown` node is never left without an error.
    #[test]
    fn unknown_nodes_produce_diagnostics(input in near_valid_program()) {
        let (root, messages) = parse_str(&input);
        if root.has_errors() {
            prop_assert!(
                messages.iter().any(Message::is_error),
                "tree has Unknown nodes but no errors for {:?}",
                input,
            );
        }
    }

    /// Property 4: valid programs produce no diagnostics and one declaration
    /// per function.
    #[test]
    fn valid_programs_parse_cleanly(parts in prop::collection::vec(valid_function(), 0..6)) {
        let (root, messages) = parse_str(&parts.join("\n"));
        prop_assert!(messages.is_empty(), "unexpected messages: {:?}", messages);
        prop_assert_eq!(root.children.len(), parts.len());
    }
}
