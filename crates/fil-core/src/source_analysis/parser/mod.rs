// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Recursive descent parser for shader source.
//!
//! The parser turns a preprocessed token sequence into a [`Node`] tree rooted
//! at [`NodeType::TranslationUnit`].
//!
//! # Design
//!
//! - **Always returns a tree.** Grammar errors are reported to the message
//!   sink and recovered from locally; the caller decides what to do with a
//!   tree when errors were reported.
//! - **One function per production.** Each production starts at a token
//!   index, looks at the window from there to the end of the input, and
//!   returns `Some(Parsed { consumed, node })` or `None` when it does not
//!   match. A production that does not match reports nothing; the caller
//!   knows what it expected and anchors the diagnostic.
//! - **Commit points.** Once a production has seen enough to be sure (a
//!   function name followed by `(`, an opening `{`), it stops returning
//!   `None` and reports what is missing instead.
//! - **Bounded recursion.** Nesting beyond [`MAX_NESTING_DEPTH`] is reported
//!   and the nested region is skipped.
//!
//! # Operators
//!
//! The tokenizer emits single-character symbols. Operators such as `&&` or
//! `<=` are recognised here by joining adjacent symbol tokens.
//!
//! | Level | Operators | Associativity |
//! |-------|-----------|---------------|
//! | 1 | `\|\|` | Left |
//! | 2 | `&&` | Left |
//! | 3 | `==` `!=` | Left |
//! | 4 | `<` `>` `<=` `>=` | Left |
//! | 5 | `+` `-` | Left |
//! | 6 | `*` `/` `%` | Left |
//!
//! Assignment (`=`) is right-associative and binds loosest.
//!
//! # Usage
//!
//! ```
//! use fil_core::ast::NodeType;
//! use fil_core::source_analysis::{FileId, SourcePoint, TokenizerOptions, parse, tokenize};
//!
//! let tokens = tokenize(
//!     "void main() { return; }",
//!     SourcePoint::file_start(FileId(0)),
//!     TokenizerOptions::default(),
//! );
//! let mut messages = Vec::new();
//! let root = parse(&tokens, &mut messages);
//!
//! assert!(messages.is_empty());
//! assert_eq!(root.children.len(), 1);
//! assert_eq!(root.children[0].kind, NodeType::FunctionDeclaration);
//! ```

use ecow::EcoString;
use tracing::instrument;

use crate::ast::{Node, NodeType};
use crate::diagnostics::{Message, MessageSink};
use crate::source_analysis::{SourceSpan, Token, TokenClass};

mod declarations;
mod expressions;
mod statements;

#[cfg(test)]
mod property_tests;

/// Maximum nesting depth of expressions, blocks and initializer lists.
///
/// Deeper input is reported and skipped. As a second line of defence,
/// `stacker::maybe_grow` extends the stack on the heap at the recursive
/// entry points.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Words that can never be used as names.
const KEYWORDS: &[&str] = &[
    "return", "in", "out", "inout", "const", "uniform", "true", "false",
];

/// Result of a production that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct Parsed {
    /// Number of tokens the production used.
    pub(super) consumed: usize,
    /// The node built.
    pub(super) node: Node,
}

impl Parsed {
    pub(super) fn new(consumed: usize, node: Node) -> Self {
        Self { consumed, node }
    }
}

/// Precedence of a binary operator, higher binds tighter.
///
/// Returns `None` for anything that is not a binary operator, which ends the
/// operator loop.
pub(super) fn binary_precedence(op: &str) -> Option<u8> {
    match op {
        "||" => Some(1),
        "&&" => Some(2),
        "==" | "!=" => Some(3),
        "<" | ">" | "<=" | ">=" => Some(4),
        "+" | "-" => Some(5),
        "*" | "/" | "%" => Some(6),
        _ => None,
    }
}

/// Two-character operators formed from adjacent symbols.
const JOINED_OPERATORS: &[&str] = &["||", "&&", "==", "!=", "<=", ">="];

/// Parses `tokens` into a translation unit.
///
/// Always returns a tree; grammar errors are reported to `sink`.
#[instrument(skip_all, fields(tokens = tokens.len()))]
pub fn parse(tokens: &[Token], sink: &mut dyn MessageSink) -> Node {
    let mut parser = Parser::new(tokens, sink);
    parser.translation_unit()
}

/// The parser state.
pub(super) struct Parser<'a> {
    /// The tokens being parsed. Every production's window ends here.
    tokens: &'a [Token],
    sink: &'a mut dyn MessageSink,
    /// Current nesting depth (guards against stack overflow).
    nesting_depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], sink: &'a mut dyn MessageSink) -> Self {
        Self {
            tokens,
            sink,
            nesting_depth: 0,
        }
    }

    // ========================================================================
    // Token Access
    // ========================================================================

    pub(super) fn token(&self, at: usize) -> Option<&Token> {
        self.tokens.get(at)
    }

    pub(super) fn is_at_end(&self, at: usize) -> bool {
        at >= self.tokens.len()
    }

    pub(super) fn is_symbol(&self, at: usize, symbol: char) -> bool {
        self.token(at).is_some_and(|t| t.is_symbol(symbol))
    }

    pub(super) fn is_word(&self, at: usize, word: &str) -> bool {
        self.token(at).is_some_and(|t| t.is_word(word))
    }

    /// A zero-width span just past the last token.
    fn end_span(&self) -> SourceSpan {
        self.tokens
            .last()
            .map(|t| SourceSpan::at(t.span.end.next_column()))
            .unwrap_or_default()
    }

    /// The span of the token at `at`, or just past the input at the end.
    pub(super) fn span_at(&self, at: usize) -> SourceSpan {
        self.token(at).map_or_else(|| self.end_span(), |t| t.span)
    }

    /// The token at `at`, or an empty placeholder just past the input.
    pub(super) fn token_or_placeholder(&self, at: usize) -> Token {
        self.token(at)
            .cloned()
            .unwrap_or_else(|| Token::new(TokenClass::Unknown, self.end_span(), ""))
    }

    /// Returns `true` if the tokens at `at` and `at + 1` are symbols with
    /// nothing between them.
    fn symbols_adjacent(&self, at: usize) -> bool {
        match (self.token(at), self.token(at + 1)) {
            (Some(first), Some(second)) => {
                first.class == TokenClass::Symbol
                    && second.class == TokenClass::Symbol
                    && first.span.end.file == second.span.start.file
                    && first.span.end.index + 1 == second.span.start.index
            }
            _ => false,
        }
    }

    /// Recognises an operator at `at`, returning its spelling and how many
    /// tokens it spans.
    pub(super) fn operator_at(&self, at: usize) -> Option<(EcoString, usize)> {
        let first = self.token(at).filter(|t| t.class == TokenClass::Symbol)?;
        if self.symbols_adjacent(at) {
            if let Some(second) = self.token(at + 1) {
                let mut joined = first.text.clone();
                joined.push_str(&second.text);
                if JOINED_OPERATORS.contains(&joined.as_str()) {
                    return Some((joined, 2));
                }
            }
        }
        Some((first.text.clone(), 1))
    }

    /// Builds one token out of `width` adjacent tokens starting at `at`.
    pub(super) fn joined_token(&self, at: usize, width: usize) -> Token {
        let first = self.token_or_placeholder(at);
        if width <= 1 {
            return first;
        }
        let last = self.token_or_placeholder(at + width - 1);
        let mut text = first.text.clone();
        for token in self.tokens.iter().skip(at + 1).take(width - 1) {
            text.push_str(&token.text);
        }
        Token::new(first.class, first.span.merge(last.span), text)
    }

    // ========================================================================
    // Error Handling & Recovery
    // ========================================================================

    /// Reports an error anchored at the token at `at`.
    pub(super) fn error(&mut self, at: usize, text: impl Into<EcoString>) {
        let span = self.span_at(at);
        self.sink.report(Message::error(span, text));
    }

    /// Consumes the symbol at `at`, or reports `Expected '<symbol>'`.
    ///
    /// Returns the number of tokens consumed (0 or 1).
    pub(super) fn expect_symbol(&mut self, at: usize, symbol: char) -> usize {
        if self.is_symbol(at, symbol) {
            1
        } else {
            self.error(at, format!("Expected '{symbol}'"));
            0
        }
    }

    /// An error-recovery placeholder at `at`.
    pub(super) fn unknown(&self, at: usize) -> Node {
        Node::leaf(NodeType::Unknown, self.token_or_placeholder(at))
    }

    /// Increments the nesting depth, reporting an error and returning `false`
    /// if it would exceed [`MAX_NESTING_DEPTH`]. Pair every `true` with
    /// [`Self::leave_nesting`].
    pub(super) fn enter_nesting(&mut self, at: usize) -> bool {
        if self.nesting_depth >= MAX_NESTING_DEPTH {
            self.error(at, "Nesting is too deep");
            return false;
        }
        self.nesting_depth += 1;
        true
    }

    pub(super) fn leave_nesting(&mut self) {
        debug_assert!(self.nesting_depth > 0, "unbalanced leave_nesting");
        self.nesting_depth = self.nesting_depth.saturating_sub(1);
    }

    /// Counts the tokens of a bracketed group starting with the opener at
    /// `at`, including its closer. Runs to the end of input if unbalanced.
    pub(super) fn group_len(&self, at: usize) -> usize {
        let mut depth = 0usize;
        for (offset, token) in self.tokens.iter().skip(at).enumerate() {
            if is_opener(token) {
                depth += 1;
            } else if is_closer(token) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return offset + 1;
                }
            }
        }
        self.tokens.len().saturating_sub(at)
    }

    /// Counts the tokens up to the end of the expression starting at `at`:
    /// the next `;`, `,` or unmatched closer. Groups are skipped whole.
    pub(super) fn expression_len(&self, at: usize) -> usize {
        let mut depth = 0usize;
        for (offset, token) in self.tokens.iter().skip(at).enumerate() {
            if is_opener(token) {
                depth += 1;
            } else if is_closer(token) {
                if depth == 0 {
                    return offset;
                }
                depth -= 1;
            } else if depth == 0 && (token.is_symbol(';') || token.is_symbol(',')) {
                return offset;
            }
        }
        self.tokens.len().saturating_sub(at)
    }

    /// Counts the tokens before the `closer` that ends the construct at `at`.
    ///
    /// Stops at `closer` (not counted) or, so that recovery never runs into
    /// the next block or statement, at a `{`, `}` or `;` outside any group.
    pub(super) fn recovery_len(&self, at: usize, closer: char) -> usize {
        let mut depth = 0usize;
        for (offset, token) in self.tokens.iter().skip(at).enumerate() {
            if depth == 0
                && (token.is_symbol(closer)
                    || token.is_symbol('{')
                    || token.is_symbol('}')
                    || token.is_symbol(';'))
            {
                return offset;
            }
            if token.is_symbol('(') || token.is_symbol('[') {
                depth += 1;
            } else if token.is_symbol(')') || token.is_symbol(']') {
                depth = depth.saturating_sub(1);
            }
        }
        self.tokens.len().saturating_sub(at)
    }

    /// Counts the tokens to skip after a failed top-level declaration: up to
    /// and including the next `;`, or a balanced `}`.
    fn declaration_recovery_len(&self, at: usize) -> usize {
        let mut depth = 0usize;
        for (offset, token) in self.tokens.iter().skip(at).enumerate() {
            if token.is_symbol('{') {
                depth += 1;
            } else if token.is_symbol('}') {
                if depth <= 1 {
                    return offset + 1;
                }
                depth -= 1;
            } else if depth == 0 && token.is_symbol(';') {
                return offset + 1;
            }
        }
        self.tokens.len().saturating_sub(at).max(1)
    }

    // ========================================================================
    // Translation Unit
    // ========================================================================

    /// `translation_unit := function_declaration*`
    fn translation_unit(&mut self) -> Node {
        let mut children = Vec::new();
        let mut pos = 0;
        while !self.is_at_end(pos) {
            match self.function_declaration(pos) {
                Some(parsed) if parsed.consumed > 0 => {
                    pos += parsed.consumed;
                    children.push(parsed.node);
                }
                _ => {
                    self.error(pos, "Expected function declaration");
                    pos += self.declaration_recovery_len(pos);
                }
            }
        }
        let token = self
            .tokens
            .first()
            .cloned()
            .unwrap_or_else(|| Token::new(TokenClass::Unknown, SourceSpan::default(), ""));
        Node::new(NodeType::TranslationUnit, token, children)
    }

    /// An identifier that is not a keyword.
    pub(super) fn identifier(&self, at: usize) -> Option<Parsed> {
        let token = self.token(at)?;
        if token.class != TokenClass::Identifier || KEYWORDS.contains(&token.text.as_str()) {
            return None;
        }
        Some(Parsed::new(1, Node::leaf(NodeType::Identifier, token.clone())))
    }
}

fn is_opener(token: &Token) -> bool {
    token.is_symbol('(') || token.is_symbol('[') || token.is_symbol('{')
}

fn is_closer(token: &Token) -> bool {
    token.is_symbol(')') || token.is_symbol(']') || token.is_symbol('}')
}
