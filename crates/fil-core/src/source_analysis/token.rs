// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types produced by the tokenizer.
//!
//! # Token Structure
//!
//! Each token consists of:
//! - A [`TokenClass`] describing what kind of text it covers
//! - A [`SourceSpan`] locating it in a source file
//! - The covered text, as an [`EcoString`] so tokens are cheap to clone
//!
//! String tokens are the one case where text and span exclude part of the
//! scanned input: the delimiting quotes are not part of the token.

use std::fmt;

use ecow::EcoString;

use super::SourceSpan;

/// The class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TokenClass {
    /// Bytes the tokenizer has no rule for (control characters, non-ASCII).
    Unknown = 0,
    /// `foo`, `_bar1`
    Identifier = 1,
    /// The contents of `"..."`, without the quotes.
    String = 2,
    /// `42`
    Integer = 3,
    /// `0b1010`
    BinaryInteger = 4,
    /// `0o17`
    OctalInteger = 5,
    /// `0d99`
    DecimalInteger = 6,
    /// `0xFF`
    HexInteger = 7,
    /// `1.5`, `2e10`, `1.0h`
    Float = 8,
    /// `0x1.8p3`
    HexFloat = 9,
    /// A single punctuation character.
    Symbol = 10,
    /// A directive line starting with `#` at column 0.
    Preprocessor = 11,
    /// `// ...` up to the end of the line.
    Comment = 12,
    /// `/* ... */`
    MultilineComment = 13,
}

impl TokenClass {
    /// Every class, in declaration order.
    pub const ALL: [Self; 14] = [
        Self::Unknown,
        Self::Identifier,
        Self::String,
        Self::Integer,
        Self::BinaryInteger,
        Self::OctalInteger,
        Self::DecimalInteger,
        Self::HexInteger,
        Self::Float,
        Self::HexFloat,
        Self::Symbol,
        Self::Preprocessor,
        Self::Comment,
        Self::MultilineComment,
    ];

    /// Returns `true` for every integer radix class.
    #[must_use]
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::BinaryInteger
                | Self::OctalInteger
                | Self::DecimalInteger
                | Self::HexInteger
        )
    }

    /// Returns `true` for `Float` and `HexFloat`.
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::HexFloat)
    }

    /// Returns `true` for both comment classes.
    #[must_use]
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::Comment | Self::MultilineComment)
    }

    /// Human readable name, used by `filc tokens`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Identifier => "Identifier",
            Self::String => "String",
            Self::Integer => "Integer",
            Self::BinaryInteger => "BinaryInteger",
            Self::OctalInteger => "OctalInteger",
            Self::DecimalInteger => "DecimalInteger",
            Self::HexInteger => "HexInteger",
            Self::Float => "Float",
            Self::HexFloat => "HexFloat",
            Self::Symbol => "Symbol",
            Self::Preprocessor => "Preprocessor",
            Self::Comment => "Comment",
            Self::MultilineComment => "MultilineComment",
        }
    }
}

impl fmt::Display for TokenClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of token classes, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ClassSet(u16);

impl ClassSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// Every class.
    pub const ALL: Self = Self((1 << TokenClass::ALL.len()) - 1);

    /// Every class except the two comment classes.
    pub const WITHOUT_COMMENTS: Self = Self::ALL
        .without(TokenClass::Comment)
        .without(TokenClass::MultilineComment);

    /// Returns this set with `class` added.
    #[must_use]
    pub const fn with(self, class: TokenClass) -> Self {
        Self(self.0 | (1 << class as u8))
    }

    /// Returns this set with `class` removed.
    #[must_use]
    pub const fn without(self, class: TokenClass) -> Self {
        Self(self.0 & !(1 << class as u8))
    }

    /// Returns `true` if `class` is a member.
    #[must_use]
    pub const fn contains(self, class: TokenClass) -> bool {
        self.0 & (1 << class as u8) != 0
    }
}

impl FromIterator<TokenClass> for ClassSet {
    fn from_iter<I: IntoIterator<Item = TokenClass>>(iter: I) -> Self {
        iter.into_iter().fold(Self::EMPTY, Self::with)
    }
}

/// A token with its class, location and text.
///
/// Tokens are never mutated after creation; stages that need a different
/// token build a new one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    /// What kind of text this is.
    pub class: TokenClass,
    /// Where the text lives.
    pub span: SourceSpan,
    /// The covered source text.
    pub text: EcoString,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(class: TokenClass, span: SourceSpan, text: impl Into<EcoString>) -> Self {
        Self {
            class,
            span,
            text: text.into(),
        }
    }

    /// Returns `true` if this is an identifier spelled `word`.
    #[must_use]
    pub fn is_word(&self, word: &str) -> bool {
        self.class == TokenClass::Identifier && self.text == word
    }

    /// Returns `true` if this is the single-character symbol `symbol`.
    #[must_use]
    pub fn is_symbol(&self, symbol: char) -> bool {
        self.class == TokenClass::Symbol && self.text.chars().eq(std::iter::once(symbol))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} {} {:?}",
            self.span.start.line + 1,
            self.span.start.column + 1,
            self.class,
            self.text.as_str()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::{FileId, SourcePoint};

    fn span() -> SourceSpan {
        SourceSpan::at(SourcePoint::file_start(FileId(0)))
    }

    #[test]
    fn class_set_membership() {
        let set = ClassSet::EMPTY
            .with(TokenClass::Identifier)
            .with(TokenClass::Symbol);
        assert!(set.contains(TokenClass::Identifier));
        assert!(set.contains(TokenClass::Symbol));
        assert!(!set.contains(TokenClass::String));
        assert!(!set.without(TokenClass::Symbol).contains(TokenClass::Symbol));
    }

    #[test]
    fn default_set_excludes_comments() {
        for class in TokenClass::ALL {
            assert_eq!(
                ClassSet::WITHOUT_COMMENTS.contains(class),
                !class.is_comment(),
                "{class}"
            );
            assert!(ClassSet::ALL.contains(class));
        }
    }

    #[test]
    fn class_set_from_iter() {
        let set: ClassSet = [TokenClass::Comment, TokenClass::Float].into_iter().collect();
        assert!(set.contains(TokenClass::Comment));
        assert!(set.contains(TokenClass::Float));
        assert!(!set.contains(TokenClass::Integer));
    }

    #[test]
    fn token_predicates() {
        let ident = Token::new(TokenClass::Identifier, span(), "return");
        assert!(ident.is_word("return"));
        assert!(!ident.is_word("retur"));
        assert!(!ident.is_symbol('r'));

        let semi = Token::new(TokenClass::Symbol, span(), ";");
        assert!(semi.is_symbol(';'));
        assert!(!semi.is_symbol(','));
    }

    #[test]
    fn class_predicates() {
        assert!(TokenClass::HexInteger.is_integer());
        assert!(TokenClass::DecimalInteger.is_integer());
        assert!(!TokenClass::Float.is_integer());
        assert!(TokenClass::HexFloat.is_float());
        assert!(TokenClass::MultilineComment.is_comment());
    }

    #[test]
    fn token_display_is_one_based() {
        let token = Token::new(TokenClass::String, span(), "abc");
        assert_eq!(token.to_string(), "1:1 String \"abc\"");
    }
}
