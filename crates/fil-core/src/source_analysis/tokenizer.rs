// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Table-driven tokenizer.
//!
//! The tokenizer is a finite automaton. Each step looks up a transition entry
//! indexed by a packed state word `(state << 5) | input`, where `state` is
//! the token currently being scanned and `input` is a refined class of the
//! upcoming byte. The entry says:
//!
//! - which state to assume next (bits 0-4),
//! - whether to step past the byte (bit 5, [`STEP`]),
//! - whether the pending token ended before this byte (bit 6, [`END`]).
//!
//! Ending a token flushes the bytes scanned since the previous boundary. If
//! nothing was scanned, or the state has no token class (whitespace, string
//! quotes), nothing is emitted. Each byte is therefore inspected at most twice
//! and tokenization is linear in the input no matter which classes occur.
//!
//! # Example
//!
//! ```
//! use fil_core::source_analysis::{
//!     FileId, SourcePoint, TokenClass, TokenizerOptions, tokenize,
//! };
//!
//! let tokens = tokenize(
//!     "x = 0x1F;",
//!     SourcePoint::file_start(FileId(0)),
//!     TokenizerOptions::default(),
//! );
//! let classes: Vec<_> = tokens.iter().map(|t| t.class).collect();
//! assert_eq!(
//!     classes,
//!     [
//!         TokenClass::Identifier,
//!         TokenClass::Symbol,
//!         TokenClass::HexInteger,
//!         TokenClass::Symbol,
//!     ]
//! );
//! ```

use tracing::{instrument, trace};

use super::char_class::{CharClass, class_of};
use super::{ClassSet, SourcePoint, SourceSpan, Token, TokenClass};

/// Options controlling which tokens are produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Emit `Comment` and `MultilineComment` tokens.
    pub include_comments: bool,
}

impl TokenizerOptions {
    /// Returns the set of token classes these options let through.
    #[must_use]
    pub const fn included_classes(self) -> ClassSet {
        if self.include_comments {
            ClassSet::ALL
        } else {
            ClassSet::WITHOUT_COMMENTS
        }
    }
}

// ============================================================================
// Input alphabet
// ============================================================================

/// Refinement of [`CharClass`] that the transition table is indexed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum Input {
    Unknown,
    Whitespace,
    Newline,
    /// Letters with no special meaning inside numbers, and `_`.
    Letter,
    Digit,
    /// `a c A B C`
    HexLetter,
    /// `b`: hex digit and binary prefix.
    LowerB,
    /// `d`: hex digit, decimal prefix and float suffix.
    LowerD,
    /// `D f F`: hex digit and float suffix.
    HexSuffix,
    /// `e E`: hex digit and float exponent.
    Exponent,
    /// `h H`: float suffix.
    Half,
    /// `o`: octal prefix.
    LowerO,
    /// `x`: hex prefix.
    LowerX,
    /// `p P`: hex float exponent.
    HexExponent,
    Dot,
    Quote,
    Backslash,
    Hash,
    Slash,
    Star,
    Symbol,
}

const fn input_of(byte: u8) -> Input {
    match class_of(byte) {
        CharClass::Unknown => Input::Unknown,
        CharClass::Whitespace => Input::Whitespace,
        CharClass::Newline => Input::Newline,
        CharClass::Digit => Input::Digit,
        CharClass::NonDigit => match byte {
            b'a' | b'c' | b'A' | b'B' | b'C' => Input::HexLetter,
            b'b' => Input::LowerB,
            b'd' => Input::LowerD,
            b'D' | b'f' | b'F' => Input::HexSuffix,
            b'e' | b'E' => Input::Exponent,
            b'h' | b'H' => Input::Half,
            b'o' => Input::LowerO,
            b'x' => Input::LowerX,
            b'p' | b'P' => Input::HexExponent,
            _ => Input::Letter,
        },
        CharClass::Symbol => match byte {
            b'.' => Input::Dot,
            b'"' => Input::Quote,
            b'\\' => Input::Backslash,
            b'#' => Input::Hash,
            b'/' => Input::Slash,
            b'*' => Input::Star,
            _ => Input::Symbol,
        },
    }
}

const fn build_inputs() -> [Input; 256] {
    let mut inputs = [Input::Unknown; 256];
    let mut byte = 0;
    while byte < 256 {
        #[expect(clippy::cast_possible_truncation, reason = "byte < 256")]
        {
            inputs[byte] = input_of(byte as u8);
        }
        byte += 1;
    }
    inputs
}

static INPUTS: [Input; 256] = build_inputs();

const fn is_letter(input: Input) -> bool {
    matches!(
        input,
        Input::Letter
            | Input::HexLetter
            | Input::LowerB
            | Input::LowerD
            | Input::HexSuffix
            | Input::Exponent
            | Input::Half
            | Input::LowerO
            | Input::LowerX
            | Input::HexExponent
    )
}

const fn is_hex_digit(input: Input) -> bool {
    matches!(
        input,
        Input::Digit
            | Input::HexLetter
            | Input::LowerB
            | Input::LowerD
            | Input::HexSuffix
            | Input::Exponent
    )
}

// ============================================================================
// States
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum State {
    Blank,
    /// Like `Blank`, but at column 0 where `#` opens a directive.
    LineStart,
    Unknown,
    Identifier,
    /// A single digit, which may still become a radix prefix.
    IntegerStart,
    Integer,
    BinaryInteger,
    OctalInteger,
    DecimalInteger,
    HexInteger,
    Float,
    HexFloat,
    /// Just past an opening quote.
    StringOpen,
    String,
    StringEscape,
    /// Sitting on a closing quote.
    StringClose,
    Preprocessor,
    Symbol,
    Slash,
    LineComment,
    BlockComment,
    BlockCommentStar,
    /// Just past the `*/` of a block comment.
    BlockCommentEnd,
}

const STATE_COUNT: usize = 23;

impl State {
    const fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::LineStart,
            2 => Self::Unknown,
            3 => Self::Identifier,
            4 => Self::IntegerStart,
            5 => Self::Integer,
            6 => Self::BinaryInteger,
            7 => Self::OctalInteger,
            8 => Self::DecimalInteger,
            9 => Self::HexInteger,
            10 => Self::Float,
            11 => Self::HexFloat,
            12 => Self::StringOpen,
            13 => Self::String,
            14 => Self::StringEscape,
            15 => Self::StringClose,
            16 => Self::Preprocessor,
            17 => Self::Symbol,
            18 => Self::Slash,
            19 => Self::LineComment,
            20 => Self::BlockComment,
            21 => Self::BlockCommentStar,
            22 => Self::BlockCommentEnd,
            _ => Self::Blank,
        }
    }

    /// The class of the token this state accumulates, if any.
    const fn class(self) -> Option<TokenClass> {
        Some(match self {
            Self::Blank | Self::LineStart | Self::StringOpen | Self::StringClose => return None,
            Self::Unknown => TokenClass::Unknown,
            Self::Identifier => TokenClass::Identifier,
            Self::IntegerStart | Self::Integer => TokenClass::Integer,
            Self::BinaryInteger => TokenClass::BinaryInteger,
            Self::OctalInteger => TokenClass::OctalInteger,
            Self::DecimalInteger => TokenClass::DecimalInteger,
            Self::HexInteger => TokenClass::HexInteger,
            Self::Float => TokenClass::Float,
            Self::HexFloat => TokenClass::HexFloat,
            Self::String | Self::StringEscape => TokenClass::String,
            Self::Preprocessor => TokenClass::Preprocessor,
            Self::Symbol | Self::Slash => TokenClass::Symbol,
            Self::LineComment => TokenClass::Comment,
            Self::BlockComment | Self::BlockCommentStar | Self::BlockCommentEnd => {
                TokenClass::MultilineComment
            }
        })
    }
}

// ============================================================================
// Transition table
// ============================================================================

const INPUT_BITS: u32 = 5;
const NEXT_MASK: u8 = 0x1f;
/// Step past the current byte.
const STEP: u8 = 1 << 5;
/// The pending token ends before the current byte.
const END: u8 = 1 << 6;

const fn state_word(state: State, input: Input) -> usize {
    ((state as usize) << INPUT_BITS) | input as usize
}

const fn stay(next: State) -> u8 {
    STEP | next as u8
}

/// Entry for a byte that starts a new token.
const fn start(input: Input, at_line_start: bool) -> u8 {
    let next = match input {
        Input::Unknown => State::Unknown,
        Input::Whitespace => State::Blank,
        Input::Newline => State::LineStart,
        Input::Digit => State::IntegerStart,
        Input::Quote => State::StringOpen,
        Input::Slash => State::Slash,
        Input::Hash if at_line_start => State::Preprocessor,
        Input::Dot | Input::Backslash | Input::Hash | Input::Star | Input::Symbol => {
            State::Symbol
        }
        _ => State::Identifier,
    };
    END | STEP | next as u8
}

const fn entry(state: State, input: Input) -> u8 {
    match state {
        State::Blank | State::Symbol | State::BlockCommentEnd => start(input, false),
        State::LineStart => start(input, true),
        State::Unknown => match input {
            Input::Unknown => stay(State::Unknown),
            _ => start(input, false),
        },
        State::Identifier => {
            if is_letter(input) || matches!(input, Input::Digit) {
                stay(State::Identifier)
            } else {
                start(input, false)
            }
        }
        State::IntegerStart => match input {
            Input::Digit => stay(State::Integer),
            Input::LowerB => stay(State::BinaryInteger),
            Input::LowerO => stay(State::OctalInteger),
            Input::LowerD => stay(State::DecimalInteger),
            Input::LowerX => stay(State::HexInteger),
            Input::Dot | Input::Exponent => stay(State::Float),
            _ => start(input, false),
        },
        State::Integer => match input {
            Input::Digit => stay(State::Integer),
            Input::Dot | Input::Exponent => stay(State::Float),
            _ => start(input, false),
        },
        State::BinaryInteger | State::OctalInteger | State::DecimalInteger => match input {
            Input::Digit => stay(state),
            _ => start(input, false),
        },
        State::HexInteger => match input {
            Input::Dot | Input::HexExponent => stay(State::HexFloat),
            _ if is_hex_digit(input) => stay(State::HexInteger),
            _ => start(input, false),
        },
        State::Float => match input {
            Input::Digit | Input::Exponent | Input::Half | Input::LowerD | Input::HexSuffix => {
                stay(State::Float)
            }
            _ => start(input, false),
        },
        State::HexFloat => match input {
            Input::Half | Input::HexExponent => stay(State::HexFloat),
            _ if is_hex_digit(input) => stay(State::HexFloat),
            _ => start(input, false),
        },
        // The opening quote is flushed as a classless token so the string's
        // text starts after it.
        State::StringOpen => match input {
            Input::Quote => END | STEP | State::Blank as u8,
            Input::Backslash => END | STEP | State::StringEscape as u8,
            _ => END | STEP | State::String as u8,
        },
        State::String => match input {
            Input::Quote => END | State::StringClose as u8,
            Input::Backslash => stay(State::StringEscape),
            _ => stay(State::String),
        },
        State::StringEscape => stay(State::String),
        State::StringClose => match input {
            Input::Quote => stay(State::Blank),
            _ => start(input, false),
        },
        State::Preprocessor => match input {
            Input::Newline => END | STEP | State::LineStart as u8,
            _ => stay(State::Preprocessor),
        },
        State::Slash => match input {
            Input::Slash => stay(State::LineComment),
            Input::Star => stay(State::BlockComment),
            _ => start(input, false),
        },
        State::LineComment => match input {
            Input::Newline => END | STEP | State::LineStart as u8,
            _ => stay(State::LineComment),
        },
        State::BlockComment => match input {
            Input::Star => stay(State::BlockCommentStar),
            _ => stay(State::BlockComment),
        },
        State::BlockCommentStar => match input {
            Input::Slash => stay(State::BlockCommentEnd),
            Input::Star => stay(State::BlockCommentStar),
            _ => stay(State::BlockComment),
        },
    }
}

const INPUT_COUNT: usize = 21;
const TABLE_SIZE: usize = 1 << (2 * INPUT_BITS);

const fn build_transitions() -> [u8; TABLE_SIZE] {
    // Unreachable slots still make progress.
    let mut table = [END | STEP | State::Blank as u8; TABLE_SIZE];
    let mut state = 0;
    while state < STATE_COUNT {
        let mut input = 0;
        while input < INPUT_COUNT {
            #[expect(clippy::cast_possible_truncation, reason = "both indices are below 32")]
            let (from, byte_class) = (State::from_bits(state as u8), INPUTS_BY_INDEX[input]);
            table[state_word(from, byte_class)] = entry(from, byte_class);
            input += 1;
        }
        state += 1;
    }
    table
}

const INPUTS_BY_INDEX: [Input; INPUT_COUNT] = [
    Input::Unknown,
    Input::Whitespace,
    Input::Newline,
    Input::Letter,
    Input::Digit,
    Input::HexLetter,
    Input::LowerB,
    Input::LowerD,
    Input::HexSuffix,
    Input::Exponent,
    Input::Half,
    Input::LowerO,
    Input::LowerX,
    Input::HexExponent,
    Input::Dot,
    Input::Quote,
    Input::Backslash,
    Input::Hash,
    Input::Slash,
    Input::Star,
    Input::Symbol,
];

static TRANSITIONS: [u8; TABLE_SIZE] = build_transitions();

/// One decoded transition table entry.
#[derive(Debug, Clone, Copy)]
struct Transition(u8);

impl Transition {
    fn lookup(state: State, input: Input) -> Self {
        Self(
            TRANSITIONS
                .get(state_word(state, input))
                .copied()
                .unwrap_or(END | STEP),
        )
    }

    const fn next(self) -> State {
        State::from_bits(self.0 & NEXT_MASK)
    }

    const fn steps(self) -> bool {
        self.0 & STEP != 0
    }

    const fn ends(self) -> bool {
        self.0 & END != 0
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

/// A lazy tokenizer over one source buffer.
///
/// Implements [`Iterator`]; use [`tokenize`] to collect everything at once.
#[derive(Debug, Clone)]
pub struct Tokenizer<'src> {
    source: &'src str,
    /// Byte offset into `source`.
    pos: usize,
    /// Location of the byte at `pos`.
    point: SourcePoint,
    /// Location of the last consumed byte.
    last_point: SourcePoint,
    token_start: usize,
    token_start_point: SourcePoint,
    state: State,
    included: ClassSet,
    finished: bool,
}

impl<'src> Tokenizer<'src> {
    /// Creates a tokenizer for `source`, whose first byte lies at `start`.
    ///
    /// A `#` only opens a directive at column 0, so a tokenizer started in the
    /// middle of a line treats a leading `#` as a symbol.
    #[must_use]
    pub fn new(source: &'src str, start: SourcePoint, options: TokenizerOptions) -> Self {
        Self {
            source,
            pos: 0,
            point: start,
            last_point: start,
            token_start: 0,
            token_start_point: start,
            state: if start.column == 0 {
                State::LineStart
            } else {
                State::Blank
            },
            included: options.included_classes(),
            finished: false,
        }
    }

    /// Closes the pending token at the current position.
    fn flush(&mut self) -> Option<Token> {
        let start = std::mem::replace(&mut self.token_start, self.pos);
        let start_point = std::mem::replace(&mut self.token_start_point, self.point);
        if start == self.pos {
            return None;
        }
        let class = self.state.class()?;
        if !self.included.contains(class) {
            return None;
        }
        // Boundaries always fall on ASCII bytes or the edges of an `Unknown`
        // run, so the slice is valid UTF-8.
        let text = self.source.get(start..self.pos).unwrap_or_default();
        Some(Token::new(
            class,
            SourceSpan::new(start_point, self.last_point),
            text,
        ))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        while let Some(&byte) = self.source.as_bytes().get(self.pos) {
            let input = INPUTS[usize::from(byte)];
            let transition = Transition::lookup(self.state, input);
            let token = if transition.ends() {
                self.flush()
            } else {
                None
            };
            self.state = transition.next();
            if transition.steps() {
                self.last_point = self.point;
                self.point = self.point.advance(byte);
                self.pos += 1;
            }
            if token.is_some() {
                return token;
            }
        }
        if self.finished {
            return None;
        }
        self.finished = true;
        self.flush()
    }
}

/// Tokenizes `source` eagerly.
#[instrument(skip_all, fields(file = start.file.0, len = source.len()))]
pub fn tokenize(source: &str, start: SourcePoint, options: TokenizerOptions) -> Vec<Token> {
    let tokens: Vec<Token> = Tokenizer::new(source, start, options).collect();
    trace!(count = tokens.len(), "tokenized");
    tokens
}
