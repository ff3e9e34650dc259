// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Byte classification for the tokenizer.
//!
//! Every byte maps to exactly one [`CharClass`] through a table compiled into
//! the binary. Bytes outside 7-bit ASCII are [`CharClass::Unknown`]; consumers
//! that care about codepoints (column alignment in diagnostics) decode UTF-8
//! themselves.

/// The coarse class of a source byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharClass {
    /// Control characters and every non-ASCII byte.
    Unknown,
    /// Space, tab, carriage return, vertical tab, form feed.
    Whitespace,
    /// Line feed.
    Newline,
    /// ASCII letters and `_`.
    NonDigit,
    /// `0`-`9`.
    Digit,
    /// Printable ASCII punctuation.
    Symbol,
}

pub(super) const fn class_of(byte: u8) -> CharClass {
    match byte {
        b' ' | b'\t' | b'\r' | 0x0b | 0x0c => CharClass::Whitespace,
        b'\n' => CharClass::Newline,
        b'a'..=b'z' | b'A'..=b'Z' | b'_' => CharClass::NonDigit,
        b'0'..=b'9' => CharClass::Digit,
        b'!'..=b'/' | b':'..=b'@' | b'['..=b'`' | b'{'..=b'~' => CharClass::Symbol,
        _ => CharClass::Unknown,
    }
}

const fn build_table() -> [CharClass; 128] {
    let mut table = [CharClass::Unknown; 128];
    let mut byte = 0;
    while byte < 128 {
        #[expect(clippy::cast_possible_truncation, reason = "byte < 128")]
        {
            table[byte] = class_of(byte as u8);
        }
        byte += 1;
    }
    table
}

static CHAR_CLASSES: [CharClass; 128] = build_table();

/// Returns the class of `byte`.
///
/// ```
/// use fil_core::source_analysis::{CharClass, classify};
///
/// assert_eq!(classify(b'x'), CharClass::NonDigit);
/// assert_eq!(classify(b'7'), CharClass::Digit);
/// assert_eq!(classify(0xC3), CharClass::Unknown);
/// ```
#[must_use]
pub fn classify(byte: u8) -> CharClass {
    CHAR_CLASSES
        .get(usize::from(byte))
        .copied()
        .unwrap_or(CharClass::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_covers_every_byte() {
        for byte in 0..=u8::MAX {
            let class = classify(byte);
            if byte >= 0x80 {
                assert_eq!(class, CharClass::Unknown, "byte {byte:#x}");
            }
        }
    }

    #[test]
    fn classify_ascii_groups() {
        assert_eq!(classify(b' '), CharClass::Whitespace);
        assert_eq!(classify(b'\t'), CharClass::Whitespace);
        assert_eq!(classify(b'\r'), CharClass::Whitespace);
        assert_eq!(classify(b'\n'), CharClass::Newline);
        assert_eq!(classify(b'_'), CharClass::NonDigit);
        assert_eq!(classify(b'Z'), CharClass::NonDigit);
        assert_eq!(classify(b'0'), CharClass::Digit);
        assert_eq!(classify(b'9'), CharClass::Digit);
        for symbol in b"!\"#$%&'()*+,-./:;<=>?@[\\]^`{|}~" {
            assert_eq!(classify(*symbol), CharClass::Symbol, "{}", *symbol as char);
        }
        assert_eq!(classify(0x00), CharClass::Unknown);
        assert_eq!(classify(0x7f), CharClass::Unknown);
    }
}
