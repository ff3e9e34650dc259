// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! IL instruction words.
//!
//! Instructions share SPIR-V's shape: a header word `(word_count << 16) |
//! opcode` followed by `word_count - 1` operand words.

use super::IlError;

/// IL opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum IlOpcode {
    Nop = 0,
    Return = 1,
    /// Ends the invocation without output (fragment stages).
    Discard = 2,
    /// Operand: index into [`IlBinary::functions`](super::IlBinary::functions).
    Call = 3,
}

impl IlOpcode {
    pub const ALL: [Self; 4] = [Self::Nop, Self::Return, Self::Discard, Self::Call];

    #[must_use]
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|op| *op as u16 == value)
    }

    /// Number of operand words the opcode takes.
    #[must_use]
    pub const fn operand_count(self) -> usize {
        match self {
            Self::Nop | Self::Return | Self::Discard => 0,
            Self::Call => 1,
        }
    }
}

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Position of the header word within the decoded slice.
    pub offset: usize,
    pub opcode: IlOpcode,
    pub operands: &'a [u32],
}

/// Appends one instruction to `code`.
pub fn push_instruction(code: &mut Vec<u32>, opcode: IlOpcode, operands: &[u32]) {
    let word_count = u32::try_from(operands.len() + 1).unwrap_or(u32::MAX) & 0xffff;
    code.push((word_count << 16) | opcode as u32);
    code.extend_from_slice(operands);
}

/// Iterates over the instructions in `code`.
///
/// Yields an error and stops at the first malformed instruction.
#[must_use]
pub fn instructions(code: &[u32]) -> Instructions<'_> {
    Instructions {
        code,
        offset: 0,
        failed: false,
    }
}

/// Iterator returned by [`instructions`].
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    code: &'a [u32],
    offset: usize,
    failed: bool,
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Result<Instruction<'a>, IlError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let header = *self.code.get(self.offset)?;
        let offset = self.offset;
        let word_count = (header >> 16) as usize;
        #[expect(clippy::cast_possible_truncation, reason = "masked to 16 bits")]
        let raw_opcode = (header & 0xffff) as u16;

        let Some(opcode) = IlOpcode::from_u16(raw_opcode) else {
            self.failed = true;
            return Some(Err(IlError::UnknownOpcode {
                opcode: raw_opcode,
                offset,
            }));
        };
        let operands = self.code.get(offset + 1..offset + word_count.max(1));
        match operands {
            Some(operands) if word_count > 0 && operands.len() == opcode.operand_count() => {
                self.offset += word_count;
                Some(Ok(Instruction {
                    offset,
                    opcode,
                    operands,
                }))
            }
            _ => {
                self.failed = true;
                Some(Err(IlError::MalformedInstruction { offset }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_layout() {
        let mut code = Vec::new();
        push_instruction(&mut code, IlOpcode::Call, &[7]);
        assert_eq!(code, [(2 << 16) | 3, 7]);
    }

    #[test]
    fn decode_sequence() {
        let mut code = Vec::new();
        push_instruction(&mut code, IlOpcode::Nop, &[]);
        push_instruction(&mut code, IlOpcode::Call, &[1]);
        push_instruction(&mut code, IlOpcode::Return, &[]);
        let decoded: Vec<_> = instructions(&code)
            .map(|i| i.map(|i| (i.offset, i.opcode, i.operands.to_vec())))
            .collect::<Result<_, _>>()
            .unwrap_or_default();
        assert_eq!(
            decoded,
            [
                (0, IlOpcode::Nop, vec![]),
                (1, IlOpcode::Call, vec![1]),
                (3, IlOpcode::Return, vec![]),
            ]
        );
    }

    #[test]
    fn zero_word_count_is_malformed() {
        let results: Vec<_> = instructions(&[1]).collect();
        assert_eq!(results, [Err(IlError::MalformedInstruction { offset: 0 })]);
    }

    #[test]
    fn truncated_operands_are_malformed() {
        let results: Vec<_> = instructions(&[(2 << 16) | 3]).collect();
        assert_eq!(results, [Err(IlError::MalformedInstruction { offset: 0 })]);
    }

    #[test]
    fn wrong_operand_count_is_malformed() {
        let results: Vec<_> = instructions(&[(2 << 16) | 1, 0]).collect();
        assert_eq!(results, [Err(IlError::MalformedInstruction { offset: 0 })]);
    }

    #[test]
    fn unknown_opcode_stops_iteration() {
        let results: Vec<_> = instructions(&[(1 << 16) | 99, (1 << 16) | 1]).collect();
        assert_eq!(
            results,
            [Err(IlError::UnknownOpcode {
                opcode: 99,
                offset: 0
            })]
        );
    }
}
