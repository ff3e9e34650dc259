// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Word-stream accumulation of SPIR-V instructions.

use tracing::{debug, warn};

use super::{Op, Operand, Requirements};

/// A flat sequence of instructions plus everything they require.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeBuffer {
    words: Vec<u32>,
    requirements: Requirements,
}

impl CodeBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one instruction.
    ///
    /// The header word is `(word_count << 16) | opcode`, followed by the
    /// operands in order. An instruction with a null required ID, or one too
    /// long to encode, is skipped and leaves the buffer untouched; the return
    /// value says whether it was written.
    pub fn push(&mut self, op: Op, operands: &[Operand<'_>]) -> bool {
        if let Some(index) = operands.iter().position(Operand::has_null_id) {
            debug!(?op, index, "skipping instruction with a null id");
            return false;
        }
        let word_count = 1 + operands.iter().map(Operand::word_count).sum::<usize>();
        let Ok(word_count) = u16::try_from(word_count) else {
            warn!(?op, word_count, "skipping instruction longer than 65535 words");
            return false;
        };

        self.words.push((u32::from(word_count) << 16) | op.value());
        for operand in operands {
            operand.write(&mut self.words);
        }

        self.requirements.require_any(op.capabilities());
        self.requirements.add_extensions(op.extensions());
        for operand in operands {
            if let Operand::Enum(enumerant) = operand {
                self.requirements.require_any(enumerant.capabilities);
                self.requirements.add_extensions(enumerant.extensions);
            }
        }
        true
    }

    /// Appends the contents of `other`.
    pub fn append(&mut self, other: &CodeBuffer) {
        self.words.extend_from_slice(&other.words);
        self.requirements.merge(&other.requirements);
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }

    pub fn requirements(&self) -> &Requirements {
        &self.requirements
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn into_parts(self) -> (Vec<u32>, Requirements) {
        (self.words, self.requirements)
    }
}
