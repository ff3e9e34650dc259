// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Module layout and final assembly.

use tracing::instrument;

use super::{AddressingModel, CodeBuffer, Id, MemoryModel, Op, Operand, Requirements};

/// First word of every SPIR-V module.
pub const SPIRV_MAGIC: u32 = 0x0723_0203;

/// Hands out result IDs, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    /// Returns a fresh ID.
    pub fn next_id(&mut self) -> Id {
        let id = Id(self.next);
        self.next += 1;
        id
    }

    /// One past the largest ID handed out.
    pub fn bound(&self) -> u32 {
        self.next
    }
}

/// A module under construction, split into the sections of the logical
/// layout. Capabilities, extensions and the memory model are derived when
/// the module is assembled.
#[derive(Debug, Clone, Default)]
pub struct Module {
    pub ids: IdAllocator,
    /// `(major, minor)` written into the header.
    pub version: (u8, u8),
    pub entry_points: CodeBuffer,
    pub execution_modes: CodeBuffer,
    /// Debug names.
    pub debug: CodeBuffer,
    pub annotations: CodeBuffer,
    /// Types, constants and global variables.
    pub globals: CodeBuffer,
    pub functions: CodeBuffer,
}

impl Module {
    #[must_use]
    pub fn new(version: (u8, u8)) -> Self {
        Self {
            version,
            ..Self::default()
        }
    }

    pub fn next_id(&mut self) -> Id {
        self.ids.next_id()
    }

    fn sections(&self) -> [&CodeBuffer; 6] {
        [
            &self.entry_points,
            &self.execution_modes,
            &self.debug,
            &self.annotations,
            &self.globals,
            &self.functions,
        ]
    }

    fn memory_model() -> CodeBuffer {
        let mut buffer = CodeBuffer::new();
        buffer.push(
            Op::MemoryModel,
            &[
                Operand::enumerant(AddressingModel::Logical),
                Operand::enumerant(MemoryModel::GLSL450),
            ],
        );
        buffer
    }

    /// Everything the module requires, including its memory model.
    #[must_use]
    pub fn requirements(&self) -> Requirements {
        let mut requirements = Self::memory_model().requirements().clone();
        for section in self.sections() {
            requirements.merge(section.requirements());
        }
        requirements
    }

    /// Produces the module binary: header, capabilities in value order,
    /// extensions in name order, memory model, then the sections.
    #[must_use]
    #[instrument(skip_all, fields(bound = self.ids.bound()))]
    pub fn assemble(&self) -> Vec<u32> {
        let (major, minor) = self.version;
        let requirements = self.requirements();

        let mut preamble = CodeBuffer::new();
        for capability in requirements.capabilities.iter() {
            preamble.push(Op::Capability, &[Operand::Capability(capability)]);
        }
        for extension in &requirements.extensions {
            preamble.push(Op::Extension, &[Operand::String(extension.as_str())]);
        }
        preamble.append(&Self::memory_model());

        let mut words = vec![
            SPIRV_MAGIC,
            (u32::from(major) << 16) | (u32::from(minor) << 8),
            0,
            self.ids.bound(),
            0,
        ];
        words.extend_from_slice(preamble.words());
        for section in self.sections() {
            words.extend_from_slice(section.words());
        }
        words
    }
}
