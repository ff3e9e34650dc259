// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! SPIR-V emission.
//!
//! Instructions are pushed into [`CodeBuffer`]s, which record the
//! capabilities and extensions each instruction requires as it goes. A
//! [`Module`] keeps one buffer per layout section and derives the capability
//! and extension declarations when it is assembled, so the declared set is
//! always exactly what the emitted code needs, minimised by capability
//! implication.
//!
//! [`transpile`] drives all of this from a FIL binary.

/// Declares a SPIR-V enumeration whose variants carry a value, the
/// capabilities of which any one enables the variant, and the extensions the
/// variant needs:
///
/// ```text
/// Variant = 4: [Shader, Kernel] ext ["SPV_KHR_example"],
/// ```
macro_rules! spirv_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $variant:ident = $value:literal
                $(: [$($cap:ident),* $(,)?])?
                $(ext [$($ext:literal),* $(,)?])?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant,)*];

            /// The operand word.
            #[must_use]
            pub const fn value(self) -> u32 {
                match self {
                    $(Self::$variant => $value,)*
                }
            }

            #[must_use]
            pub fn from_value(value: u32) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.value() == value)
            }

            /// Capabilities of which any one enables `self`.
            #[must_use]
            pub const fn capabilities(self) -> &'static [$crate::spirv::Capability] {
                match self {
                    $(Self::$variant => &[$($($crate::spirv::Capability::$cap),*)?],)*
                }
            }

            /// Extensions `self` needs.
            #[must_use]
            pub const fn extensions(self) -> &'static [&'static str] {
                match self {
                    $(Self::$variant => &[$($($ext),*)?],)*
                }
            }
        }
    };
}

mod capability;
mod code_buffer;
mod module;
mod opcode;
mod operands;
mod transpiler;

pub use capability::{Capability, CapabilitySet, Requirements};
pub use code_buffer::CodeBuffer;
pub use module::{IdAllocator, Module, SPIRV_MAGIC};
pub use opcode::Op;
pub use operands::{
    AddressingModel, BuiltIn, Decoration, EnumOperand, Enumerant, ExecutionMode, ExecutionModel,
    FunctionControl, Id, MemoryModel, Operand, StorageClass, push_string,
};
pub use transpiler::{TranspileOptions, transpile};
