// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Errors raised by strict decoding and validation of FIL binaries.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

use super::Version;

/// A structural problem in a FIL binary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum IlError {
    #[error("not a FIL binary (magic {found:#010x})")]
    #[diagnostic(code(fil::il::bad_magic))]
    BadMagic { found: u32 },

    #[error("unsupported FIL version {version}")]
    #[diagnostic(
        code(fil::il::unsupported_version),
        help("this reader understands major version 1")
    )]
    UnsupportedVersion { version: Version },

    #[error("unexpected end of input at byte {offset}")]
    #[diagnostic(code(fil::il::truncated))]
    Truncated { offset: usize },

    #[error("{count} unexpected bytes after the end of the binary")]
    #[diagnostic(code(fil::il::trailing_bytes))]
    TrailingBytes { count: usize },

    #[error("invalid entrypoint kind {value}")]
    #[diagnostic(code(fil::il::entrypoint_kind))]
    InvalidEntrypointKind { value: u32 },

    #[error("invalid parameter qualifier {value}")]
    #[diagnostic(code(fil::il::qualifier))]
    InvalidQualifier { value: u32 },

    #[error("the reserved types array has {count} entries")]
    #[diagnostic(code(fil::il::reserved_types))]
    ReservedTypes { count: u64 },

    #[error("name range {offset}+{length} is outside the {size}-byte string table")]
    #[diagnostic(code(fil::il::string_range))]
    StringRange { offset: u64, length: u64, size: usize },

    #[error("name at {offset}+{length} is not valid UTF-8")]
    #[diagnostic(code(fil::il::name_encoding))]
    InvalidName { offset: u64, length: u64 },

    #[error("code range {offset}+{length} is outside the {size}-word code array")]
    #[diagnostic(code(fil::il::code_range))]
    CodeRange { offset: u64, length: u64, size: usize },

    #[error("type {type_id} is not defined")]
    #[diagnostic(code(fil::il::unresolved_type))]
    UnresolvedType { type_id: u64 },

    #[error("call to function {index}, but only {count} are defined")]
    #[diagnostic(code(fil::il::call_target))]
    InvalidCallTarget { index: u32, count: usize },

    #[error("unknown opcode {opcode} at word {offset}")]
    #[diagnostic(code(fil::il::unknown_opcode))]
    UnknownOpcode { opcode: u16, offset: usize },

    #[error("malformed instruction at word {offset}")]
    #[diagnostic(code(fil::il::malformed_instruction))]
    MalformedInstruction { offset: usize },
}
