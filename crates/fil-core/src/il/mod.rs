// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The FIL intermediate language.
//!
//! A FIL binary is the hand-off point between semantic analysis and code
//! generation. It holds entrypoints and functions whose names live in a
//! shared string table and whose bodies live in a shared word array:
//!
//! ```
//! use fil_core::il::{BuiltinType, EntrypointKind, IlBinary, call_body, decode, encode};
//!
//! let mut il = IlBinary::new();
//! let helper = il.add_function("helper", BuiltinType::Void.id(), Vec::new(), &call_body(&[]));
//! il.add_entrypoint(EntrypointKind::Fragment, "main", Vec::new(), Vec::new(), &call_body(&[helper]));
//!
//! assert_eq!(il.validate(), Ok(()));
//! assert_eq!(decode(&encode(&il)), il);
//! ```
//!
//! [`decode`] never fails: unreadable input decodes to an empty binary.
//! Use [`try_decode`] (or [`IlReadMode::Strict`]) to see why.

mod codec;
mod error;
mod instruction;
mod model;
mod validate;
mod version;


pub use codec::{IlReadMode, MAGIC, decode, decode_with, encode, try_decode};
pub use error::IlError;
pub use instruction::{IlOpcode, Instruction, Instructions, instructions, push_instruction};
pub use model::{
    BUILTIN_TYPE_COUNT, BuiltinType, CodeRange, Entrypoint, EntrypointKind, Function, IlBinary,
    Parameter, ParameterQualifier, StringRange, Type, TypeId, call_body,
};
pub use version::Version;
