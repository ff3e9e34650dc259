// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! In-memory model of a FIL binary.
//!
//! Names are not owned by the records that use them. Every name is a
//! [`StringRange`] into the shared [`IlBinary::strings`] blob and every body
//! is a [`CodeRange`] into [`IlBinary::code`], so the model maps one-to-one
//! onto the flat binary layout.

use std::fmt;

use super::instruction::{IlOpcode, push_instruction};

/// A byte range into [`IlBinary::strings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StringRange {
    pub offset: u64,
    pub length: u64,
}

/// A word range into [`IlBinary::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CodeRange {
    pub offset: u64,
    pub length: u64,
}

impl CodeRange {
    /// Returns the range as indices, if it fits in `usize`.
    #[must_use]
    pub fn to_range(self) -> Option<std::ops::Range<usize>> {
        let start = usize::try_from(self.offset).ok()?;
        let end = start.checked_add(usize::try_from(self.length).ok()?)?;
        Some(start..end)
    }
}

/// Shader stage of an entrypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum EntrypointKind {
    Vertex = 0,
    TessellationControl = 1,
    TessellationEvaluation = 2,
    Geometry = 3,
    Fragment = 4,
    Compute = 5,
}

impl EntrypointKind {
    pub const ALL: [Self; 6] = [
        Self::Vertex,
        Self::TessellationControl,
        Self::TessellationEvaluation,
        Self::Geometry,
        Self::Fragment,
        Self::Compute,
    ];

    /// Decodes a stored kind.
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| *kind as u32 == value)
    }
}

/// Direction qualifier of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ParameterQualifier {
    None = 0,
    In = 1,
    Out = 2,
    InOut = 3,
}

impl ParameterQualifier {
    pub const ALL: [Self; 4] = [Self::None, Self::In, Self::Out, Self::InOut];

    /// Decodes a stored qualifier.
    #[must_use]
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|q| *q as u32 == value)
    }
}

/// Types every FIL binary can refer to without declaring them.
///
/// Their [`TypeId`]s are `0..BUILTIN_TYPE_COUNT` in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinType {
    Void,
    Bool,
    Int,
    Uint,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
}

/// Number of builtin types.
pub const BUILTIN_TYPE_COUNT: u64 = 9;

impl BuiltinType {
    pub const ALL: [Self; BUILTIN_TYPE_COUNT as usize] = [
        Self::Void,
        Self::Bool,
        Self::Int,
        Self::Uint,
        Self::Float,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
        Self::Mat4,
    ];

    #[must_use]
    pub const fn id(self) -> TypeId {
        TypeId(self as u64)
    }

    /// Number of scalar components for vector types, `None` otherwise.
    #[must_use]
    pub const fn vector_size(self) -> Option<u32> {
        match self {
            Self::Vec2 => Some(2),
            Self::Vec3 => Some(3),
            Self::Vec4 => Some(4),
            _ => None,
        }
    }
}

/// Reference to a builtin type or to an entry of [`IlBinary::types`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TypeId(pub u64);

impl TypeId {
    /// Resolves a builtin type id.
    #[must_use]
    pub fn builtin(self) -> Option<BuiltinType> {
        usize::try_from(self.0)
            .ok()
            .and_then(|index| BuiltinType::ALL.get(index).copied())
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.builtin() {
            Some(builtin) => write!(f, "{builtin:?}"),
            None => write!(f, "type#{}", self.0),
        }
    }
}

/// A declared type.
///
/// The type table is reserved: no type records exist yet, so
/// [`IlBinary::types`] is always empty and every non-builtin [`TypeId`] is
/// unresolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {}

/// A function or entrypoint parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Parameter {
    pub qualifiers: Vec<ParameterQualifier>,
    pub type_id: TypeId,
}

impl Parameter {
    #[must_use]
    pub fn new(type_id: TypeId, qualifiers: impl Into<Vec<ParameterQualifier>>) -> Self {
        Self {
            qualifiers: qualifiers.into(),
            type_id,
        }
    }
}

/// A shader stage entry function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entrypoint {
    pub kind: EntrypointKind,
    pub code: CodeRange,
    pub name: StringRange,
    pub inputs: Vec<Parameter>,
    pub outputs: Vec<Parameter>,
}

/// A callable function.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Function {
    pub code: CodeRange,
    pub name: StringRange,
    pub return_type: TypeId,
    pub parameters: Vec<Parameter>,
}

/// A complete FIL binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct IlBinary {
    pub entrypoints: Vec<Entrypoint>,
    pub functions: Vec<Function>,
    /// Backing store of every name.
    pub strings: Vec<u8>,
    pub types: Vec<Type>,
    /// IL instruction words of every body.
    pub code: Vec<u32>,
}

impl IlBinary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the bytes under `range`, or `None` if it lies outside
    /// [`Self::strings`].
    #[must_use]
    pub fn string_bytes(&self, range: StringRange) -> Option<&[u8]> {
        let start = usize::try_from(range.offset).ok()?;
        let end = start.checked_add(usize::try_from(range.length).ok()?)?;
        self.strings.get(start..end)
    }

    /// Returns the name under `range` if it is in bounds and valid UTF-8.
    #[must_use]
    pub fn name(&self, range: StringRange) -> Option<&str> {
        std::str::from_utf8(self.string_bytes(range)?).ok()
    }

    /// Returns the words under `range`, or `None` if it lies outside
    /// [`Self::code`].
    #[must_use]
    pub fn code_words(&self, range: CodeRange) -> Option<&[u32]> {
        self.code.get(range.to_range()?)
    }

    /// Appends `name` to the string table.
    pub fn intern(&mut self, name: &str) -> StringRange {
        let range = StringRange {
            offset: self.strings.len() as u64,
            length: name.len() as u64,
        };
        self.strings.extend_from_slice(name.as_bytes());
        range
    }

    /// Appends `words` to the code array.
    pub fn append_code(&mut self, words: &[u32]) -> CodeRange {
        let range = CodeRange {
            offset: self.code.len() as u64,
            length: words.len() as u64,
        };
        self.code.extend_from_slice(words);
        range
    }

    /// Adds a function whose body is `body`, returning its index.
    pub fn add_function(
        &mut self,
        name: &str,
        return_type: TypeId,
        parameters: Vec<Parameter>,
        body: &[u32],
    ) -> u32 {
        let index = u32::try_from(self.functions.len()).unwrap_or(u32::MAX);
        let name = self.intern(name);
        let code = self.append_code(body);
        self.functions.push(Function {
            code,
            name,
            return_type,
            parameters,
        });
        index
    }

    /// Adds an entrypoint whose body is `body`.
    pub fn add_entrypoint(
        &mut self,
        kind: EntrypointKind,
        name: &str,
        inputs: Vec<Parameter>,
        outputs: Vec<Parameter>,
        body: &[u32],
    ) {
        let name = self.intern(name);
        let code = self.append_code(body);
        self.entrypoints.push(Entrypoint {
            kind,
            code,
            name,
            inputs,
            outputs,
        });
    }
}

/// Builds a body made of a call to each of `callees` followed by `Return`.
#[must_use]
pub fn call_body(callees: &[u32]) -> Vec<u32> {
    let mut body = Vec::new();
    for &callee in callees {
        push_instruction(&mut body, IlOpcode::Call, &[callee]);
    }
    push_instruction(&mut body, IlOpcode::Return, &[]);
    body
}
