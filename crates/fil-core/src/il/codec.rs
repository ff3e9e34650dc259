// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Binary encoding of [`IlBinary`].
//!
//! ```text
//! magic u32 | version u32
//! entrypoints: u64 count, then per entry
//!     kind u32 | pad u32 | code_offset u64 | code_length u64
//!     | name_offset u64 | name_length u64 | inputs | outputs
//! functions: u64 count, then per function
//!     code_offset u64 | code_length u64 | name_offset u64 | name_length u64
//!     | return_type u64 | parameters
//! strings: u64 length | bytes | pad to 8
//! types: u64 count (always 0)
//! code: u64 count | u32 words | pad to 8
//!
//! parameters: u64 count, then per parameter
//!     type_id u64 | qualifier_count u32 | pad u32 | qualifiers u32 * n | pad to 8
//! ```
//!
//! Words are written in host byte order. Every 64-bit field starts on an
//! 8-byte boundary.

use tracing::{debug, instrument, warn};

use super::model::{
    CodeRange, Entrypoint, EntrypointKind, Function, IlBinary, Parameter, ParameterQualifier,
    StringRange, TypeId,
};
use super::{IlError, Version};

/// First word of every FIL binary.
pub const MAGIC: u32 = 0x4649_4C00;

/// How [`decode_with`] treats structural problems.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IlReadMode {
    /// Problems yield an empty binary, trailing bytes are ignored.
    #[default]
    Lenient,
    /// Problems are returned as [`IlError`].
    Strict,
}

const ENTRYPOINT_MIN_SIZE: usize = 56;
const FUNCTION_MIN_SIZE: usize = 48;
const PARAMETER_MIN_SIZE: usize = 16;

// ============================================================================
// Encoding
// ============================================================================

/// Encodes `binary` with the current format version.
#[must_use]
#[instrument(skip_all, fields(
    entrypoints = binary.entrypoints.len(),
    functions = binary.functions.len(),
    code = binary.code.len(),
))]
pub fn encode(binary: &IlBinary) -> Vec<u8> {
    let mut writer = Writer::default();
    writer.u32(MAGIC);
    writer.u32(Version::CURRENT.to_word());

    writer.count(binary.entrypoints.len());
    for entrypoint in &binary.entrypoints {
        writer.u32(entrypoint.kind as u32);
        writer.u32(0);
        writer.code_range(entrypoint.code);
        writer.string_range(entrypoint.name);
        writer.parameters(&entrypoint.inputs);
        writer.parameters(&entrypoint.outputs);
    }

    writer.count(binary.functions.len());
    for function in &binary.functions {
        writer.code_range(function.code);
        writer.string_range(function.name);
        writer.u64(function.return_type.0);
        writer.parameters(&function.parameters);
    }

    writer.count(binary.strings.len());
    writer.bytes.extend_from_slice(&binary.strings);
    writer.align();

    writer.count(binary.types.len());

    writer.count(binary.code.len());
    for &word in &binary.code {
        writer.u32(word);
    }
    writer.align();

    debug!(bytes = writer.bytes.len(), "encoded FIL binary");
    writer.bytes
}

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_ne_bytes());
    }

    fn u64(&mut self, value: u64) {
        self.bytes.extend_from_slice(&value.to_ne_bytes());
    }

    fn count(&mut self, count: usize) {
        self.u64(count as u64);
    }

    fn align(&mut self) {
        while self.bytes.len() % 8 != 0 {
            self.bytes.push(0);
        }
    }

    fn code_range(&mut self, range: CodeRange) {
        self.u64(range.offset);
        self.u64(range.length);
    }

    fn string_range(&mut self, range: StringRange) {
        self.u64(range.offset);
        self.u64(range.length);
    }

    fn parameters(&mut self, parameters: &[Parameter]) {
        self.count(parameters.len());
        for parameter in parameters {
            self.u64(parameter.type_id.0);
            self.u32(u32::try_from(parameter.qualifiers.len()).unwrap_or(u32::MAX));
            self.u32(0);
            for &qualifier in &parameter.qualifiers {
                self.u32(qualifier as u32);
            }
            self.align();
        }
    }
}

// ============================================================================
// Decoding
// ============================================================================

/// Decodes a binary, returning an empty one if `bytes` is not a readable FIL
/// binary of a known major version.
#[must_use]
pub fn decode(bytes: &[u8]) -> IlBinary {
    match read(bytes) {
        Ok((binary, trailing)) => {
            if trailing > 0 {
                debug!(trailing, "ignoring bytes after the FIL binary");
            }
            binary
        }
        Err(error) => {
            warn!(%error, "unreadable FIL binary, using an empty one");
            IlBinary::default()
        }
    }
}

/// Decodes a binary, reporting every structural problem.
///
/// # Errors
///
/// Returns an [`IlError`] for a bad magic word, an unknown major version,
/// truncated input, bytes after the end of the binary, an undecodable
/// enumerant or a non-empty types array.
pub fn try_decode(bytes: &[u8]) -> Result<IlBinary, IlError> {
    let (binary, trailing) = read(bytes)?;
    if trailing > 0 {
        return Err(IlError::TrailingBytes { count: trailing });
    }
    Ok(binary)
}

/// Decodes a binary according to `mode`.
///
/// # Errors
///
/// Only in [`IlReadMode::Strict`]; see [`try_decode`].
pub fn decode_with(bytes: &[u8], mode: IlReadMode) -> Result<IlBinary, IlError> {
    match mode {
        IlReadMode::Lenient => Ok(decode(bytes)),
        IlReadMode::Strict => try_decode(bytes),
    }
}

/// Reads a binary and reports how many bytes followed it.
#[instrument(skip_all, fields(len = bytes.len()))]
fn read(bytes: &[u8]) -> Result<(IlBinary, usize), IlError> {
    let mut reader = Reader { bytes, pos: 0 };
    let magic = reader.u32()?;
    if magic != MAGIC {
        return Err(IlError::BadMagic { found: magic });
    }
    let version = Version::from_word(reader.u32()?);
    let binary = match version.major {
        1 => reader.binary_v1()?,
        _ => return Err(IlError::UnsupportedVersion { version }),
    };
    Ok((binary, bytes.len() - reader.pos))
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], IlError> {
        let truncated = IlError::Truncated { offset: self.pos };
        let end = self.pos.checked_add(len).ok_or(truncated.clone())?;
        let slice = self.bytes.get(self.pos..end).ok_or(truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32, IlError> {
        let offset = self.pos;
        let bytes = self.take(4)?;
        bytes
            .try_into()
            .map(u32::from_ne_bytes)
            .map_err(|_| IlError::Truncated { offset })
    }

    fn u64(&mut self) -> Result<u64, IlError> {
        let offset = self.pos;
        let bytes = self.take(8)?;
        bytes
            .try_into()
            .map(u64::from_ne_bytes)
            .map_err(|_| IlError::Truncated { offset })
    }

    fn align(&mut self) -> Result<(), IlError> {
        let pad = (8 - self.pos % 8) % 8;
        self.take(pad).map(|_| ())
    }

    /// Reads a count of records that each take at least `min_size` bytes.
    ///
    /// Counts that cannot fit in the remaining input are reported as
    /// truncation before anything is allocated.
    fn count(&mut self, min_size: usize) -> Result<usize, IlError> {
        let offset = self.pos;
        let count = self.u64()?;
        usize::try_from(count)
            .ok()
            .filter(|&n| n.saturating_mul(min_size) <= self.remaining())
            .ok_or(IlError::Truncated { offset })
    }

    fn code_range(&mut self) -> Result<CodeRange, IlError> {
        Ok(CodeRange {
            offset: self.u64()?,
            length: self.u64()?,
        })
    }

    fn string_range(&mut self) -> Result<StringRange, IlError> {
        Ok(StringRange {
            offset: self.u64()?,
            length: self.u64()?,
        })
    }

    fn binary_v1(&mut self) -> Result<IlBinary, IlError> {
        let count = self.count(ENTRYPOINT_MIN_SIZE)?;
        let mut entrypoints = Vec::with_capacity(count);
        for _ in 0..count {
            entrypoints.push(self.entrypoint()?);
        }

        let count = self.count(FUNCTION_MIN_SIZE)?;
        let mut functions = Vec::with_capacity(count);
        for _ in 0..count {
            functions.push(self.function()?);
        }

        let len = self.count(1)?;
        let strings = self.take(len)?.to_vec();
        self.align()?;

        let types = self.u64()?;
        if types != 0 {
            return Err(IlError::ReservedTypes { count: types });
        }

        let count = self.count(4)?;
        let mut code = Vec::with_capacity(count);
        for _ in 0..count {
            code.push(self.u32()?);
        }
        self.align()?;

        Ok(IlBinary {
            entrypoints,
            functions,
            strings,
            types: Vec::new(),
            code,
        })
    }

    fn entrypoint(&mut self) -> Result<Entrypoint, IlError> {
        let value = self.u32()?;
        let kind =
            EntrypointKind::from_u32(value).ok_or(IlError::InvalidEntrypointKind { value })?;
        self.u32()?;
        Ok(Entrypoint {
            kind,
            code: self.code_range()?,
            name: self.string_range()?,
            inputs: self.parameters()?,
            outputs: self.parameters()?,
        })
    }

    fn function(&mut self) -> Result<Function, IlError> {
        Ok(Function {
            code: self.code_range()?,
            name: self.string_range()?,
            return_type: TypeId(self.u64()?),
            parameters: self.parameters()?,
        })
    }

    fn parameters(&mut self) -> Result<Vec<Parameter>, IlError> {
        let count = self.count(PARAMETER_MIN_SIZE)?;
        let mut parameters = Vec::with_capacity(count);
        for _ in 0..count {
            let type_id = TypeId(self.u64()?);
            let offset = self.pos;
            let qualifier_count = usize::try_from(self.u32()?)
                .ok()
                .filter(|&n| n.saturating_mul(4) <= self.remaining())
                .ok_or(IlError::Truncated { offset })?;
            self.u32()?;
            let mut qualifiers = Vec::with_capacity(qualifier_count);
            for _ in 0..qualifier_count {
                let value = self.u32()?;
                qualifiers.push(
                    ParameterQualifier::from_u32(value)
                        .ok_or(IlError::InvalidQualifier { value })?,
                );
            }
            self.align()?;
            parameters.push(Parameter {
                qualifiers,
                type_id,
            });
        }
        Ok(parameters)
    }
}
