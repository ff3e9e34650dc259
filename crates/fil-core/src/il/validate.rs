// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Reference checks run before a binary is handed to code generation.

use super::IlError;
use super::instruction::{IlOpcode, instructions};
use super::model::{CodeRange, IlBinary, Parameter, StringRange, TypeId};

impl IlBinary {
    /// Checks that every name, body, type and call target resolves.
    ///
    /// # Errors
    ///
    /// Returns the first [`IlError`] found, checking entrypoints before
    /// functions and each record's name before its signature and body.
    pub fn validate(&self) -> Result<(), IlError> {
        for entrypoint in &self.entrypoints {
            self.check_name(entrypoint.name)?;
            check_parameters(&entrypoint.inputs)?;
            check_parameters(&entrypoint.outputs)?;
            self.check_body(entrypoint.code)?;
        }
        for function in &self.functions {
            self.check_name(function.name)?;
            check_type(function.return_type)?;
            check_parameters(&function.parameters)?;
            self.check_body(function.code)?;
        }
        Ok(())
    }

    fn check_name(&self, range: StringRange) -> Result<(), IlError> {
        let Some(bytes) = self.string_bytes(range) else {
            return Err(IlError::StringRange {
                offset: range.offset,
                length: range.length,
                size: self.strings.len(),
            });
        };
        std::str::from_utf8(bytes)
            .map(|_| ())
            .map_err(|_| IlError::InvalidName {
                offset: range.offset,
                length: range.length,
            })
    }

    fn check_body(&self, range: CodeRange) -> Result<(), IlError> {
        let Some(words) = self.code_words(range) else {
            return Err(IlError::CodeRange {
                offset: range.offset,
                length: range.length,
                size: self.code.len(),
            });
        };
        for instruction in instructions(words) {
            let instruction = instruction?;
            if instruction.opcode == IlOpcode::Call {
                let index = instruction.operands.first().copied().unwrap_or(u32::MAX);
                if usize::try_from(index)
                    .ok()
                    .is_none_or(|i| i >= self.functions.len())
                {
                    return Err(IlError::InvalidCallTarget {
                        index,
                        count: self.functions.len(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Only builtin types resolve while the type table is reserved.
fn check_type(type_id: TypeId) -> Result<(), IlError> {
    match type_id.builtin() {
        Some(_) => Ok(()),
        None => Err(IlError::UnresolvedType { type_id: type_id.0 }),
    }
}

fn check_parameters(parameters: &[Parameter]) -> Result<(), IlError> {
    parameters
        .iter()
        .try_for_each(|parameter| check_type(parameter.type_id))
}
