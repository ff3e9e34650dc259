// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `filc il`: dump a FIL binary in readable form.
//!
//! ```text
//! entrypoint Fragment "main"
//!   in Vec4
//!   out Vec4
//!   0: Call 0
//!   2: Return
//! function 0 "helper" -> Void
//!   0: Return
//! ```

use std::io::{self, Write};

use camino::Utf8Path;
use fil_core::il::{CodeRange, IlBinary, Parameter, ParameterQualifier, StringRange, instructions};
use miette::{IntoDiagnostic, Report, Result};

use super::{Status, load_binary};
use crate::config::{Overrides, Settings};
use crate::console::Console;

pub fn run<O: Write, E: Write>(
    path: &Utf8Path,
    overrides: &Overrides,
    console: &mut Console<O, E>,
) -> Result<Status> {
    let settings = Settings::resolve(path, overrides)?;
    let il = load_binary(path, &settings)?;
    dump(&il, console.out()).into_diagnostic()?;
    il.validate()
        .map_err(|error| Report::new(error).wrap_err(format!("'{path}' is not a valid FIL binary")))?;
    Ok(Status::Success)
}

/// Writes every entrypoint and function of `il` with its body.
pub fn dump(il: &IlBinary, out: &mut impl Write) -> io::Result<()> {
    for entrypoint in &il.entrypoints {
        writeln!(
            out,
            "entrypoint {:?} {}",
            entrypoint.kind,
            quoted_name(il, entrypoint.name)
        )?;
        write_parameters(out, "in", &entrypoint.inputs)?;
        write_parameters(out, "out", &entrypoint.outputs)?;
        write_body(out, il, entrypoint.code)?;
    }
    for (index, function) in il.functions.iter().enumerate() {
        writeln!(
            out,
            "function {index} {} -> {}",
            quoted_name(il, function.name),
            function.return_type
        )?;
        write_parameters(out, "param", &function.parameters)?;
        write_body(out, il, function.code)?;
    }
    Ok(())
}

fn quoted_name(il: &IlBinary, range: StringRange) -> String {
    il.name(range).map_or_else(
        || format!("<bad name {}+{}>", range.offset, range.length),
        |name| format!("{name:?}"),
    )
}

fn write_parameters(out: &mut impl Write, label: &str, parameters: &[Parameter]) -> io::Result<()> {
    for parameter in parameters {
        write!(out, "  {label} {}", parameter.type_id)?;
        for qualifier in &parameter.qualifiers {
            if *qualifier != ParameterQualifier::None {
                write!(out, " {qualifier:?}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

fn write_body(out: &mut impl Write, il: &IlBinary, range: CodeRange) -> io::Result<()> {
    let Some(words) = il.code_words(range) else {
        return writeln!(out, "  <bad code range {}+{}>", range.offset, range.length);
    };
    for instruction in instructions(words) {
        match instruction {
            Ok(instruction) => {
                write!(out, "  {}: {:?}", instruction.offset, instruction.opcode)?;
                for operand in instruction.operands {
                    write!(out, " {operand}")?;
                }
                writeln!(out)?;
            }
            Err(error) => writeln!(out, "  <{error}>")?,
        }
    }
    Ok(())
}
