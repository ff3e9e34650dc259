// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `filc ast`: print the syntax tree as an outline.

use std::io::Write;

use camino::Utf8Path;
use miette::{IntoDiagnostic, Result};

use super::{Status, front_end};
use crate::config::Overrides;
use crate::console::Console;

pub fn run<O: Write, E: Write>(
    path: &Utf8Path,
    overrides: &Overrides,
    console: &mut Console<O, E>,
) -> Result<Status> {
    match front_end(path, overrides, console)? {
        Ok(root) => {
            write!(console.out(), "{}", root.outline()).into_diagnostic()?;
            Ok(Status::Success)
        }
        Err(stage) => Ok(Status::Failed(stage)),
    }
}
