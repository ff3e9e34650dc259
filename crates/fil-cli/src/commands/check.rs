// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `filc check`: run the front end and report problems.

use std::io::Write;

use camino::Utf8Path;
use miette::Result;
use tracing::info;

use super::{Status, front_end};
use crate::config::Overrides;
use crate::console::Console;

pub fn run<O: Write, E: Write>(
    path: &Utf8Path,
    overrides: &Overrides,
    console: &mut Console<O, E>,
) -> Result<Status> {
    let result = front_end(path, overrides, console)?;
    if result.is_ok() {
        info!(%path, "check passed");
    }
    Ok(result.map(drop).into())
}
