// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Library surface of the `filc` command.
//!
//! The binary is a thin clap front over [`commands`]; everything that
//! touches the file system or the terminal lives here so it can be tested
//! without spawning a process.

pub mod commands;
pub mod config;
pub mod console;
pub mod diagnostic;
pub mod reader;
