// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for the front end.
//!
//! Feeds arbitrary text through tokenizing, include expansion and parsing.
//! Includes resolve to the input itself, so cycles and include-once are
//! exercised too. Success means no panic; messages are expected.

#![no_main]

use fil_core::diagnostics::Message;
use fil_core::pipeline;
use fil_core::source_analysis::{MacroTable, ReadError, SourceMap, TokenizerOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Invalid UTF-8 is rejected before the tokenizer ever sees it
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };

    let mut sources = SourceMap::new();
    let file = sources.add("fuzz.fsl", source);
    let mut reader = |name: &str| -> Result<String, ReadError> {
        if name == "self.fsl" {
            Ok(source.to_string())
        } else {
            Err(ReadError::NotFound)
        }
    };
    let mut macros = MacroTable::new();
    macros.define("SELF", "self.fsl");
    let mut messages: Vec<Message> = Vec::new();

    let _ = pipeline::front_end(
        file,
        &mut sources,
        &mut reader,
        &macros,
        TokenizerOptions::default(),
        &mut messages,
    );
});
