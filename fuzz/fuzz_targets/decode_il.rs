// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for FIL decoding and transpiling.
//!
//! Strict and lenient decoding must agree on every input they both accept,
//! and whatever decodes must transpile without panicking.

#![no_main]

use fil_core::diagnostics::Message;
use fil_core::il::{decode, try_decode};
use fil_core::source_analysis::FileId;
use fil_core::spirv::{TranspileOptions, transpile};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let lenient = decode(data);
    if let Ok(strict) = try_decode(data) {
        assert_eq!(strict, lenient);
    }

    let mut messages: Vec<Message> = Vec::new();
    let _ = transpile(&lenient, TranspileOptions::default(), FileId(0), &mut messages);
});
