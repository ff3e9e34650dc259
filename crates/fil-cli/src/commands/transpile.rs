// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `filc transpile`: turn a FIL binary into a SPIR-V module.

use std::fs;
use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use fil_core::diagnostics::Message;
use fil_core::pipeline::{self, Stage};
use fil_core::source_analysis::FileId;
use miette::{Context, IntoDiagnostic, Result};
use tracing::info;

use super::{Status, load_binary};
use crate::config::{Overrides, Settings};
use crate::console::{Console, Origin};

/// Transpiles `input` and writes the module to `output`, or next to the
/// input with a `.spv` extension.
pub fn run<O: Write, E: Write>(
    input: &Utf8Path,
    output: Option<&Utf8Path>,
    overrides: &Overrides,
    console: &mut Console<O, E>,
) -> Result<Status> {
    let settings = Settings::resolve(input, overrides)?;
    let il = load_binary(input, &settings)?;

    let mut messages: Vec<Message> = Vec::new();
    let outcome = pipeline::run_transpile(&il, settings.transpile, FileId(0), &mut messages);
    console
        .report(&messages, Origin::Binary(input.as_str()))
        .into_diagnostic()?;
    let words = match outcome.into_result(Stage::Transpile) {
        Ok(words) => words,
        Err(stage) => return Ok(Status::Failed(stage)),
    };

    let output = output.map_or_else(|| default_output(input), Utf8Path::to_path_buf);
    fs::write(&output, words_to_bytes(&words))
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to write '{output}'"))?;
    info!(%output, words = words.len(), "wrote SPIR-V module");
    Ok(Status::Success)
}

fn default_output(input: &Utf8Path) -> Utf8PathBuf {
    input.with_extension("spv")
}

/// Little-endian module bytes.
pub fn words_to_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|word| word.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fil_core::spirv::SPIRV_MAGIC;

    #[test]
    fn test_words_to_bytes_is_little_endian() {
        assert_eq!(
            words_to_bytes(&[SPIRV_MAGIC, 1]),
            [0x03, 0x02, 0x23, 0x07, 1, 0, 0, 0]
        );
    }

    #[test]
    fn test_default_output_replaces_extension() {
        assert_eq!(
            default_output(Utf8Path::new("shaders/lit.fil")),
            Utf8PathBuf::from("shaders/lit.spv")
        );
    }
}
