// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! File-system access for `#include`.
//!
//! Include-once keys are canonical paths, so `main.fsl`, `./main.fsl` and
//! `sub/main.fsl` seen from the parent directory are one file.

use std::fs;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use ecow::EcoString;
use fil_core::source_analysis::{FileReader, ReadError};
use tracing::trace;

/// Reads include targets from a list of directories, searched in order.
#[derive(Debug, Clone, Default)]
pub struct IncludeReader {
    search_dirs: Vec<Utf8PathBuf>,
}

impl IncludeReader {
    /// A reader searching `search_dirs` in order.
    pub fn new(search_dirs: impl IntoIterator<Item = Utf8PathBuf>) -> Self {
        Self {
            search_dirs: search_dirs.into_iter().collect(),
        }
    }

    /// A reader that searches the directory of `input` first, then
    /// `include_paths`.
    pub fn for_input(input: &Utf8Path, include_paths: &[Utf8PathBuf]) -> Self {
        let input_dir = input.parent().unwrap_or(Utf8Path::new("")).to_path_buf();
        Self::new(std::iter::once(input_dir).chain(include_paths.iter().cloned()))
    }

    /// Directories searched for relative names.
    pub fn search_dirs(&self) -> &[Utf8PathBuf] {
        &self.search_dirs
    }

    fn candidates(&self, name: &Utf8Path) -> Vec<Utf8PathBuf> {
        if name.is_absolute() {
            vec![name.to_path_buf()]
        } else {
            self.search_dirs.iter().map(|dir| dir.join(name)).collect()
        }
    }
}

/// The canonical form of `path`, or `None` if it does not exist.
fn canonical_key(path: &Utf8Path) -> Option<EcoString> {
    path.canonicalize_utf8()
        .ok()
        .map(|path| EcoString::from(path.as_str()))
}

impl FileReader for IncludeReader {
    fn read(&mut self, name: &str) -> Result<String, ReadError> {
        for path in self.candidates(Utf8Path::new(name)) {
            match fs::read_to_string(&path) {
                Ok(text) => {
                    trace!(%path, "read include");
                    return Ok(text);
                }
                Err(error) if error.kind() == io::ErrorKind::NotFound => {}
                Err(error) => return Err(ReadError::Io(error)),
            }
        }
        Err(ReadError::NotFound)
    }

    fn include_key(&mut self, name: &str) -> EcoString {
        // Missing targets keep their spelling; reading them reports the error
        self.candidates(Utf8Path::new(name))
            .iter()
            .find_map(|path| canonical_key(path))
            .unwrap_or_else(|| name.into())
    }

    fn root_key(&mut self, name: &str) -> EcoString {
        canonical_key(Utf8Path::new(name)).unwrap_or_else(|| name.into())
    }
}
