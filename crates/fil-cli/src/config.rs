// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Project configuration.
//!
//! Settings come from an optional `fil.toml`, found next to the input file
//! or named with `--config`, and are then extended by command-line flags:
//!
//! ```toml
//! [preprocessor]
//! include_paths = ["shaders/common"]
//!
//! [macros]
//! LIGHTING = "lighting.fsl"
//!
//! [il]
//! strict = false
//!
//! [spirv]
//! version = "1.3"
//! emit_names = true
//! ```

use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use fil_core::il::IlReadMode;
use fil_core::source_analysis::{MacroTable, TokenizerOptions};
use fil_core::spirv::TranspileOptions;
use miette::{Context, IntoDiagnostic, Result, miette};
use serde::Deserialize;
use tracing::debug;

/// File name looked up next to the input.
pub const CONFIG_FILE_NAME: &str = "fil.toml";

/// The contents of a `fil.toml`.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Include search settings.
    pub preprocessor: PreprocessorConfig,
    /// `NAME = "target"` pairs usable as `#include NAME`.
    pub macros: BTreeMap<String, String>,
    /// How FIL binaries are read.
    pub il: IlConfig,
    /// SPIR-V output settings.
    pub spirv: SpirvConfig,
}

/// The `[preprocessor]` table.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PreprocessorConfig {
    /// Directories searched for includes, relative to the config file.
    pub include_paths: Vec<String>,
}

/// The `[il]` table.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct IlConfig {
    /// Reject malformed FIL binaries instead of reading them as empty.
    pub strict: bool,
}

/// The `[spirv]` table.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SpirvConfig {
    /// `"major.minor"`.
    pub version: Option<String>,
    /// Emit debug names for entry points and functions.
    pub emit_names: bool,
}

/// Parses a `fil.toml` file.
pub fn load_config(path: &Utf8Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read config '{path}'"))?;

    let config: Config = toml::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse config '{path}'"))?;

    if let Some(version) = &config.spirv.version {
        parse_spirv_version(version).ok_or_else(|| {
            miette!("Invalid SPIR-V version '{version}' in '{path}', expected 'major.minor'")
        })?;
    }
    Ok(config)
}

/// Looks for `fil.toml` in `dir` and parses it if found.
///
/// Returns `None` if no config file exists.
pub fn find_config(dir: &Utf8Path) -> Result<Option<(Utf8PathBuf, Config)>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if path
        .try_exists()
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to stat config '{path}'"))?
    {
        let config = load_config(&path)?;
        Ok(Some((path, config)))
    } else {
        Ok(None)
    }
}

/// Parses `"1.3"` into `(1, 3)`.
pub fn parse_spirv_version(text: &str) -> Option<(u8, u8)> {
    let (major, minor) = text.trim().split_once('.')?;
    Some((major.parse().ok()?, minor.parse().ok()?))
}

/// Flags shared by every subcommand that reads input.
#[derive(Debug, Default, Clone, Args)]
pub struct Overrides {
    /// Config file to use instead of looking for fil.toml next to the input
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<Utf8PathBuf>,

    /// Add a directory to the include search path
    #[arg(short = 'I', value_name = "DIR", global = true)]
    pub include: Vec<Utf8PathBuf>,

    /// Define an include macro
    #[arg(short = 'D', value_name = "NAME=TARGET", global = true)]
    pub define: Vec<String>,

    /// Reject malformed FIL binaries
    #[arg(long, global = true)]
    pub strict: bool,

    /// Keep comments in the token stream
    #[arg(long, global = true)]
    pub comments: bool,
}

/// Everything a command needs, after merging the config file and flags.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// The config file that was read, if any.
    pub config_path: Option<Utf8PathBuf>,
    /// Include directories in search order.
    pub include_paths: Vec<Utf8PathBuf>,
    /// Include macros, config entries overridden by `-D`.
    pub macros: MacroTable,
    /// Lenient or strict FIL decoding.
    pub il_mode: IlReadMode,
    /// Options for tokenizing the input and its includes.
    pub tokenizer: TokenizerOptions,
    /// Options for SPIR-V emission.
    pub transpile: TranspileOptions,
}

impl Settings {
    /// Resolves the settings for compiling `input`.
    pub fn resolve(input: &Utf8Path, overrides: &Overrides) -> Result<Self> {
        let found = match &overrides.config {
            Some(path) => Some((path.clone(), load_config(path)?)),
            None => find_config(input.parent().unwrap_or(Utf8Path::new("")))?,
        };

        let mut settings = Self::default();
        if let Some((path, config)) = found {
            debug!(%path, "loaded config");
            settings.apply_config(&path, config);
            settings.config_path = Some(path);
        }
        settings.apply_overrides(overrides)?;
        Ok(settings)
    }

    fn apply_config(&mut self, path: &Utf8Path, config: Config) {
        let base = path.parent().unwrap_or(Utf8Path::new(""));
        self.include_paths.extend(
            config
                .preprocessor
                .include_paths
                .iter()
                .map(|dir| base.join(dir)),
        );
        for (name, target) in config.macros {
            self.macros.define(name, target);
        }
        if config.il.strict {
            self.il_mode = IlReadMode::Strict;
        }
        if let Some(version) = config.spirv.version.as_deref().and_then(parse_spirv_version) {
            self.transpile.spirv_version = version;
        }
        self.transpile.emit_names = config.spirv.emit_names;
    }

    fn apply_overrides(&mut self, overrides: &Overrides) -> Result<()> {
        self.include_paths.extend(overrides.include.iter().cloned());
        for definition in &overrides.define {
            let (name, target) = definition
                .split_once('=')
                .filter(|(name, target)| !name.is_empty() && !target.is_empty())
                .ok_or_else(|| {
                    miette!("Invalid macro definition '{definition}', expected NAME=TARGET")
                })?;
            self.macros.define(name, target);
        }
        if overrides.strict {
            self.il_mode = IlReadMode::Strict;
        }
        if overrides.comments {
            self.tokenizer.include_comments = true;
        }
        Ok(())
    }
}
