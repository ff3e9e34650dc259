// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! fil shading toolchain core.
//!
//! This crate contains everything between shader source text and a SPIR-V
//! module:
//! - Source model and tokenizing ([`source_analysis`])
//! - `#include` expansion ([`source_analysis::Preprocessor`])
//! - Parsing into a uniform syntax tree ([`ast`])
//! - Diagnostic messages and their rendering ([`diagnostics`])
//! - The FIL intermediate language and its binary format ([`il`])
//! - SPIR-V emission with capability tracking ([`spirv`])
//!
//! Stages never stop at the first problem. Each reports messages and keeps
//! going, and [`pipeline`] decides whether the next stage may run.
//!
//! Semantic analysis, which turns a syntax tree into FIL, lives outside this
//! crate.

pub mod ast;
pub mod diagnostics;
pub mod il;
pub mod pipeline;
pub mod source_analysis;
pub mod spirv;
