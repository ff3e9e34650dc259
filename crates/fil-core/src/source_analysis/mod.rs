// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Front-end for shader source: tokenizing, preprocessing and parsing.
//!
//! # Source Model
//!
//! Every file is registered in a [`SourceMap`] and gets a [`FileId`]. Tokens
//! and diagnostics point into files through [`SourcePoint`] and
//! [`SourceSpan`], which carry the file, byte index, line and column so that
//! tokens spliced in from included files keep their own positions.
//!
//! # Tokenizing
//!
//! [`tokenize`] (or the lazy [`Tokenizer`]) runs a table-driven automaton
//! over the bytes of a file. Symbols are single characters; the parser joins
//! them into operators.
//!
//! ```
//! use fil_core::source_analysis::{FileId, SourcePoint, TokenClass, TokenizerOptions, tokenize};
//!
//! let tokens = tokenize("x + 1", SourcePoint::file_start(FileId(0)), TokenizerOptions::default());
//! let classes: Vec<_> = tokens.iter().map(|t| t.class).collect();
//! assert_eq!(classes, [TokenClass::Identifier, TokenClass::Symbol, TokenClass::Integer]);
//! ```
//!
//! # Preprocessing
//!
//! [`preprocess`] expands `#include` directives, splicing in the tokens of
//! other files read through a [`FileReader`]. Each file is included at most
//! once.
//!
//! # Parsing
//!
//! [`parse`] builds a [`Node`](crate::ast::Node) tree. Problems in any stage
//! are reported to a [`MessageSink`](crate::diagnostics::MessageSink) and the
//! stage carries on.

mod char_class;
mod parser;
mod preprocessor;
mod source_map;
mod span;
mod token;
mod tokenizer;


pub use char_class::{CharClass, classify};
pub use parser::{MAX_NESTING_DEPTH, parse};
pub use preprocessor::{
    FileReader, MAX_INCLUDE_DEPTH, MacroTable, Preprocessor, ReadError, preprocess,
};
pub use source_map::{SourceFile, SourceLookup, SourceMap};
pub use span::{FileId, SourcePoint, SourceSpan};
pub use token::{ClassSet, Token, TokenClass};
pub use tokenizer::{Tokenizer, TokenizerOptions, tokenize};
