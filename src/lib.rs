//! Unreal Analyzer - structural analysis for Unreal Engine C++ codebases
//!
//! Parses headers and sources with tree-sitter, extracts classes, methods
//! and properties, and answers hierarchy, reference, search, subsystem,
//! pattern and API-reference queries over an engine checkout or any C++
//! codebase.

pub mod analyzer;
pub mod cache;
pub mod cli;
pub mod core;
pub mod extract;
pub mod knowledge;
pub mod output;
pub mod parse;
pub mod protocol;
pub mod scan;

pub use analyzer::{Analyzer, InitSummary, RootKind, SearchOptions};
pub use crate::core::config::Config;
pub use crate::core::error::{Error, Result};
