//! Structural extraction
//!
//! Types produced by running structural queries over parsed C++ trees, and
//! the extraction engine that produces them.
//!
//! @module extract

pub mod cpp;

pub use cpp::{class_query_source, extract_classes, reference_positions, reference_query_source};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// =============================================================================
// EXTRACTED TYPES
// =============================================================================

/// Member visibility
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }

    /// Parse an access specifier label (`public`, `protected:` ...)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().trim_end_matches(':').trim() {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }
}

/// A single function parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

/// A method declared or defined inside a class body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    pub return_type: String,
    pub parameters: Vec<ParameterInfo>,
    pub is_virtual: bool,
    pub is_override: bool,
    pub visibility: Visibility,
    pub line: usize,
}

/// A data member declared inside a class body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub property_type: String,
    pub visibility: Visibility,
    pub line: usize,
}

/// Everything extracted about one class declaration.
///
/// Identity is the class name alone: a later extraction of the same name
/// replaces an earlier one regardless of file or namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,
    pub file: PathBuf,
    pub line: usize,
    pub superclasses: Vec<String>,
    pub interfaces: Vec<String>,
    pub methods: Vec<MethodInfo>,
    pub properties: Vec<PropertyInfo>,
    pub comments: Vec<String>,
}

/// What kind of symbol a reference search is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    Class,
    Function,
    Variable,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Function => "function",
            Self::Variable => "variable",
        }
    }
}

impl std::str::FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "class" => Ok(Self::Class),
            "function" => Ok(Self::Function),
            "variable" => Ok(Self::Variable),
            other => Err(format!("unknown reference kind '{}'", other)),
        }
    }
}

/// A location where an identifier occurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeReference {
    pub file: PathBuf,
    /// 1-based line
    pub line: usize,
    /// 1-based column
    pub column: usize,
    /// Up to two lines either side of the match
    pub context: String,
}

/// A class and its recursively resolved superclasses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassHierarchy {
    pub class_name: String,
    pub superclasses: Vec<ClassHierarchy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<Vec<String>>,
}

impl ClassHierarchy {
    /// Depth of the tree (a lone class has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .superclasses
            .iter()
            .map(ClassHierarchy::depth)
            .max()
            .unwrap_or(0)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Lines `index - 2 ..= index + 2` joined with newlines, clamped to the file
pub fn context_window(lines: &[&str], index: usize) -> String {
    let start = index.saturating_sub(2);
    let end = (index + 3).min(lines.len());
    if start >= end {
        return String::new();
    }
    lines[start..end].join("\n")
}

/// Interface naming convention: `I` followed by an uppercase letter
pub fn is_interface_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('I') && chars.next().is_some_and(|c| c.is_ascii_uppercase())
}
