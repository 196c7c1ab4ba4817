//! Language detection and tree-sitter grammar loading

use std::path::Path;

/// Source languages the analyzer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// C++ sources and headers (`.h` is treated as C++ in Unreal trees)
    Cpp,
    /// Files we can read as text but not parse structurally
    Unknown,
}

impl Language {
    /// Detect language from file path
    pub fn from_path(path: &Path) -> Self {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext.to_lowercase().as_str() {
            "h" | "hh" | "hpp" | "hxx" | "inl" | "cpp" | "cc" | "cxx" | "c" => Language::Cpp,
            _ => Language::Unknown,
        }
    }

    /// Get the language name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "cpp",
            Language::Unknown => "unknown",
        }
    }

    /// Check if this language has tree-sitter support
    pub fn has_ast_support(&self) -> bool {
        !matches!(self, Language::Unknown)
    }

    /// Get the tree-sitter language for this language
    pub fn tree_sitter_language(&self) -> Option<tree_sitter::Language> {
        match self {
            Language::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
            Language::Unknown => None,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_detection() {
        assert_eq!(Language::from_path(Path::new("Actor.h")), Language::Cpp);
        assert_eq!(Language::from_path(Path::new("Actor.cpp")), Language::Cpp);
        assert_eq!(Language::from_path(Path::new("Math.inl")), Language::Cpp);
        assert_eq!(Language::from_path(Path::new("Build.cs")), Language::Unknown);
        assert!(Language::Cpp.has_ast_support());
        assert!(Language::Unknown.tree_sitter_language().is_none());
    }
}
