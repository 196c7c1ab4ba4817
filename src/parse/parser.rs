use crate::core::error::{Error, Result};
use crate::parse::Language;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;
use std::ops::Range;
use tree_sitter::{Parser, Tree};

/// `MODULE_API` export tokens, e.g. `class ENGINE_API AActor`
static EXPORT_MACRO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][A-Z0-9_]*_API\b").unwrap());

/// Reflection and codegen macros whose argument list must be masked too
static REFLECTION_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(?:U(?:CLASS|STRUCT|ENUM|INTERFACE|PROPERTY|FUNCTION|DELEGATE|PARAM|META)|GENERATED_[A-Z_]*BODY)\s*\(",
    )
    .unwrap()
});

/// Trait for syntax tree parsers
///
/// The analyzer only needs "source text in, tree out"; swapping the
/// implementation lets callers instrument or replace parsing.
pub trait TreeParser: Send + Sync {
    /// Parse source text into a syntax tree
    fn parse(&self, source: &str) -> Result<Tree>;

    /// Grammar the produced trees belong to (used to compile queries)
    fn language(&self) -> tree_sitter::Language;
}

/// tree-sitter C++ parser
///
/// `tree_sitter::Parser` is not `Sync`, so a fresh parser is created per call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CppParser;

impl CppParser {
    pub fn grammar() -> tree_sitter::Language {
        tree_sitter_cpp::LANGUAGE.into()
    }
}

impl TreeParser for CppParser {
    fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&Self::grammar())
            .map_err(|e| Error::ParseError {
                message: format!("Failed to load {} grammar: {}", Language::Cpp, e),
            })?;

        let masked = mask_unreal_macros(source);
        parser.parse(masked.as_ref(), None).ok_or_else(|| Error::ParseError {
            message: "Parser returned no tree".to_string(),
        })
    }

    fn language(&self) -> tree_sitter::Language {
        Self::grammar()
    }
}

/// Blank out Unreal macros the C++ grammar cannot parse.
///
/// Masked bytes become spaces and newlines are kept, so byte offsets and
/// rows in the resulting tree line up with the unmasked source.
pub fn mask_unreal_macros(source: &str) -> Cow<'_, str> {
    let mut ranges: Vec<Range<usize>> = EXPORT_MACRO.find_iter(source).map(|m| m.range()).collect();
    ranges.extend(
        REFLECTION_CALL
            .find_iter(source)
            .map(|m| m.start()..call_end(source, m.end())),
    );

    if ranges.is_empty() {
        return Cow::Borrowed(source);
    }

    let mut masked = String::with_capacity(source.len());
    for (offset, c) in source.char_indices() {
        if c != '\n' && ranges.iter().any(|r| r.contains(&offset)) {
            masked.extend(std::iter::repeat(' ').take(c.len_utf8()));
        } else {
            masked.push(c);
        }
    }
    Cow::Owned(masked)
}

/// Byte offset just past the `)` closing a call whose `(` ends at `open`.
/// Unbalanced calls run to the end of the source.
fn call_end(source: &str, open: usize) -> usize {
    let mut depth = 1usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in source[open..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return open + offset + 1;
                }
            }
            _ => {}
        }
    }
    source.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_clean_source() {
        let tree = CppParser.parse("class A { int x; };").unwrap();
        assert_eq!(tree.root_node().kind(), "translation_unit");
        assert!(!tree.root_node().has_error());
    }

    #[test]
    fn test_parse_reports_structural_error() {
        let tree = CppParser.parse("class A { int x; };\n@@@ ###\n").unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_mask_preserves_offsets() {
        let source = "UCLASS(meta=(DisplayName=\"A (b)\"))\nclass ENGINE_API AThing {};\n";
        let masked = mask_unreal_macros(source);

        assert_eq!(masked.len(), source.len());
        assert_eq!(masked.lines().count(), source.lines().count());
        assert!(masked.lines().next().unwrap().trim().is_empty());
        assert_eq!(masked.lines().nth(1).unwrap(), "class            AThing {};");
    }

    #[test]
    fn test_mask_leaves_plain_source_borrowed() {
        assert!(matches!(mask_unreal_macros("class A {};"), Cow::Borrowed(_)));
        assert!(matches!(mask_unreal_macros("int API = 1;"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_mask_multiline_and_non_ascii_arguments() {
        let source = "UPROPERTY(EditAnywhere,\n\tmeta=(ToolTip=\"Größe\"))\nfloat Size;\n";
        let masked = mask_unreal_macros(source);
        assert_eq!(masked.len(), source.len());
        assert_eq!(masked.lines().nth(2).unwrap(), "float Size;");
        assert!(!masked.contains("UPROPERTY"));
    }

    #[test]
    fn test_export_macro_class_parses_clean() {
        let tree = CppParser
            .parse("class ENGINE_API AActor : public UObject\n{\npublic:\n\tfloat Health;\n};\n")
            .unwrap();
        assert!(!tree.root_node().has_error());
    }
}
