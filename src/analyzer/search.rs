use super::{read_source, Analyzer};
use crate::core::error::{Error, Result};
use crate::extract::{
    context_window, reference_positions, reference_query_source, CodeReference, ReferenceKind,
};
use crate::parse::Language;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tree_sitter::Query;
use tracing::debug;

/// Arguments for [`Analyzer::search_code`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Case-insensitive regular expression
    pub query: String,
    /// Glob for candidate files; the configured search pattern when absent
    #[serde(default)]
    pub file_pattern: Option<String>,
    #[serde(default)]
    pub include_comments: bool,
}

impl SearchOptions {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            file_pattern: None,
            include_comments: false,
        }
    }

    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = Some(pattern.into());
        self
    }

    pub fn with_comments(mut self, include: bool) -> Self {
        self.include_comments = include;
        self
    }
}

impl Analyzer {
    /// Every syntactic occurrence of `identifier`.
    ///
    /// `Class` matches type names only; any other kind (or none) matches
    /// plain identifiers.
    pub async fn find_references(
        &self,
        identifier: &str,
        kind: Option<ReferenceKind>,
    ) -> Result<Vec<CodeReference>> {
        let workspace = self.workspace()?;
        validate_identifier(identifier)?;

        let key = format!(
            "ref:{}:{}",
            kind.map_or("any", |k| k.as_str()),
            identifier
        );
        let query = self.query_for(&key, || reference_query_source(identifier, kind))?;

        let files = self
            .walker(&workspace.root)
            .walk(&self.config.scan.reference_pattern)?;

        let per_file = self
            .structural_scanner()
            .scan(&files, |path| self.references_in(path, &query))
            .await?;

        let references: Vec<CodeReference> = per_file.into_iter().flatten().collect();
        debug!(identifier, files = files.len(), references = references.len(), "References found");
        Ok(references)
    }

    /// Line-oriented regex search.
    ///
    /// With `include_comments` off, lines whose trimmed text starts with `//`
    /// or `/*` are skipped entirely. The reported column is where the query
    /// text occurs literally in the line (1-based), or 0 when the regex
    /// matched but the literal text does not appear.
    pub async fn search_code(&self, options: &SearchOptions) -> Result<Vec<CodeReference>> {
        let workspace = self.workspace()?;

        if options.query.is_empty() {
            return Err(Error::InvalidArgument {
                message: "search query must not be empty".to_string(),
            });
        }
        let regex = RegexBuilder::new(&options.query)
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidArgument {
                message: format!("Invalid search pattern '{}': {}", options.query, e),
            })?;

        let pattern = options
            .file_pattern
            .as_deref()
            .unwrap_or(&self.config.scan.search_pattern);
        let files = self.walker(&workspace.root).walk(pattern)?;

        let per_file = self
            .text_scanner()
            .scan(&files, |path| search_file(path, &regex, options))
            .await?;

        Ok(per_file.into_iter().flatten().collect())
    }

    async fn references_in(&self, path: PathBuf, query: &Query) -> Result<Vec<CodeReference>> {
        if !Language::from_path(&path).has_ast_support() {
            return Ok(Vec::new());
        }

        let source = read_source(&path).await?;
        let tree = self.tree_for(&path, &source)?;
        let lines: Vec<&str> = source.lines().collect();

        let references = reference_positions(&tree, query, &source)
            .into_iter()
            .map(|(row, byte_column)| {
                let line = lines.get(row).copied().unwrap_or("");
                CodeReference {
                    file: path.clone(),
                    line: row + 1,
                    column: char_column(line, byte_column) + 1,
                    context: context_window(&lines, row),
                }
            })
            .collect();
        Ok(references)
    }
}

async fn search_file(
    path: PathBuf,
    regex: &Regex,
    options: &SearchOptions,
) -> Result<Vec<CodeReference>> {
    let source = read_source(&path).await?;
    let lines: Vec<&str> = source.lines().collect();

    let mut hits = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        if !options.include_comments && is_comment_line(line) {
            continue;
        }
        if !regex.is_match(line) {
            continue;
        }

        let column = line
            .find(options.query.as_str())
            .map_or(0, |byte| char_column(line, byte) + 1);
        hits.push(CodeReference {
            file: path.clone(),
            line: index + 1,
            column,
            context: context_window(&lines, index),
        });
    }
    Ok(hits)
}

fn validate_identifier(identifier: &str) -> Result<()> {
    let mut chars = identifier.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid {
        Ok(())
    } else {
        Err(Error::InvalidArgument {
            message: format!("'{}' is not a valid C++ identifier", identifier),
        })
    }
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with("/*")
}

/// 0-based character column for a byte offset into `line`
fn char_column(line: &str, byte: usize) -> usize {
    line.get(..byte).map_or(byte, |prefix| prefix.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("AActor").is_ok());
        assert!(validate_identifier("_bFlag2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2D").is_err());
        assert!(validate_identifier("A\") @x").is_err());
    }

    #[test]
    fn test_comment_lines() {
        assert!(is_comment_line("   // foo bar"));
        assert!(is_comment_line("/* block */"));
        assert!(!is_comment_line("int x = 1; // foo"));
    }

    #[test]
    fn test_char_column() {
        assert_eq!(char_column("abc", 2), 2);
        assert_eq!(char_column("éa", 2), 1);
    }

    #[test]
    fn test_search_options_builder() {
        let options = SearchOptions::new("Tick")
            .with_file_pattern("**/*.h")
            .with_comments(true);
        assert_eq!(options.file_pattern.as_deref(), Some("**/*.h"));
        assert!(options.include_comments);
    }
}
