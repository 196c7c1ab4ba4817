use crate::core::config::MAX_FILE_SIZE;
use crate::core::error::{Error, Result};
use glob::{MatchOptions, Pattern};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Walks source files under a root, filtered by a glob pattern
pub struct FileWalker {
    root: PathBuf,
    max_file_size: u64,
}

impl FileWalker {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            max_file_size: MAX_FILE_SIZE,
        }
    }

    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// All files under the root whose root-relative path matches `pattern`,
    /// sorted for a stable batch order
    pub fn walk(&self, pattern: &str) -> Result<Vec<PathBuf>> {
        let matcher = GlobMatcher::new(pattern)?;
        let mut files = Vec::new();

        let walker = WalkBuilder::new(&self.root)
            .hidden(true)           // Skip hidden files
            .git_ignore(true)       // Respect .gitignore
            .git_global(false)      // Ignore the user's global gitignore
            .git_exclude(true)      // Respect .git/info/exclude
            .require_git(false)     // Work even without .git
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %self.root.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();

            // Skip files that are too large
            if let Ok(meta) = entry.metadata() {
                if meta.len() > self.max_file_size {
                    debug!(path = %path.display(), size = meta.len(), "Skipping oversized file");
                    continue;
                }
            }

            let relative = path.strip_prefix(&self.root).unwrap_or(path);
            if matcher.matches(relative) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        Ok(files)
    }
}

/// Glob matcher with `{a,b}` alternative support
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    patterns: Vec<Pattern>,
}

impl GlobMatcher {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut expanded = Vec::new();
        for alternative in expand_braces(pattern) {
            // `**/x` should also match `x` at the root
            if let Some(stripped) = alternative.strip_prefix("**/") {
                expanded.push(stripped.to_string());
            }
            expanded.push(alternative);
        }

        let patterns = expanded
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| Error::InvalidArgument {
                    message: format!("Invalid file pattern '{}': {}", pattern, e),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    pub fn matches(&self, relative: &Path) -> bool {
        let normalized = relative.to_string_lossy().replace('\\', "/");
        let options = MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.patterns
            .iter()
            .any(|p| p.matches_with(&normalized, options))
    }
}

/// Expand shell-style brace alternatives: `*.{h,cpp}` -> `*.h`, `*.cpp`
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    let mut depth = 0usize;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, c) in pattern[open..].char_indices() {
        let index = open + i;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(index);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(index),
            _ => {}
        }
    }

    // Unbalanced braces are taken literally
    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];

    let mut bounds = vec![open];
    bounds.extend(splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let option = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{}{}{}", prefix, option, suffix))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // Non-hidden prefix so the walker's hidden-file filter leaves the root alone
    fn temp_root() -> TempDir {
        tempfile::Builder::new().prefix("walk").tempdir().unwrap()
    }

    #[test]
    fn test_expand_braces() {
        assert_eq!(expand_braces("**/*.h"), vec!["**/*.h"]);
        assert_eq!(expand_braces("**/*.{h,cpp}"), vec!["**/*.h", "**/*.cpp"]);
        assert_eq!(
            expand_braces("{a,b}/*.{h,cpp}"),
            vec!["a/*.h", "a/*.cpp", "b/*.h", "b/*.cpp"]
        );
        assert_eq!(expand_braces("broken{a,b"), vec!["broken{a,b"]);
    }

    #[test]
    fn test_glob_matcher() {
        let matcher = GlobMatcher::new("**/*.{h,cpp}").unwrap();
        assert!(matcher.matches(Path::new("Actor.h")));
        assert!(matcher.matches(Path::new("Runtime/Engine/Actor.cpp")));
        assert!(!matcher.matches(Path::new("Runtime/Engine/Build.cs")));

        let top_level = GlobMatcher::new("*.h").unwrap();
        assert!(top_level.matches(Path::new("Actor.h")));
        assert!(!top_level.matches(Path::new("Engine/Actor.h")));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(matches!(
            GlobMatcher::new("[").unwrap_err(),
            Error::InvalidArgument { .. }
        ));
    }

    #[test]
    fn test_walk_filters_and_sorts() {
        let dir = temp_root();
        fs::create_dir_all(dir.path().join("Source/Runtime")).unwrap();
        fs::write(dir.path().join("Source/Runtime/B.h"), "class B {};").unwrap();
        fs::write(dir.path().join("Source/Runtime/A.cpp"), "").unwrap();
        fs::write(dir.path().join("Source/notes.txt"), "").unwrap();

        let files = FileWalker::new(dir.path()).walk("**/*.{h,cpp}").unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("A.cpp"));
        assert!(files[1].ends_with("B.h"));
        assert!(files.iter().all(|f| f.is_absolute()));
    }

    #[test]
    fn test_walk_skips_oversized_files() {
        let dir = temp_root();
        fs::write(dir.path().join("Big.h"), "x".repeat(100)).unwrap();
        fs::write(dir.path().join("Small.h"), "x").unwrap();

        let files = FileWalker::new(dir.path())
            .with_max_file_size(10)
            .walk("**/*.h")
            .unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("Small.h"));
    }
}
