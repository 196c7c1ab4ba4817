use super::{read_source, Analyzer};
use crate::core::error::{Error, Result};
use crate::extract::ClassInfo;
use crate::knowledge::api::{self, ApiQueryOptions, ApiQueryResult, ApiReference};
use crate::knowledge::patterns::{self, CodePatternMatch, PatternInfo};
use crate::knowledge::{Subsystem, SubsystemInfo};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

const SUBSYSTEM_SOURCE_PATTERN: &str = "**/*.{h,cpp}";

impl Analyzer {
    /// Source files and main classes of a named engine subsystem
    pub async fn analyze_subsystem(&self, name: &str) -> Result<SubsystemInfo> {
        let workspace = self.workspace()?;
        let subsystem: Subsystem = name.parse()?;

        let dir = workspace.root.join(subsystem.relative_dir());
        if !dir.is_dir() {
            return Err(Error::DirectoryNotFound { path: dir });
        }

        let source_files = self.walker(&dir).walk(SUBSYSTEM_SOURCE_PATTERN)?;
        let headers: Vec<PathBuf> = source_files
            .iter()
            .filter(|p| p.extension().is_some_and(|ext| ext == "h"))
            .cloned()
            .collect();

        let classes = self
            .structural_scanner()
            .scan(&headers, |path| self.extract_file(path))
            .await?;

        let mut seen = HashSet::new();
        let main_classes = classes
            .into_iter()
            .flatten()
            .map(|c| c.name)
            .filter(|name| !name.is_empty() && seen.insert(name.clone()))
            .collect();

        Ok(SubsystemInfo {
            name: subsystem.to_string(),
            main_classes,
            key_features: Vec::new(),
            dependencies: Vec::new(),
            source_files,
        })
    }

    /// Rank every cached class against a free-text query
    pub async fn query_api_reference(
        &self,
        query: &str,
        options: &ApiQueryOptions,
    ) -> Result<Vec<ApiQueryResult>> {
        self.workspace()?;

        let references: Vec<ApiReference> = self
            .caches
            .classes
            .values()
            .iter()
            .map(|class| self.api_reference(class))
            .collect();

        let results = api::query(&references, query, options);
        debug!(query, candidates = references.len(), results = results.len(), "API query");
        Ok(results)
    }

    /// Cached reference for a class, synthesized on first request
    pub fn api_reference(&self, class: &ClassInfo) -> ApiReference {
        if let Some(cached) = self.caches.api.get(&class.name) {
            return cached;
        }
        let reference = ApiReference::from_class(class);
        self.caches.api.put(class.name.clone(), reference.clone());
        reference
    }

    /// Catalog patterns found in one file. Relative paths resolve against
    /// the root.
    pub async fn detect_patterns(&self, file_path: impl AsRef<Path>) -> Result<Vec<CodePatternMatch>> {
        let workspace = self.workspace()?;

        let path = workspace.root.join(file_path.as_ref());
        if !path.is_file() {
            return Err(Error::InvalidPath { path });
        }

        let content = read_source(&path).await?;
        Ok(patterns::detect_patterns(&content, &path))
    }

    /// Catalog entry for a concept; works before initialization
    pub fn get_best_practices(&self, concept: &str) -> Result<PatternInfo> {
        patterns::best_practices(concept)
    }
}
