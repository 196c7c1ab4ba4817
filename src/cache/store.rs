use crate::cache::BoundedCache;
use crate::extract::ClassInfo;
use crate::knowledge::ApiReference;
use std::path::PathBuf;
use std::sync::Arc;
use tree_sitter::{Query, Tree};

/// The analyzer's four caches, all sharing one capacity
pub struct CacheStore {
    /// Parsed trees by absolute file path
    pub trees: BoundedCache<PathBuf, Tree>,
    /// Compiled queries by cache key (`class`, `ref:<kind>:<identifier>`)
    pub queries: BoundedCache<String, Arc<Query>>,
    /// Extracted classes by name; a later extraction replaces an earlier one
    pub classes: BoundedCache<String, ClassInfo>,
    /// Synthesized references by class name
    pub api: BoundedCache<String, ApiReference>,
}

impl CacheStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            trees: BoundedCache::new("tree", capacity),
            queries: BoundedCache::new("query", capacity),
            classes: BoundedCache::new("class", capacity),
            api: BoundedCache::new("api", capacity),
        }
    }

    pub fn clear(&self) {
        self.trees.clear();
        self.queries.clear();
        self.classes.clear();
        self.api.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{CppParser, TreeParser};

    fn class(name: &str) -> ClassInfo {
        ClassInfo {
            name: name.to_string(),
            file: PathBuf::from("A.h"),
            line: 1,
            superclasses: Vec::new(),
            interfaces: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            comments: Vec::new(),
        }
    }

    #[test]
    fn test_caches_share_capacity() {
        let store = CacheStore::new(2);
        assert_eq!(store.trees.capacity(), 2);
        assert_eq!(store.api.capacity(), 2);

        store.classes.put("A".to_string(), class("A"));
        store.classes.put("B".to_string(), class("B"));
        store.classes.put("C".to_string(), class("C"));
        assert_eq!(store.classes.keys(), vec!["B".to_string(), "C".to_string()]);
    }

    #[test]
    fn test_clear_empties_every_tier() {
        let store = CacheStore::new(10);
        let tree = CppParser.parse("class A {};").unwrap();
        store.trees.put(PathBuf::from("A.h"), tree);
        store.classes.put("A".to_string(), class("A"));

        store.clear();
        assert!(store.trees.is_empty());
        assert!(store.classes.is_empty());
    }
}
