//! Batched concurrent file processing
//!
//! Files are split into fixed-size batches. All files in a batch run
//! concurrently; batches run strictly one after another. A batch is
//! all-or-nothing: the first failing file aborts the batch (and the scan),
//! discarding whatever its siblings produced.
//!
//! @module scan

use crate::core::error::Result;
use futures::future::try_join_all;
use std::future::Future;
use std::path::PathBuf;
use tracing::debug;

/// Default batch size for parse-heavy work
pub const STRUCTURAL_BATCH_SIZE: usize = 10;
/// Default batch size for plain text search
pub const TEXT_BATCH_SIZE: usize = 20;

/// Drives a per-file async operation over a file list in sequential batches
#[derive(Debug, Clone, Copy)]
pub struct BatchScanner {
    batch_size: usize,
}

impl BatchScanner {
    pub fn new(batch_size: usize) -> Self {
        Self {
            batch_size: batch_size.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Process every file and collect the results in file order
    pub async fn scan<T, F, Fut>(&self, files: &[PathBuf], process: F) -> Result<Vec<T>>
    where
        F: FnMut(PathBuf) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.scan_until(files, process, |_| false).await
    }

    /// Like [`scan`](Self::scan), but stops after the first batch for which
    /// `done` returns true. `done` sees the results of that batch only.
    pub async fn scan_until<T, F, Fut, D>(
        &self,
        files: &[PathBuf],
        mut process: F,
        mut done: D,
    ) -> Result<Vec<T>>
    where
        F: FnMut(PathBuf) -> Fut,
        Fut: Future<Output = Result<T>>,
        D: FnMut(&[T]) -> bool,
    {
        let mut results = Vec::with_capacity(files.len());
        let total_batches = (files.len() + self.batch_size - 1) / self.batch_size;

        for (index, batch) in files.chunks(self.batch_size).enumerate() {
            debug!(
                batch = index + 1,
                total = total_batches,
                files = batch.len(),
                "Processing batch"
            );

            let batch_results = try_join_all(batch.iter().cloned().map(&mut process)).await?;
            let stop = done(&batch_results);
            results.extend(batch_results);

            if stop {
                debug!(batch = index + 1, "Scan satisfied early");
                break;
            }
        }

        Ok(results)
    }
}

impl Default for BatchScanner {
    fn default() -> Self {
        Self::new(STRUCTURAL_BATCH_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    #[tokio::test]
    async fn test_scan_preserves_file_order() {
        let files = paths(&["a", "b", "c", "d", "e"]);
        let scanner = BatchScanner::new(2);

        let names = scanner
            .scan(&files, |path| async move { Ok(path.display().to_string()) })
            .await
            .unwrap();

        assert_eq!(names, vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn test_failure_aborts_whole_batch() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.h");
        std::fs::write(&good, "class A {};").unwrap();
        let missing = dir.path().join("missing.h");

        let files = vec![good.clone(), missing.clone(), good.clone()];
        let scanner = BatchScanner::new(10);

        let result = scanner
            .scan(&files, |path| async move {
                tokio::fs::read_to_string(&path)
                    .await
                    .map_err(|e| Error::batch_io(&path, e))
            })
            .await;

        match result {
            Err(Error::BatchIo { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected BatchIo, got {:?}", other.map(|v| v.len())),
        }
    }

    #[tokio::test]
    async fn test_later_batches_not_started_after_failure() {
        let started = Arc::new(AtomicUsize::new(0));
        let files = paths(&["ok1", "bad", "ok2", "ok3"]);
        let scanner = BatchScanner::new(2);

        let counter = Arc::clone(&started);
        let result = scanner
            .scan(&files, move |path| {
                let counter = Arc::clone(&counter);
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if path == PathBuf::from("bad") {
                        Err(Error::batch_io(&path, "boom"))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(started.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_scan_until_stops_after_satisfying_batch() {
        let files = paths(&["a", "b", "target", "c", "d", "e"]);
        let scanner = BatchScanner::new(2);

        let seen = scanner
            .scan_until(
                &files,
                |path| async move { Ok(path.display().to_string()) },
                |batch| batch.iter().any(|name| name == "target"),
            )
            .await
            .unwrap();

        assert_eq!(seen, vec!["a", "b", "target", "c"]);
    }

    #[test]
    fn test_zero_batch_size_clamped() {
        assert_eq!(BatchScanner::new(0).batch_size(), 1);
    }
}
