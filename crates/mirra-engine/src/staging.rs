//! Staging area management for two-phase jobs.
//!
//! Each two-phase job owns one private directory under the staging cache
//! root, keyed deterministically from the job's family/category/suite.
//! Acquisition always yields an empty directory, removing any residue from a
//! previous run; release is best-effort and tolerates an already-missing
//! directory. Acquire and release bracket every two-phase strategy
//! execution, including its failure and cancellation paths.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, warn};

/// Private, disposable working directory for one in-flight two-phase job.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Allocate the staging directory for `key` under `cache_root`,
    /// guaranteeing it exists and is empty.
    ///
    /// # Errors
    ///
    /// Returns an error when the cache root or the area itself cannot be
    /// created, or existing residue cannot be removed.
    pub async fn acquire(cache_root: &Path, key: &str) -> Result<Self> {
        fs::create_dir_all(cache_root)
            .await
            .with_context(|| format!("failed to create staging root '{}'", cache_root.display()))?;

        let root = cache_root.join(key);
        match fs::remove_dir_all(&root).await {
            Ok(()) => debug!(path = %root.display(), "cleared staging residue"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                return Err(err).with_context(|| {
                    format!("failed to clear staging residue at '{}'", root.display())
                });
            }
        }
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("failed to create staging area '{}'", root.display()))?;

        Ok(Self { root })
    }

    /// Path of the staging directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Remove the staging directory. Missing directories are not an error;
    /// any other failure is logged and swallowed.
    pub async fn release(self) {
        match fs::remove_dir_all(&self.root).await {
            Ok(()) => debug!(path = %self.root.display(), "released staging area"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => {
                warn!(path = %self.root.display(), error = %err, "failed to release staging area");
            }
        }
    }
}
