//! Per-step screenshot store
//!
//! Saving is best-effort: a screenshot that cannot be taken or written is
//! logged and reported, and the step result stands.

use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::common::config::ArtifactsConfig;
use crate::common::{paths, Error};

/// Where step screenshots go
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    enabled: bool,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            enabled: true,
        }
    }

    /// A store that never writes anything
    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn from_config(config: &ArtifactsConfig) -> Self {
        if !config.enabled {
            return Self::disabled();
        }
        Self::new(
            config
                .dir
                .clone()
                .unwrap_or_else(paths::default_artifact_dir),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Deterministic file path for a step
    pub fn path_for(&self, step_number: usize) -> PathBuf {
        self.dir.join(format!("Test {} screenshot.png", step_number))
    }

    /// Write a screenshot for a step, overwriting any previous run
    ///
    /// Returns the path on success and `None` on any failure.
    pub fn save(&self, step_number: usize, png: &[u8]) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }

        let path = self.path_for(step_number);
        let written = std::fs::create_dir_all(&self.dir).and_then(|_| std::fs::write(&path, png));

        match written {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Screenshot saved");
                println!("    {} {}", "Screenshot saved to:".dimmed(), path.display());
                Some(path)
            }
            Err(e) => {
                self.report_failure(&Error::ArtifactWriteFailed {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
                None
            }
        }
    }

    /// Log a capture failure without escalating it
    pub fn report_failure(&self, error: &Error) {
        tracing::warn!(error = %error, "Error saving screenshot");
        println!("    {} {}", "Error saving screenshot:".yellow(), error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_pattern() {
        let store = ArtifactStore::new("/tmp/shots");
        assert_eq!(
            store.path_for(3),
            PathBuf::from("/tmp/shots/Test 3 screenshot.png")
        );
    }

    #[test]
    fn test_save_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested"));

        let first = store.save(1, b"first").unwrap();
        let second = store.save(1, b"second").unwrap();

        assert_eq!(first, second);
        assert_eq!(std::fs::read(&second).unwrap(), b"second");
    }

    #[test]
    fn test_unwritable_dir_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the directory should be
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let store = ArtifactStore::new(&blocker);
        assert!(store.save(2, b"png").is_none());
    }

    #[test]
    fn test_disabled_store_writes_nothing() {
        let store = ArtifactStore::from_config(&ArtifactsConfig {
            enabled: false,
            dir: None,
        });
        assert!(!store.is_enabled());
        assert!(store.save(1, b"png").is_none());
    }
}
