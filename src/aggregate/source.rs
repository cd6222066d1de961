//! Ordered source directories for member files.

use std::path::{Path, PathBuf};

use crate::error::AggregateError;

/// Directories searched for member files; the first match wins.
#[derive(Debug, Clone)]
pub struct SourceDirs {
    dirs: Vec<PathBuf>,
}

impl SourceDirs {
    /// The manifest's own directory first, then `extra` in order.
    pub fn new(manifest_dir: &Path, extra: &[PathBuf]) -> Self {
        let mut dirs = Vec::with_capacity(1 + extra.len());
        dirs.push(manifest_dir.to_path_buf());
        dirs.extend(extra.iter().cloned());
        Self { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Locate `name` (a manifest value) in the first directory holding it.
    pub fn find(&self, name: &str) -> Result<PathBuf, AggregateError> {
        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| AggregateError::ResourceNotFound {
                name: name.to_string(),
                searched: self.dirs.clone(),
            })
    }
}
