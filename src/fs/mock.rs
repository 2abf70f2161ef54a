// src/fs/mock.rs

use super::FileSystem;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem: a set of files and a set of directories.
///
/// Adding a path implicitly adds all of its parent directories.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashSet<PathBuf>>>,
    dirs: Arc<Mutex<HashSet<PathBuf>>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.add_dir(parent);
        }
        if let Ok(mut files) = self.files.lock() {
            files.insert(path.to_path_buf());
        }
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let Ok(mut dirs) = self.dirs.lock() else {
            return;
        };
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            dirs.insert(ancestor.to_path_buf());
        }
    }

    pub fn is_dir(&self, path: &Path) -> bool {
        self.dirs
            .lock()
            .map(|dirs| dirs.contains(path))
            .unwrap_or(false)
    }

    fn has_file(&self, path: &Path) -> bool {
        self.files
            .lock()
            .map(|files| files.contains(path))
            .unwrap_or(false)
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.has_file(path) || self.is_dir(path)
    }
}
