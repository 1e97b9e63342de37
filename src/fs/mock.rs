// src/fs/mock.rs

use super::{FileSystem, PLANFILE_MODE};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct MockFile {
    pub contents: Vec<u8>,
    pub mode: u32,
}

/// In-memory filesystem for tests.
///
/// Clones share the same storage, so a test can keep one handle and give
/// another to the runner.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    files: Arc<Mutex<HashMap<PathBuf, MockFile>>>,
    fail_writes: Arc<Mutex<bool>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file as if it already existed on disk (mode 0644).
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let mut files = self.files.lock().unwrap();
        files.insert(
            path.as_ref().to_path_buf(),
            MockFile {
                contents: content.into(),
                mode: 0o644,
            },
        );
    }

    /// Make every subsequent `write_private` fail.
    pub fn fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<MockFile> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.files.lock().unwrap().contains_key(path)
    }

    fn write_private(&self, path: &Path, contents: &[u8]) -> Result<()> {
        if *self.fail_writes.lock().unwrap() {
            return Err(anyhow!("permission denied: {:?}", path));
        }
        let mut files = self.files.lock().unwrap();
        files.insert(
            path.to_path_buf(),
            MockFile {
                contents: contents.to_vec(),
                mode: PLANFILE_MODE,
            },
        );
        Ok(())
    }
}
