// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

pub mod mock;

/// Permission bits for planfiles we write ourselves.
pub const PLANFILE_MODE: u32 = 0o600;

/// The filesystem operations the plan step needs.
///
/// The plan step only ever probes for the optional `env/<workspace>.tfvars`
/// file and writes the synthetic planfile for remote ops, so this stays small.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;

    /// Create or truncate `path` and write `contents`, readable and writable
    /// by the owner only.
    fn write_private(&self, path: &Path, contents: &[u8]) -> Result<()>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write_private(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(PLANFILE_MODE);
        }

        let mut file = options
            .open(path)
            .with_context(|| format!("creating file {:?}", path))?;
        file.write_all(contents)
            .with_context(|| format!("writing to file {:?}", path))?;
        Ok(())
    }
}
