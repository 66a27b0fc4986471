//! Asset copier collaborator.
//!
//! Both stages copy media targets next to their output: Stage A into the
//! intermediate tree, Stage B into the page tree.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rustc_hash::FxHashSet;

use crate::core::BuildError;
use crate::debug;

pub trait AssetCopier {
    /// Copy `source` to `dest`, creating parent directories.
    fn copy(&mut self, source: &Path, dest: &Path) -> Result<(), BuildError>;

    /// Number of files actually written.
    fn copied(&self) -> usize;
}

/// Copies through the file system.
///
/// A destination is written at most once per run, and skipped when it is
/// already newer than its source.
#[derive(Debug, Default)]
pub struct FsCopier {
    seen: FxHashSet<PathBuf>,
    copied: usize,
}

impl FsCopier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssetCopier for FsCopier {
    fn copy(&mut self, source: &Path, dest: &Path) -> Result<(), BuildError> {
        if !self.seen.insert(dest.to_path_buf()) {
            return Ok(());
        }
        if dest.exists() && !is_newer_than(source, dest) {
            debug!("asset"; "up to date: {}", dest.display());
            return Ok(());
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(BuildError::io(parent))?;
        }
        fs::copy(source, dest).map_err(BuildError::io(source))?;
        self.copied += 1;
        Ok(())
    }

    fn copied(&self) -> usize {
        self.copied
    }
}

fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether `a` was modified after `b`. False when either is unreadable.
fn is_newer_than(a: &Path, b: &Path) -> bool {
    let (Some(a_time), Some(b_time)) = (mtime(a), mtime(b)) else {
        return false;
    };
    a_time > b_time
}
