//! Per-render scratch files that delete themselves.

use std::path::{Path, PathBuf};

use log::warn;
use uuid::Uuid;

/// A uniquely named file path removed from disk when dropped
///
/// The file itself is created lazily by whoever writes to `path()`; the guard
/// only owns the name and the cleanup, so it also covers files a backend
/// may or may not have produced.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    /// `<dir>/cardshot-<uuid>.<ext>`
    pub fn new(dir: &Path, ext: &str) -> Self {
        let name = format!("cardshot-{}.{}", Uuid::new_v4().simple(), ext);
        Self { path: dir.join(name) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!("failed to remove scratch file {}: {}", self.path.display(), e),
        }
    }
}
