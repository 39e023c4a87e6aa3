use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Local file that stages a downloaded photo before upload
///
/// The file is deleted when the guard is dropped, on every exit path of the
/// save, including failed downloads that left a partial file behind.
#[derive(Debug)]
pub struct ScratchFile {
    path: PathBuf,
}

impl ScratchFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        log::info!("Deleting '{}'", self.path.display());
        match fs_err::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to delete scratch file: {}", e),
        }
    }
}
