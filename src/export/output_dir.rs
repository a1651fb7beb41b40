use crate::error::ExportError;

use log::info;
use std::path::{Path, PathBuf};

/// Existing directory for exported artifacts
///
/// A missing directory is created only if explicitly allowed, there is no interactive prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputDirectory {
    path: PathBuf,
}

impl OutputDirectory {
    pub fn prepare(path: impl Into<PathBuf>, create_if_missing: bool) -> Result<Self, ExportError> {
        let path = path.into();
        if !path.is_dir() {
            if !create_if_missing {
                return Err(ExportError::MissingDirectory(path));
            }
            std::fs::create_dir_all(&path).map_err(ExportError::io(&path))?;
            info!("Created output directory {}", path.display());
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Zero-padded sequential file name, e.g. `007.png`
    pub fn frame_path(&self, index: usize, extension: &str) -> PathBuf {
        self.path.join(format!("{index:03}.{extension}"))
    }
}
