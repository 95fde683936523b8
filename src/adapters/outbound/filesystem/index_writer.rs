use crate::shared::Result;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

/// File name an image index is written under
pub const INDEX_FILE_NAME: &str = "index.json";

/// IndexWriter adapter for the externally built image index
///
/// The index document is not generated here; its raw bytes are written
/// verbatim so its digest stays what the producer computed.
pub struct IndexWriter {
    output_dir: PathBuf,
}

impl IndexWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Writes `raw` to `<output_dir>/index.json` with mode 0644
    ///
    /// # Returns
    /// The written path and its size in bytes
    ///
    /// # Errors
    /// Returns an error if the output directory is missing, the target is a
    /// symbolic link, or the write fails
    pub fn write(&self, raw: &[u8]) -> Result<(PathBuf, u64)> {
        if !self.output_dir.is_dir() {
            anyhow::bail!(
                "Output directory does not exist: {}",
                self.output_dir.display()
            );
        }

        let path = self.output_dir.join(INDEX_FILE_NAME);
        reject_symlink(&path)?;

        fs::write(&path, raw).with_context(|| format!("Failed to write {}", path.display()))?;
        set_mode(&path, 0o644)?;

        let size = fs::metadata(&path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();
        Ok((path, size))
    }
}

fn reject_symlink(path: &Path) -> Result<()> {
    if let Ok(metadata) = fs::symlink_metadata(path) {
        if metadata.is_symlink() {
            anyhow::bail!(
                "Security: {} is a symbolic link. For security reasons, writing to symbolic links is not allowed.",
                path.display()
            );
        }
    }
    Ok(())
}

fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}
