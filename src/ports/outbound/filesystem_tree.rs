use crate::layer_build::domain::FsEntry;
use crate::shared::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// FilesystemTree port for the root filesystem under construction
///
/// Paths are interpreted relative to the tree root; a leading `/` is
/// accepted and ignored. Symlinks in intermediate components are followed
/// within the tree, never onto the host.
///
/// A tree has a single owner for the duration of a build. Concurrent
/// builds must use independent trees.
pub trait FilesystemTree {
    /// Whether an entry exists at `path` (the last component is not followed)
    fn exists(&self, path: &Path) -> bool;

    /// Entry at `path` without following a final symlink
    ///
    /// # Errors
    /// Returns an error if no entry exists at `path`
    fn entry(&self, path: &Path) -> Result<&FsEntry>;

    /// Creates `path` and any missing parents as directories
    ///
    /// Existing directories keep their mode.
    ///
    /// # Errors
    /// Returns an error if a component exists and is not a directory
    fn mkdir_all(&mut self, path: &Path, mode: u32) -> Result<()>;

    /// Creates or truncates a regular file; the parent must exist
    fn write_file(&mut self, path: &Path, contents: &[u8], mode: u32) -> Result<()>;

    /// Contents of the regular file at `path`, following symlinks
    ///
    /// # Errors
    /// Returns an error if `path` is missing or not a regular file
    fn read_file(&self, path: &Path) -> Result<Vec<u8>>;

    /// Names of the direct children of a directory, sorted
    fn read_dir(&self, path: &Path) -> Result<Vec<OsString>>;

    /// Creates a symlink at `link` pointing to `target`
    ///
    /// # Errors
    /// Returns an error if `link` already exists or its parent is missing
    fn symlink(&mut self, target: &Path, link: &Path) -> Result<()>;

    /// Creates a hardlink at `link` to the existing entry `source`
    fn hardlink(&mut self, source: &Path, link: &Path) -> Result<()>;

    /// Creates a character device node
    fn mknod_char(&mut self, path: &Path, mode: u32, major: u32, minor: u32) -> Result<()>;

    /// Sets permission bits
    fn chmod(&mut self, path: &Path, mode: u32) -> Result<()>;

    /// Records explicit ownership
    fn chown(&mut self, path: &Path, uid: u32, gid: u32) -> Result<()>;

    /// Every entry with its root-relative path, parents before children,
    /// in a stable order
    fn walk(&self) -> Vec<(PathBuf, &FsEntry)>;
}
