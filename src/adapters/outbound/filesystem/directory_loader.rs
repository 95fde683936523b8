use super::InMemoryTree;
use crate::layer_build::domain::{EntryKind, FsEntry};
use crate::shared::error::BuildError;
use crate::shared::Result;
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::{FileTypeExt, MetadataExt, PermissionsExt};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// DirectoryLoader adapter for reading a host rootfs into an in-memory tree
///
/// The package installer unpacks into a host directory; this loads that
/// directory without following symlinks. Host ownership is not carried over,
/// since ownership comes from the installed database. Files sharing an inode
/// become hardlinks to the first path seen in sorted order.
pub struct DirectoryLoader;

impl DirectoryLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads every entry below `root`
    ///
    /// # Errors
    /// Returns [`BuildError::InvalidRootfs`] if `root` is not a directory, or
    /// an error if any entry cannot be read
    pub fn load(&self, root: &Path) -> Result<InMemoryTree> {
        let metadata = fs::symlink_metadata(root).map_err(|e| BuildError::InvalidRootfs {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !metadata.is_dir() {
            return Err(BuildError::InvalidRootfs {
                path: root.to_path_buf(),
                reason: "not a directory".to_string(),
            }
            .into());
        }

        let mut tree = InMemoryTree::new();
        let mut inodes: HashMap<(u64, u64), PathBuf> = HashMap::new();
        let walker = WalkDir::new(root)
            .follow_links(false)
            .min_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()));

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
            let path = entry.path();
            let relative = path
                .strip_prefix(root)
                .with_context(|| format!("{} is outside {}", path.display(), root.display()))?
                .to_path_buf();
            let metadata = entry
                .metadata()
                .with_context(|| format!("Failed to read metadata of {}", path.display()))?;
            let mode = metadata.permissions().mode() & 0o7777;
            let file_type = metadata.file_type();

            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_symlink() {
                let target = fs::read_link(path)
                    .with_context(|| format!("Failed to read link {}", path.display()))?;
                EntryKind::Symlink(target)
            } else if file_type.is_file() {
                let inode = (metadata.dev(), metadata.ino());
                match inodes.get(&inode) {
                    Some(first) if metadata.nlink() > 1 => EntryKind::Hardlink(first.clone()),
                    _ => {
                        if metadata.nlink() > 1 {
                            inodes.insert(inode, relative.clone());
                        }
                        let contents = fs::read(path)
                            .with_context(|| format!("Failed to read {}", path.display()))?;
                        EntryKind::File(contents)
                    }
                }
            } else if file_type.is_char_device() {
                let (major, minor) = split_device(metadata.rdev());
                EntryKind::CharDevice { major, minor }
            } else {
                // Sockets, fifos and block devices have no place in a layer.
                continue;
            };

            tree.insert(
                relative,
                FsEntry {
                    kind,
                    mode,
                    owner: None,
                },
            );
        }

        Ok(tree)
    }
}

impl Default for DirectoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// glibc `major()` / `minor()` encoding of a device number
fn split_device(rdev: u64) -> (u32, u32) {
    let major = ((rdev >> 8) & 0xfff) | ((rdev >> 32) & !0xfff);
    let minor = (rdev & 0xff) | ((rdev >> 12) & !0xff);
    (major as u32, minor as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::FilesystemTree;
    use std::os::unix::fs::symlink;
    use tempfile::TempDir;

    #[test]
    fn test_loads_files_dirs_and_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("etc/apk")).unwrap();
        fs::write(root.join("etc/hostname"), "box\n").unwrap();
        fs::set_permissions(root.join("etc/hostname"), fs::Permissions::from_mode(0o640)).unwrap();
        symlink("/etc/hostname", root.join("hostname")).unwrap();

        let tree = DirectoryLoader::new().load(root).unwrap();

        assert!(tree.entry(Path::new("etc/apk")).unwrap().is_dir());
        assert_eq!(tree.read_file(Path::new("etc/hostname")).unwrap(), b"box\n");
        assert_eq!(tree.entry(Path::new("etc/hostname")).unwrap().mode, 0o640);
        assert_eq!(
            tree.entry(Path::new("hostname")).unwrap().kind,
            EntryKind::Symlink(PathBuf::from("/etc/hostname"))
        );
    }

    #[test]
    fn test_shared_inodes_become_hardlinks() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(root.join("a"), "same").unwrap();
        fs::hard_link(root.join("a"), root.join("b")).unwrap();

        let tree = DirectoryLoader::new().load(root).unwrap();

        assert!(tree.entry(Path::new("a")).unwrap().is_file());
        assert_eq!(
            tree.entry(Path::new("b")).unwrap().kind,
            EntryKind::Hardlink(PathBuf::from("a"))
        );
    }

    #[test]
    fn test_non_utf8_names_keep_their_bytes() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        let first = OsStr::from_bytes(b"a\xff");
        let second = OsStr::from_bytes(b"a\xfe");
        fs::write(root.join(first), "first").unwrap();
        fs::write(root.join(second), "second").unwrap();

        let tree = DirectoryLoader::new().load(root).unwrap();

        assert_eq!(tree.len(), 2);
        assert_eq!(tree.read_file(Path::new(first)).unwrap(), b"first");
        assert_eq!(tree.read_file(Path::new(second)).unwrap(), b"second");
        assert_eq!(
            tree.read_dir(Path::new("/")).unwrap(),
            vec![second.to_os_string(), first.to_os_string()]
        );
    }

    #[test]
    fn test_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let result = DirectoryLoader::new().load(&temp_dir.path().join("missing"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Invalid rootfs directory"));
    }

    #[test]
    fn test_root_must_be_directory() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("file");
        fs::write(&file, "").unwrap();
        let result = DirectoryLoader::new().load(&file);
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_split_device() {
        // makedev(1, 3) for /dev/null
        assert_eq!(split_device(0x0103), (1, 3));
        // makedev(5, 1) for /dev/console
        assert_eq!(split_device(0x0501), (5, 1));
    }
}
