use std::path::PathBuf;

/// Numeric owner of a tree entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub uid: u32,
    pub gid: u32,
}

impl Ownership {
    pub const ROOT: Ownership = Ownership { uid: 0, gid: 0 };

    pub fn new(uid: u32, gid: u32) -> Self {
        Self { uid, gid }
    }
}

/// What a tree entry is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File(Vec<u8>),
    Symlink(PathBuf),
    /// Root-relative path of the entry this one links to
    Hardlink(PathBuf),
    CharDevice { major: u32, minor: u32 },
}

/// One node of the filesystem tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEntry {
    pub kind: EntryKind,
    /// Permission bits only (`0o7777` mask)
    pub mode: u32,
    /// `None` means no explicit owner; archives record it as root.
    pub owner: Option<Ownership>,
}

impl FsEntry {
    pub fn directory(mode: u32) -> Self {
        Self::with_kind(EntryKind::Directory, mode)
    }

    pub fn file(contents: impl Into<Vec<u8>>, mode: u32) -> Self {
        Self::with_kind(EntryKind::File(contents.into()), mode)
    }

    pub fn symlink(target: impl Into<PathBuf>) -> Self {
        Self::with_kind(EntryKind::Symlink(target.into()), 0o777)
    }

    fn with_kind(kind: EntryKind, mode: u32) -> Self {
        Self {
            kind,
            mode: mode & 0o7777,
            owner: None,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntryKind::File(_))
    }

    pub fn is_symlink(&self) -> bool {
        matches!(self.kind, EntryKind::Symlink(_))
    }

    pub fn ownership(&self) -> Ownership {
        self.owner.unwrap_or(Ownership::ROOT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_is_masked_to_permission_bits() {
        let entry = FsEntry::file(b"x".to_vec(), 0o100644);
        assert_eq!(entry.mode, 0o644);
    }

    #[test]
    fn test_default_ownership_is_root() {
        let entry = FsEntry::directory(0o755);
        assert_eq!(entry.ownership(), Ownership::ROOT);
    }

    #[test]
    fn test_explicit_ownership() {
        let mut entry = FsEntry::directory(0o755);
        entry.owner = Some(Ownership::new(65532, 65532));
        assert_eq!(entry.ownership(), Ownership::new(65532, 65532));
    }

    #[test]
    fn test_kind_predicates() {
        assert!(FsEntry::directory(0o755).is_dir());
        assert!(FsEntry::file(Vec::new(), 0o644).is_file());
        assert!(FsEntry::symlink("/bin/busybox").is_symlink());
        assert_eq!(FsEntry::symlink("/bin/busybox").mode, 0o777);
    }
}
