use crate::layer_build::domain::{EntryKind, FsEntry, Ownership};
use crate::ports::outbound::FilesystemTree;
use crate::shared::error::BuildError;
use crate::shared::Result;
use std::collections::{BTreeMap, VecDeque};
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// Same limit Linux applies (`MAXSYMLINKS`)
const MAX_SYMLINK_HOPS: usize = 40;

/// InMemoryTree adapter holding the whole root filesystem in memory
///
/// Entries are keyed by root-relative path in a `BTreeMap`, so `walk`
/// yields parents before children in the same order on every machine.
#[derive(Debug, Clone)]
pub struct InMemoryTree {
    root: FsEntry,
    entries: BTreeMap<PathBuf, FsEntry>,
}

impl InMemoryTree {
    pub fn new() -> Self {
        Self {
            root: FsEntry::directory(0o755),
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Inserts an entry at an already-normalized path, replacing any entry there.
    ///
    /// Used by loaders that walk a host directory in parent-first order.
    pub fn insert(&mut self, path: impl Into<PathBuf>, entry: FsEntry) {
        let path: PathBuf = split(&path.into()).into_iter().collect();
        if path.as_os_str().is_empty() {
            self.root = entry;
        } else {
            self.entries.insert(path, entry);
        }
    }

    /// Resolves `path` to the key of the entry it names.
    ///
    /// Symlinks in intermediate components are always followed; the final
    /// component is followed only when `follow_last` is set.
    fn resolve(&self, path: &Path, follow_last: bool) -> Result<PathBuf> {
        let mut pending = split(path);
        let mut resolved = PathBuf::new();
        let mut hops = 0;

        while let Some(part) = pending.pop_front() {
            if part == ".." {
                resolved.pop();
                continue;
            }
            let candidate = resolved.join(&part);
            let is_last = pending.is_empty();
            if let Some(EntryKind::Symlink(target)) = self.entries.get(&candidate).map(|e| &e.kind)
            {
                if !is_last || follow_last {
                    hops += 1;
                    if hops > MAX_SYMLINK_HOPS {
                        return Err(BuildError::tree(path, "too many levels of symbolic links").into());
                    }
                    if target.is_absolute() {
                        resolved = PathBuf::new();
                    }
                    let mut expanded = split(target);
                    expanded.extend(pending.drain(..));
                    pending = expanded;
                    continue;
                }
            }
            resolved = candidate;
        }

        Ok(resolved)
    }

    /// Resolves the parent of `path` and checks it is a directory.
    fn resolve_child(&self, path: &Path) -> Result<PathBuf> {
        let mut parts = split(path);
        let name = parts
            .pop_back()
            .filter(|name| name != "..")
            .ok_or_else(|| BuildError::tree(path, "path has no final component"))?;
        let parent_path: PathBuf = parts.into_iter().collect();
        let parent = self.resolve(&parent_path, true)?;
        if !self.is_directory(&parent) {
            return Err(BuildError::tree(path, "parent directory does not exist").into());
        }
        Ok(parent.join(name))
    }

    fn is_directory(&self, resolved: &Path) -> bool {
        resolved.as_os_str().is_empty() || self.entries.get(resolved).is_some_and(FsEntry::is_dir)
    }

    fn get(&self, resolved: &Path) -> Option<&FsEntry> {
        if resolved.as_os_str().is_empty() {
            Some(&self.root)
        } else {
            self.entries.get(resolved)
        }
    }

    fn get_mut(&mut self, resolved: &Path) -> Option<&mut FsEntry> {
        if resolved.as_os_str().is_empty() {
            Some(&mut self.root)
        } else {
            self.entries.get_mut(resolved)
        }
    }

    /// Applies `update` to the inode `path` names.
    ///
    /// A hardlink shares its source's inode, so the source and every link to
    /// it are updated together.
    fn update_inode(&mut self, path: &Path, update: impl Fn(&mut FsEntry)) -> Result<()> {
        let resolved = self.resolve(path, true)?;
        let inode = match self.get(&resolved).map(|entry| &entry.kind) {
            Some(EntryKind::Hardlink(source)) => source.clone(),
            Some(_) => resolved,
            None => return Err(BuildError::tree(path, "no such file or directory").into()),
        };
        let source = self
            .get_mut(&inode)
            .ok_or_else(|| BuildError::tree(&inode, "hardlink source is missing"))?;
        update(source);
        for entry in self.entries.values_mut() {
            if matches!(&entry.kind, EntryKind::Hardlink(source) if *source == inode) {
                update(entry);
            }
        }
        Ok(())
    }

    fn insert_new(&mut self, path: &Path, entry: FsEntry) -> Result<()> {
        let resolved = self.resolve_child(path)?;
        if self.entries.contains_key(&resolved) {
            return Err(BuildError::tree(path, "file exists").into());
        }
        self.entries.insert(resolved, entry);
        Ok(())
    }
}

impl Default for InMemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a path into normal components, keeping `..` for resolution.
///
/// Components stay `OsString` so host names that are not UTF-8 keep their bytes.
fn split(path: &Path) -> VecDeque<OsString> {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_os_string()),
            Component::ParentDir => Some(OsString::from("..")),
            Component::RootDir | Component::CurDir | Component::Prefix(_) => None,
        })
        .collect()
}

impl FilesystemTree for InMemoryTree {
    fn exists(&self, path: &Path) -> bool {
        self.resolve(path, false)
            .map(|resolved| self.get(&resolved).is_some())
            .unwrap_or(false)
    }

    fn entry(&self, path: &Path) -> Result<&FsEntry> {
        let resolved = self.resolve(path, false)?;
        self.get(&resolved)
            .ok_or_else(|| BuildError::tree(path, "no such file or directory").into())
    }

    fn mkdir_all(&mut self, path: &Path, mode: u32) -> Result<()> {
        let mut current = PathBuf::new();
        for part in split(path) {
            current.push(part);
            let resolved = self.resolve(&current, true)?;
            match self.get(&resolved) {
                Some(entry) if entry.is_dir() => {}
                Some(_) => {
                    return Err(BuildError::tree(&current, "not a directory").into());
                }
                None => {
                    self.entries.insert(resolved, FsEntry::directory(mode));
                }
            }
        }
        Ok(())
    }

    fn write_file(&mut self, path: &Path, contents: &[u8], mode: u32) -> Result<()> {
        let target = self.resolve(path, true)?;
        if let Some(existing) = self.get_mut(&target) {
            return match &mut existing.kind {
                EntryKind::File(data) => {
                    *data = contents.to_vec();
                    Ok(())
                }
                _ => Err(BuildError::tree(path, "not a regular file").into()),
            };
        }
        self.insert_new(&target, FsEntry::file(contents.to_vec(), mode))
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let resolved = self.resolve(path, true)?;
        match self.get(&resolved).map(|entry| &entry.kind) {
            Some(EntryKind::File(data)) => Ok(data.clone()),
            Some(EntryKind::Hardlink(source)) => self.read_file(&source.clone()),
            Some(_) => Err(BuildError::tree(path, "not a regular file").into()),
            None => Err(BuildError::tree(path, "no such file or directory").into()),
        }
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<OsString>> {
        let resolved = self.resolve(path, true)?;
        if !self.is_directory(&resolved) {
            return Err(BuildError::tree(path, "not a directory").into());
        }
        let names = self
            .entries
            .range(resolved.clone()..)
            .take_while(|(key, _)| key.starts_with(&resolved))
            .filter(|(key, _)| key.parent() == Some(resolved.as_path()))
            .filter_map(|(key, _)| key.file_name())
            .map(|name| name.to_os_string())
            .collect();
        Ok(names)
    }

    fn symlink(&mut self, target: &Path, link: &Path) -> Result<()> {
        self.insert_new(link, FsEntry::symlink(target))
    }

    fn hardlink(&mut self, source: &Path, link: &Path) -> Result<()> {
        let resolved_source = self.resolve(source, true)?;
        let source_entry = self
            .get(&resolved_source)
            .ok_or_else(|| BuildError::tree(source, "no such file or directory"))?;
        if !source_entry.is_file() {
            return Err(BuildError::tree(source, "hardlink source is not a regular file").into());
        }
        let entry = FsEntry {
            kind: EntryKind::Hardlink(resolved_source),
            mode: source_entry.mode,
            owner: source_entry.owner,
        };
        self.insert_new(link, entry)
    }

    fn mknod_char(&mut self, path: &Path, mode: u32, major: u32, minor: u32) -> Result<()> {
        let entry = FsEntry {
            kind: EntryKind::CharDevice { major, minor },
            mode: mode & 0o7777,
            owner: None,
        };
        self.insert_new(path, entry)
    }

    fn chmod(&mut self, path: &Path, mode: u32) -> Result<()> {
        self.update_inode(path, |entry| entry.mode = mode & 0o7777)
    }

    fn chown(&mut self, path: &Path, uid: u32, gid: u32) -> Result<()> {
        self.update_inode(path, |entry| entry.owner = Some(Ownership::new(uid, gid)))
    }

    fn walk(&self) -> Vec<(PathBuf, &FsEntry)> {
        self.entries
            .iter()
            .map(|(path, entry)| (path.clone(), entry))
            .collect()
    }
}
