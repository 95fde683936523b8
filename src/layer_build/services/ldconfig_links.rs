use super::elf_soname::elf_soname;
use crate::layer_build::domain::EntryKind;
use crate::ports::outbound::FilesystemTree;
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;

/// Library directories scanned for shared objects
const LIBRARY_DIRS: &[&str] = &["lib", "usr/lib"];

/// Creates soname symlinks for shared objects in the library directories
///
/// For each regular file whose name contains `.so` and whose `DT_SONAME`
/// differs from the file name, `<dir>/<soname>` is linked to the file when
/// nothing exists there yet. Files that are not ELF shared objects are
/// skipped.
///
/// Returns the number of links created.
///
/// # Errors
/// Returns an error if a library directory or file cannot be read or a link
/// cannot be created
pub fn install_ldconfig_links(tree: &mut dyn FilesystemTree) -> Result<usize> {
    let mut created = 0;
    for dir in LIBRARY_DIRS {
        let dir = Path::new(dir);
        if !tree.exists(dir) {
            continue;
        }

        let mut links = Vec::new();
        for name in tree.read_dir(dir)? {
            let Some(name) = name.to_str().map(str::to_string) else {
                continue;
            };
            if !name.contains(".so") {
                continue;
            }
            let path = dir.join(&name);
            if !matches!(tree.entry(&path)?.kind, EntryKind::File(_) | EntryKind::Hardlink(_)) {
                continue;
            }
            let contents = tree
                .read_file(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            if let Some(soname) = elf_soname(&contents).filter(|soname| *soname != name) {
                links.push((soname, name));
            }
        }

        for (soname, name) in links {
            let link = dir.join(&soname);
            if tree.exists(&link) {
                continue;
            }
            tree.symlink(Path::new(&name), &link)
                .with_context(|| format!("Failed to link {}", link.display()))?;
            created += 1;
        }
    }
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer_build::services::elf_soname::fixtures::elf64_with_soname;
    use crate::adapters::outbound::filesystem::InMemoryTree;
    use std::path::PathBuf;

    #[test]
    fn test_creates_soname_link() {
        let mut tree = InMemoryTree::new();
        tree.mkdir_all(Path::new("usr/lib"), 0o755).unwrap();
        tree.write_file(
            Path::new("usr/lib/libz.so.1.3.1"),
            &elf64_with_soname("libz.so.1"),
            0o755,
        )
        .unwrap();

        assert_eq!(install_ldconfig_links(&mut tree).unwrap(), 1);
        assert_eq!(
            tree.entry(Path::new("usr/lib/libz.so.1")).unwrap().kind,
            EntryKind::Symlink(PathBuf::from("libz.so.1.3.1"))
        );
    }

    #[test]
    fn test_existing_soname_is_kept() {
        let mut tree = InMemoryTree::new();
        tree.mkdir_all(Path::new("lib"), 0o755).unwrap();
        tree.write_file(Path::new("lib/libc.so.6.1"), &elf64_with_soname("libc.so.6"), 0o755)
            .unwrap();
        tree.write_file(Path::new("lib/libc.so.6"), b"other", 0o755).unwrap();

        assert_eq!(install_ldconfig_links(&mut tree).unwrap(), 0);
        assert!(tree.entry(Path::new("lib/libc.so.6")).unwrap().is_file());
    }

    #[test]
    fn test_matching_name_and_non_elf_are_skipped() {
        let mut tree = InMemoryTree::new();
        tree.mkdir_all(Path::new("lib"), 0o755).unwrap();
        tree.write_file(Path::new("lib/libm.so.6"), &elf64_with_soname("libm.so.6"), 0o755)
            .unwrap();
        tree.write_file(Path::new("lib/libfake.so"), b"INPUT(-lc)", 0o644).unwrap();

        assert_eq!(install_ldconfig_links(&mut tree).unwrap(), 0);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_missing_library_dirs() {
        let mut tree = InMemoryTree::new();
        assert_eq!(install_ldconfig_links(&mut tree).unwrap(), 0);
    }
}
