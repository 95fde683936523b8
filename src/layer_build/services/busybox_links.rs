use crate::layer_build::domain::InstalledPackage;
use crate::ports::outbound::FilesystemTree;
use crate::shared::Result;
use anyhow::Context;
use std::path::{Path, PathBuf};

const BUSYBOX_BINARY: &str = "/bin/busybox";
const BUSYBOX_PACKAGE: &str = "busybox";
const BUSYBOX_PATHS_DIR: &str = "etc/busybox-paths.d";

/// Applet paths used when the package ships no `busybox-paths.d` list
const DEFAULT_APPLETS: &[&str] = &[
    "/bin/ash",
    "/bin/cat",
    "/bin/chgrp",
    "/bin/chmod",
    "/bin/chown",
    "/bin/cp",
    "/bin/date",
    "/bin/dd",
    "/bin/df",
    "/bin/echo",
    "/bin/egrep",
    "/bin/false",
    "/bin/grep",
    "/bin/gunzip",
    "/bin/gzip",
    "/bin/hostname",
    "/bin/kill",
    "/bin/ln",
    "/bin/ls",
    "/bin/mkdir",
    "/bin/mktemp",
    "/bin/mount",
    "/bin/mv",
    "/bin/ps",
    "/bin/pwd",
    "/bin/rm",
    "/bin/rmdir",
    "/bin/sed",
    "/bin/sh",
    "/bin/sleep",
    "/bin/tar",
    "/bin/touch",
    "/bin/true",
    "/bin/umount",
    "/bin/uname",
    "/sbin/ifconfig",
    "/sbin/ip",
    "/usr/bin/[",
    "/usr/bin/awk",
    "/usr/bin/basename",
    "/usr/bin/cut",
    "/usr/bin/dirname",
    "/usr/bin/du",
    "/usr/bin/env",
    "/usr/bin/find",
    "/usr/bin/head",
    "/usr/bin/id",
    "/usr/bin/less",
    "/usr/bin/nc",
    "/usr/bin/sort",
    "/usr/bin/tail",
    "/usr/bin/tee",
    "/usr/bin/test",
    "/usr/bin/tr",
    "/usr/bin/uniq",
    "/usr/bin/vi",
    "/usr/bin/wc",
    "/usr/bin/wget",
    "/usr/bin/which",
    "/usr/bin/xargs",
];

/// Links busybox applets to `/bin/busybox`
///
/// Nothing happens unless `bin/busybox` exists and the busybox package is
/// installed. Existing entries at applet paths are left alone.
///
/// Returns the number of links created.
///
/// # Errors
/// Returns an error if the applet list cannot be read or a link cannot be
/// created
pub fn install_busybox_links(
    tree: &mut dyn FilesystemTree,
    installed: &[InstalledPackage],
) -> Result<usize> {
    if !tree.exists(Path::new(BUSYBOX_BINARY)) {
        return Ok(0);
    }
    let Some(busybox) = installed.iter().find(|p| p.name() == BUSYBOX_PACKAGE) else {
        return Ok(0);
    };

    let applets = applet_paths(tree, busybox.name())?;
    let target = Path::new(BUSYBOX_BINARY);
    let mut created = 0;
    for applet in applets {
        if tree.exists(&applet) {
            continue;
        }
        if let Some(parent) = applet.parent() {
            tree.mkdir_all(parent, 0o755)?;
        }
        tree.symlink(target, &applet)
            .with_context(|| format!("Failed to link busybox applet {}", applet.display()))?;
        created += 1;
    }
    Ok(created)
}

fn applet_paths(tree: &dyn FilesystemTree, package: &str) -> Result<Vec<PathBuf>> {
    let list = Path::new(BUSYBOX_PATHS_DIR).join(package);
    if !tree.exists(&list) {
        return Ok(DEFAULT_APPLETS.iter().map(PathBuf::from).collect());
    }

    let contents = tree
        .read_file(&list)
        .with_context(|| format!("Failed to read {}", list.display()))?;
    Ok(String::from_utf8_lossy(&contents)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .filter(|path| path != Path::new(BUSYBOX_BINARY))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::outbound::filesystem::InMemoryTree;
    use crate::layer_build::domain::{EntryKind, ResolvedPackage};

    fn busybox_installed() -> Vec<InstalledPackage> {
        vec![InstalledPackage {
            package: ResolvedPackage::new("busybox", "1.36.1-r2"),
            paths: Vec::new(),
        }]
    }

    fn tree_with_busybox() -> InMemoryTree {
        let mut tree = InMemoryTree::new();
        tree.mkdir_all(Path::new("bin"), 0o755).unwrap();
        tree.write_file(Path::new("bin/busybox"), b"\x7fELF", 0o755).unwrap();
        tree
    }

    #[test]
    fn test_links_from_paths_file() {
        let mut tree = tree_with_busybox();
        tree.mkdir_all(Path::new(BUSYBOX_PATHS_DIR), 0o755).unwrap();
        tree.write_file(
            Path::new("etc/busybox-paths.d/busybox"),
            b"/bin/busybox\n/bin/sh\n/usr/bin/env\n",
            0o644,
        )
        .unwrap();

        let created = install_busybox_links(&mut tree, &busybox_installed()).unwrap();

        assert_eq!(created, 2);
        assert_eq!(
            tree.entry(Path::new("usr/bin/env")).unwrap().kind,
            EntryKind::Symlink(PathBuf::from("/bin/busybox"))
        );
        assert!(tree.entry(Path::new("bin/busybox")).unwrap().is_file());
    }

    #[test]
    fn test_default_applets() {
        let mut tree = tree_with_busybox();
        let created = install_busybox_links(&mut tree, &busybox_installed()).unwrap();
        assert_eq!(created, DEFAULT_APPLETS.len());
        assert!(tree.entry(Path::new("bin/sh")).unwrap().is_symlink());
    }

    #[test]
    fn test_existing_entries_are_not_replaced() {
        let mut tree = tree_with_busybox();
        tree.write_file(Path::new("bin/sh"), b"#!dash", 0o755).unwrap();

        install_busybox_links(&mut tree, &busybox_installed()).unwrap();

        assert!(tree.entry(Path::new("bin/sh")).unwrap().is_file());
    }

    #[test]
    fn test_no_binary_no_links() {
        let mut tree = InMemoryTree::new();
        assert_eq!(install_busybox_links(&mut tree, &busybox_installed()).unwrap(), 0);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_package_not_installed_no_links() {
        let mut tree = tree_with_busybox();
        assert_eq!(install_busybox_links(&mut tree, &[]).unwrap(), 0);
        assert_eq!(tree.len(), 2);
    }
}
