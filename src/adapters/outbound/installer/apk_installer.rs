use crate::layer_build::domain::InstalledPackage;
use crate::layer_build::services::{parse_installed_database, INSTALLED_DATABASE_PATH};
use crate::ports::outbound::{FilesystemTree, PackageInstaller};
use crate::shared::error::BuildError;
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;

/// ApkDatabaseInstaller adapter backed by the tree's installed database
///
/// Packages are unpacked into the rootfs before the build starts. Fixating
/// applies the ownership and mode each package recorded for its paths, so
/// the layer carries them regardless of who unpacked the files.
pub struct ApkDatabaseInstaller;

impl ApkDatabaseInstaller {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ApkDatabaseInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageInstaller for ApkDatabaseInstaller {
    fn fixate_world(&self, tree: &mut dyn FilesystemTree) -> Result<()> {
        let packages = self.installed_packages(tree)?;
        for package in &packages {
            for installed in &package.paths {
                let Some(attributes) = installed.attributes else {
                    continue;
                };
                if !tree.exists(&installed.path) {
                    return Err(BuildError::tree(
                        &installed.path,
                        format!(
                            "listed by package {} in the installed database but missing from the tree",
                            package.name()
                        ),
                    )
                    .into());
                }
                tree.chmod(&installed.path, attributes.mode)?;
                tree.chown(&installed.path, attributes.uid, attributes.gid)?;
            }
        }
        Ok(())
    }

    fn installed_packages(&self, tree: &dyn FilesystemTree) -> Result<Vec<InstalledPackage>> {
        let database = Path::new(INSTALLED_DATABASE_PATH);
        if !tree.exists(database) {
            return Ok(Vec::new());
        }
        let contents = tree
            .read_file(database)
            .with_context(|| format!("Failed to read {}", INSTALLED_DATABASE_PATH))?;
        parse_installed_database(&String::from_utf8_lossy(&contents))
            .with_context(|| format!("Failed to parse {}", INSTALLED_DATABASE_PATH))
    }
}
