use std::path::PathBuf;

/// A package chosen by the external resolver
///
/// Read-only to the build; the SBOM generators describe one node per entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedPackage {
    pub name: String,
    pub version: String,
    pub license: String,
    pub maintainer: String,
    pub description: String,
    pub url: String,
    /// Raw digest bytes (SHA-1 for apk control sections)
    pub checksum: Vec<u8>,
    pub architecture: String,
    pub origin: String,
}

impl ResolvedPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Default::default()
        }
    }
}

/// Ownership and mode recorded for an installed path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathAttributes {
    pub uid: u32,
    pub gid: u32,
    pub mode: u32,
}

/// One directory or file a package installed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPath {
    pub path: PathBuf,
    pub is_dir: bool,
    pub attributes: Option<PathAttributes>,
}

/// A package as recorded in the installed database of the tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstalledPackage {
    pub package: ResolvedPackage,
    pub paths: Vec<InstalledPath>,
}

impl InstalledPackage {
    pub fn name(&self) -> &str {
        &self.package.name
    }

    pub fn version(&self) -> &str {
        &self.package.version
    }
}
