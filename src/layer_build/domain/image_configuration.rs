//! Declarative image configuration consumed by the mutation pipeline.
//!
//! These types deserialize straight from the YAML build configuration.

use serde::Deserialize;
use std::collections::BTreeMap;

/// The declarative part of an image build
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImageConfiguration {
    pub accounts: Accounts,
    pub paths: Vec<PathMutation>,
    pub os_release: OsRelease,
    pub entrypoint: Entrypoint,
    pub version_tagging: VersionTagging,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Accounts {
    pub run_as: Option<String>,
    pub users: Vec<User>,
    pub groups: Vec<Group>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub username: String,
    pub uid: u32,
    /// Defaults to the uid
    pub gid: Option<u32>,
    pub shell: Option<String>,
    pub homedir: Option<String>,
}

impl User {
    pub fn gid(&self) -> u32 {
        self.gid.unwrap_or(self.uid)
    }

    pub fn homedir(&self) -> String {
        self.homedir
            .clone()
            .unwrap_or_else(|| format!("/home/{}", self.username))
    }

    pub fn shell(&self) -> &str {
        self.shell.as_deref().unwrap_or("/bin/sh")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Group {
    pub groupname: String,
    pub gid: u32,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathMutationType {
    Directory,
    EmptyFile,
    Hardlink,
    Symlink,
    Permissions,
}

/// One ownership/permission change applied to the tree
#[derive(Debug, Clone, Deserialize)]
pub struct PathMutation {
    pub path: String,
    #[serde(rename = "type")]
    pub mutation_type: PathMutationType,
    #[serde(default)]
    pub uid: u32,
    #[serde(default)]
    pub gid: u32,
    /// Octal in YAML (`0o755`)
    #[serde(default = "default_permissions")]
    pub permissions: u32,
    /// Link target for `hardlink` and `symlink`
    pub source: Option<String>,
    #[serde(default)]
    pub recursive: bool,
}

fn default_permissions() -> u32 {
    0o755
}

/// Fields written to `etc/os-release`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OsRelease {
    pub id: Option<String>,
    pub name: Option<String>,
    pub pretty_name: Option<String>,
    pub version_id: Option<String>,
    pub home_url: Option<String>,
    pub bug_report_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Entrypoint {
    /// Service name to command line
    pub services: BTreeMap<String, String>,
}

/// Derive extra tags from the version of an installed package
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VersionTagging {
    pub package_version_tag: Option<String>,
    pub package_version_tag_stem: bool,
    pub package_version_tag_prefix: Option<String>,
}
