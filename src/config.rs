//! Configuration file support for layercraft.
//!
//! Provides YAML-based build configuration through `layercraft.yaml` files,
//! including data structures, file loading, and validation.

use anyhow::Context;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

use crate::application::dto::SbomFormat;
use crate::layer_build::domain::{
    Accounts, Architecture, Entrypoint, ImageConfiguration, OsRelease, PathMutation,
    PathMutationType, VersionTagging,
};
use crate::shared::error::BuildError;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "layercraft.yaml";

/// Top-level configuration file schema.
///
/// Image identity and output choices sit next to the declarative image
/// configuration; command-line flags override the identity fields.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub name: Option<String>,
    pub repository: Option<String>,
    pub reference: Option<String>,
    pub tags: Vec<String>,
    pub architecture: Option<String>,
    pub source_date_epoch: Option<i64>,
    pub sbom_formats: Vec<String>,
    pub accounts: Accounts,
    pub paths: Vec<PathMutation>,
    pub os_release: OsRelease,
    pub entrypoint: Entrypoint,
    pub version_tagging: VersionTagging,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    /// The declarative part consumed by the mutation pipeline
    pub fn image_configuration(&self) -> ImageConfiguration {
        ImageConfiguration {
            accounts: self.accounts.clone(),
            paths: self.paths.clone(),
            os_release: self.os_release.clone(),
            entrypoint: self.entrypoint.clone(),
            version_tagging: self.version_tagging.clone(),
        }
    }

    pub fn architecture(&self) -> Result<Option<Architecture>> {
        self.architecture
            .as_deref()
            .map(str::parse)
            .transpose()
    }

    pub fn sbom_formats(&self) -> Result<Vec<SbomFormat>> {
        self.sbom_formats
            .iter()
            .map(|format| format.parse::<SbomFormat>().map_err(invalid))
            .collect()
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

fn invalid(message: String) -> anyhow::Error {
    BuildError::InvalidConfiguration { message }.into()
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    for (i, user) in config.accounts.users.iter().enumerate() {
        if user.username.trim().is_empty() {
            return Err(invalid(format!(
                "accounts.users[{}].username must not be empty.\n\n\
                 💡 Hint: Each user needs a 'username' (e.g., \"nonroot\").",
                i
            )));
        }
    }

    for (i, group) in config.accounts.groups.iter().enumerate() {
        if group.groupname.trim().is_empty() {
            return Err(invalid(format!(
                "accounts.groups[{}].groupname must not be empty.\n\n\
                 💡 Hint: Each group needs a 'groupname' (e.g., \"nonroot\").",
                i
            )));
        }
    }

    for (i, mutation) in config.paths.iter().enumerate() {
        if mutation.path.trim().is_empty() {
            return Err(invalid(format!("paths[{}].path must not be empty.", i)));
        }
        let needs_source = matches!(
            mutation.mutation_type,
            PathMutationType::Hardlink | PathMutationType::Symlink
        );
        if needs_source && mutation.source.as_deref().is_none_or(str::is_empty) {
            return Err(invalid(format!(
                "paths[{}] ({}) is a link and has no source.\n\n\
                 💡 Hint: Set 'source' to the path the link points to.",
                i, mutation.path
            )));
        }
    }

    config
        .architecture()
        .map_err(|e| invalid(format!("architecture: {}", e)))?;
    config.sbom_formats()?;

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    let mut keys: Vec<&String> = config.unknown_fields.keys().collect();
    keys.sort();
    for key in keys {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
