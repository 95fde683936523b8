use crate::layer_build::domain::{InstalledPackage, InstalledPath, PathAttributes};
use crate::shared::Result;
use anyhow::Context;
use base64::Engine;
use std::path::PathBuf;

/// Location of the installed database inside a root filesystem
pub const INSTALLED_DATABASE_PATH: &str = "lib/apk/db/installed";

/// Parses the apk installed database into package records
///
/// Records are separated by blank lines; each line is `<key>:<value>`.
/// Directory (`F`) and file (`R`) lines are attached to the current package,
/// and `M` / `a` lines record ownership and mode for the path just above them.
///
/// # Errors
/// Returns an error for a line without a single-letter key or for an
/// attribute or checksum value that cannot be decoded
pub fn parse_installed_database(contents: &str) -> Result<Vec<InstalledPackage>> {
    let mut packages = Vec::new();
    let mut current: Option<InstalledPackage> = None;
    let mut directory = PathBuf::new();

    for (index, line) in contents.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            if let Some(package) = current.take() {
                packages.push(package);
            }
            directory = PathBuf::new();
            continue;
        }

        let (key, value) = split_line(line)
            .with_context(|| format!("Malformed installed database line {}", line_number))?;
        let package = current.get_or_insert_with(InstalledPackage::default);

        match key {
            'P' => package.package.name = value.to_string(),
            'V' => package.package.version = value.to_string(),
            'A' => package.package.architecture = value.to_string(),
            'L' => package.package.license = value.to_string(),
            'm' => package.package.maintainer = value.to_string(),
            'T' => package.package.description = value.to_string(),
            'U' => package.package.url = value.to_string(),
            'o' => package.package.origin = value.to_string(),
            'C' => {
                package.package.checksum = decode_checksum(value).with_context(|| {
                    format!("Invalid checksum on installed database line {}", line_number)
                })?;
            }
            'F' => {
                directory = PathBuf::from(value);
                package.paths.push(InstalledPath {
                    path: directory.clone(),
                    is_dir: true,
                    attributes: None,
                });
            }
            'R' => package.paths.push(InstalledPath {
                path: directory.join(value),
                is_dir: false,
                attributes: None,
            }),
            'M' | 'a' => {
                let attributes = parse_attributes(value).with_context(|| {
                    format!("Invalid attributes on installed database line {}", line_number)
                })?;
                let expects_dir = key == 'M';
                if let Some(path) = package.paths.last_mut().filter(|p| p.is_dir == expects_dir) {
                    path.attributes = Some(attributes);
                }
            }
            // Dependency, provider and file-checksum fields are not needed here.
            _ => {}
        }
    }

    if let Some(package) = current.take() {
        packages.push(package);
    }

    Ok(packages)
}

fn split_line(line: &str) -> Result<(char, &str)> {
    let mut chars = line.chars();
    match (chars.next(), chars.next()) {
        (Some(key), Some(':')) => Ok((key, &line[key.len_utf8() + 1..])),
        _ => anyhow::bail!("expected '<key>:<value>', found '{}'", line),
    }
}

/// `Q1` prefixed values are base64 SHA-1 digests; anything else is hex
fn decode_checksum(value: &str) -> Result<Vec<u8>> {
    if let Some(encoded) = value.strip_prefix("Q1") {
        Ok(base64::engine::general_purpose::STANDARD.decode(encoded)?)
    } else {
        Ok(hex::decode(value)?)
    }
}

/// `uid:gid:mode` with an octal mode
fn parse_attributes(value: &str) -> Result<PathAttributes> {
    let mut parts = value.splitn(3, ':');
    let (Some(uid), Some(gid), Some(mode)) = (parts.next(), parts.next(), parts.next()) else {
        anyhow::bail!("expected 'uid:gid:mode', found '{}'", value);
    };
    Ok(PathAttributes {
        uid: uid.parse()?,
        gid: gid.parse()?,
        mode: u32::from_str_radix(mode, 8)?,
    })
}
