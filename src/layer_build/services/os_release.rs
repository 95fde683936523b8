use crate::layer_build::domain::{OsInfo, OsRelease};
use crate::ports::outbound::FilesystemTree;
use crate::shared::error::BuildError;
use crate::shared::Result;
use std::path::Path;

pub const OS_RELEASE_PATH: &str = "etc/os-release";

/// Writes `etc/os-release` from the configured fields
///
/// Unset fields are left out. An existing file (or symlink) is never
/// replaced.
///
/// # Errors
/// Returns [`BuildError::OsReleaseAlreadyPresent`] when the file exists, or
/// an error if it cannot be written
pub fn generate_os_release(tree: &mut dyn FilesystemTree, release: &OsRelease) -> Result<()> {
    let path = Path::new(OS_RELEASE_PATH);
    if tree.exists(path) {
        return Err(BuildError::OsReleaseAlreadyPresent {
            path: path.to_path_buf(),
        }
        .into());
    }

    let fields = [
        ("ID", release.id.as_deref(), false),
        ("NAME", release.name.as_deref(), true),
        ("PRETTY_NAME", release.pretty_name.as_deref(), true),
        ("VERSION_ID", release.version_id.as_deref(), false),
        ("HOME_URL", release.home_url.as_deref(), true),
        ("BUG_REPORT_URL", release.bug_report_url.as_deref(), true),
    ];

    let mut contents = String::new();
    for (key, value, quoted) in fields {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            continue;
        };
        if quoted {
            contents.push_str(&format!("{}=\"{}\"\n", key, value));
        } else {
            contents.push_str(&format!("{}={}\n", key, value));
        }
    }

    tree.mkdir_all(Path::new("etc"), 0o755)?;
    tree.write_file(path, contents.as_bytes(), 0o644)
}

/// Reads `ID`, `NAME` and `VERSION_ID` from os-release contents
pub fn parse_os_release(contents: &str) -> OsInfo {
    let mut info = OsInfo::default();
    for line in contents.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches(|c| c == '"' || c == '\'').to_string();
        match key.trim() {
            "ID" => info.id = value,
            "NAME" => info.name = value,
            "VERSION_ID" => info.version = value,
            _ => {}
        }
    }
    info
}
