use crate::ports::outbound::FilesystemTree;
use crate::shared::Result;
use anyhow::Context;
use std::path::Path;

/// Device nodes every image carries: (path, major, minor)
const CHAR_DEVICES: &[(&str, u32, u32)] = &[
    ("dev/zero", 1, 5),
    ("dev/urandom", 1, 9),
    ("dev/null", 1, 3),
    ("dev/random", 1, 8),
    ("dev/console", 5, 1),
];

/// Creates the standard character devices that are not already present
///
/// # Errors
/// Returns an error if `dev` cannot be created or a node cannot be made
pub fn install_char_devices(tree: &mut dyn FilesystemTree) -> Result<()> {
    tree.mkdir_all(Path::new("dev"), 0o755)?;
    for (path, major, minor) in CHAR_DEVICES {
        let path = Path::new(path);
        if tree.exists(path) {
            continue;
        }
        tree.mknod_char(path, 0o666, *major, *minor)
            .with_context(|| format!("Failed to create device {}", path.display()))?;
    }
    Ok(())
}
