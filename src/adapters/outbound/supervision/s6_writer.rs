use crate::ports::outbound::{FilesystemTree, SupervisionTreeWriter};
use crate::shared::Result;
use anyhow::Context;
use std::collections::BTreeMap;
use std::path::Path;

/// Directory holding one s6 service directory per service
const SERVICE_ROOT: &str = "sv";

/// S6SupervisionWriter adapter laying out an s6 service tree
///
/// Each service becomes `sv/<name>/run`, an executable execline script
/// running the configured command.
pub struct S6SupervisionWriter;

impl S6SupervisionWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for S6SupervisionWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SupervisionTreeWriter for S6SupervisionWriter {
    fn write_supervision_tree(
        &self,
        tree: &mut dyn FilesystemTree,
        services: &BTreeMap<String, String>,
    ) -> Result<()> {
        for (name, command) in services {
            if matches!(name.as_str(), "" | "." | "..") || name.contains('/') {
                anyhow::bail!("Invalid service name '{}'", name);
            }
            let service_dir = Path::new(SERVICE_ROOT).join(name);
            tree.mkdir_all(&service_dir, 0o755)?;
            let run = format!("#!/bin/execlineb -P\n{}\n", command);
            tree.write_file(&service_dir.join("run"), run.as_bytes(), 0o755)
                .with_context(|| format!("Failed to write run script for service {}", name))?;
        }
        Ok(())
    }
}
