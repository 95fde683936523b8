use super::FilesystemTree;
use crate::shared::Result;
use std::collections::BTreeMap;

/// SupervisionTreeWriter port for process-supervision configuration
///
/// Materializes one supervised service per entry, as a single step.
pub trait SupervisionTreeWriter {
    /// Writes the supervision tree for `services` (name to command line)
    ///
    /// # Errors
    /// Returns an error if any file of the supervision tree cannot be written
    fn write_supervision_tree(
        &self,
        tree: &mut dyn FilesystemTree,
        services: &BTreeMap<String, String>,
    ) -> Result<()>;
}
