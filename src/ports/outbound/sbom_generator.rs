use crate::layer_build::domain::{BuildMetadata, ResolvedPackage};
use crate::shared::Result;
use std::path::Path;

/// SbomGenerator port for one SBOM output format
///
/// Generators are interchangeable and selected by `key()`; `ext()` is the
/// file extension their documents are written with.
pub trait SbomGenerator {
    /// Short selector, e.g. `spdx`
    fn key(&self) -> &'static str;

    /// File extension without the leading dot, e.g. `spdx.json`
    fn ext(&self) -> &'static str;

    /// Writes the SBOM document for a build to `path`
    ///
    /// The file is fully written and closed when this returns `Ok`.
    ///
    /// # Arguments
    /// * `metadata` - Build metadata, with the layer digest already set
    /// * `packages` - Resolved packages in the layer
    /// * `path` - Destination file
    ///
    /// # Errors
    /// Returns an error if the document cannot be serialized or written
    fn generate(
        &self,
        metadata: &BuildMetadata,
        packages: &[ResolvedPackage],
        path: &Path,
    ) -> Result<()>;
}
