use crate::layer_build::domain::{OsInfo, TarballOutput};
use std::path::PathBuf;

/// BuildResponse - Internal response DTO from the layer build use case
#[derive(Debug, Clone)]
pub struct BuildResponse {
    pub tarball: TarballOutput,
    /// One path per SBOM document written, in request order
    pub sbom_paths: Vec<PathBuf>,
    /// Final tag list, including tags derived during the build
    pub tags: Vec<String>,
    pub os: OsInfo,
    pub index_path: Option<PathBuf>,
}
