use super::SbomFormat;
use crate::layer_build::domain::{BuildMetadata, ImageConfiguration, ResolvedPackage};

/// BuildRequest - Internal request DTO for the layer build use case
///
/// Carries everything the build reads: the artifact metadata, the
/// declarative image configuration and the output choices.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub metadata: BuildMetadata,
    pub configuration: ImageConfiguration,
    /// SBOM documents to write, in order; duplicates are written once
    pub sbom_formats: Vec<SbomFormat>,
    /// Packages chosen by the resolver. When absent the SBOM describes the
    /// packages recorded in the tree's installed database.
    pub packages: Option<Vec<ResolvedPackage>>,
    /// Externally built image index, written verbatim
    pub index: Option<Vec<u8>>,
}

impl BuildRequest {
    pub fn new(metadata: BuildMetadata, configuration: ImageConfiguration) -> Self {
        Self {
            metadata,
            configuration,
            sbom_formats: vec![SbomFormat::Spdx],
            packages: None,
            index: None,
        }
    }
}
