//! layercraft - reproducible container image layers with SBOMs
//!
//! This library assembles a root filesystem produced by an apk package
//! installer into a byte-reproducible gzip-compressed tar layer and
//! describes it with SPDX (and optionally CycloneDX) SBOM documents,
//! following hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`layer_build`): Build types and the pure mutation passes
//! - **Application Layer** (`application`): Use cases, DTOs and factories
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use layercraft::prelude::*;
//! use chrono::DateTime;
//! use std::path::Path;
//!
//! # fn main() -> Result<()> {
//! // Load the rootfs the installer populated
//! let mut tree = DirectoryLoader::new().load(Path::new("rootfs"))?;
//!
//! // Create use case
//! let use_case = BuildLayerUseCase::new(
//!     ApkDatabaseInstaller::new(),
//!     S6SupervisionWriter::new(),
//!     StderrProgressReporter::new(),
//! );
//!
//! // Execute
//! let epoch = DateTime::from_timestamp(0, 0).unwrap();
//! let metadata = BuildMetadata::new(
//!     ImageInfo::new("base", epoch),
//!     OsInfo::default(),
//!     OutputPaths::new("out"),
//! );
//! let request = BuildRequest::new(metadata, ImageConfiguration::default());
//! let response = use_case.execute(request, &mut tree)?;
//! println!("{}", response.tarball.digest);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod layer_build;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::archive::TarballEncoder;
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{DirectoryLoader, IndexWriter, InMemoryTree};
    pub use crate::adapters::outbound::generators::{CycloneDxGenerator, SpdxGenerator};
    pub use crate::adapters::outbound::installer::ApkDatabaseInstaller;
    pub use crate::adapters::outbound::supervision::S6SupervisionWriter;
    pub use crate::application::dto::{BuildRequest, BuildResponse, SbomFormat};
    pub use crate::application::factories::SbomGeneratorFactory;
    pub use crate::application::use_cases::{AssembleFilesystemUseCase, BuildLayerUseCase};
    pub use crate::layer_build::domain::{
        Architecture, BuildMetadata, BuildStep, ContentDigest, EntryKind, FsEntry,
        ImageConfiguration, ImageInfo, InstalledPackage, OsInfo, OutputPaths, Ownership,
        ResolvedPackage, TarballOutput,
    };
    pub use crate::ports::outbound::{
        FilesystemTree, PackageInstaller, ProgressReporter, SbomGenerator, SupervisionTreeWriter,
    };
    pub use crate::shared::Result;
}
