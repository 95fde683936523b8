/// SBOM generator adapters, one per output format
mod cyclonedx_generator;
mod json_document;
mod provenance;
mod spdx_generator;

pub use cyclonedx_generator::CycloneDxGenerator;
pub use spdx_generator::SpdxGenerator;
