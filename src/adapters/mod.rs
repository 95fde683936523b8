/// Adapters layer - Infrastructure implementations
///
/// This layer contains concrete implementations of the ports,
/// providing the actual integration with the host filesystem, the
/// console and the SBOM output formats.
pub mod outbound;
