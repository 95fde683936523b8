use crate::adapters::outbound::generators::{CycloneDxGenerator, SpdxGenerator};
use crate::application::dto::SbomFormat;
use crate::ports::outbound::SbomGenerator;

/// Factory for creating SBOM generators
///
/// This factory is the registry of generator capabilities: every
/// `SbomFormat` maps to exactly one `SbomGenerator` implementation.
pub struct SbomGeneratorFactory;

impl SbomGeneratorFactory {
    /// Creates a generator instance for the specified format
    ///
    /// # Examples
    /// ```
    /// use layercraft::application::dto::SbomFormat;
    /// use layercraft::application::factories::SbomGeneratorFactory;
    ///
    /// let generator = SbomGeneratorFactory::create(SbomFormat::Spdx);
    /// assert_eq!(generator.ext(), "spdx.json");
    /// ```
    pub fn create(format: SbomFormat) -> Box<dyn SbomGenerator> {
        match format {
            SbomFormat::Spdx => Box::new(SpdxGenerator::new()),
            SbomFormat::CycloneDx => Box::new(CycloneDxGenerator::new()),
        }
    }

    /// Looks a generator up by its key, e.g. `spdx`
    pub fn by_key(key: &str) -> Option<Box<dyn SbomGenerator>> {
        [SbomFormat::Spdx, SbomFormat::CycloneDx]
            .into_iter()
            .find(|format| format.key() == key)
            .map(Self::create)
    }

    /// Returns the progress message for the specified format
    ///
    /// # Examples
    /// ```
    /// use layercraft::application::dto::SbomFormat;
    /// use layercraft::application::factories::SbomGeneratorFactory;
    ///
    /// let message = SbomGeneratorFactory::progress_message(SbomFormat::Spdx);
    /// assert_eq!(message, "📝 Generating SPDX 2.2 JSON SBOM...");
    /// ```
    pub fn progress_message(format: SbomFormat) -> &'static str {
        match format {
            SbomFormat::Spdx => "📝 Generating SPDX 2.2 JSON SBOM...",
            SbomFormat::CycloneDx => "📝 Generating CycloneDX 1.4 JSON SBOM...",
        }
    }
}
