/// SBOM document format
///
/// Each format maps to one registered `SbomGenerator`. SPDX is the default
/// and always available; CycloneDX is an optional extra document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SbomFormat {
    /// SPDX 2.2 JSON (default)
    Spdx,
    /// CycloneDX 1.4 JSON
    CycloneDx,
}

impl SbomFormat {
    /// Selector shared with `SbomGenerator::key`
    pub fn key(self) -> &'static str {
        match self {
            SbomFormat::Spdx => "spdx",
            SbomFormat::CycloneDx => "cyclonedx",
        }
    }
}

impl std::str::FromStr for SbomFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spdx" | "spdx-json" => Ok(SbomFormat::Spdx),
            "cyclonedx" | "cdx" => Ok(SbomFormat::CycloneDx),
            _ => Err(format!(
                "Invalid SBOM format: {}. Please specify 'spdx' or 'cyclonedx'",
                s
            )),
        }
    }
}

impl std::fmt::Display for SbomFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
