use crate::shared::Result;
use std::fmt;
use std::str::FromStr;

/// Target CPU architecture of the layer
///
/// Accepts both the apk spelling (`x86_64`, `aarch64`) and the OCI platform
/// spelling (`amd64`, `arm64`) and renders either one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Architecture {
    Amd64,
    Arm64,
    ArmV7,
    ArmV6,
    I386,
    Ppc64le,
    S390x,
    Riscv64,
}

impl Architecture {
    /// Name used by apk repositories and the apk package-url qualifier
    pub fn to_apk(self) -> &'static str {
        match self {
            Architecture::Amd64 => "x86_64",
            Architecture::Arm64 => "aarch64",
            Architecture::ArmV7 => "armv7",
            Architecture::ArmV6 => "armhf",
            Architecture::I386 => "x86",
            Architecture::Ppc64le => "ppc64le",
            Architecture::S390x => "s390x",
            Architecture::Riscv64 => "riscv64",
        }
    }

    /// `architecture` field of the OCI platform
    pub fn oci_architecture(self) -> &'static str {
        match self {
            Architecture::Amd64 => "amd64",
            Architecture::Arm64 => "arm64",
            Architecture::ArmV7 | Architecture::ArmV6 => "arm",
            Architecture::I386 => "386",
            Architecture::Ppc64le => "ppc64le",
            Architecture::S390x => "s390x",
            Architecture::Riscv64 => "riscv64",
        }
    }

    /// `variant` field of the OCI platform, when the architecture has one
    pub fn oci_variant(self) -> Option<&'static str> {
        match self {
            Architecture::ArmV7 => Some("v7"),
            Architecture::ArmV6 => Some("v6"),
            _ => None,
        }
    }
}

impl FromStr for Architecture {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let arch = match s.trim().to_lowercase().as_str() {
            "amd64" | "x86_64" => Architecture::Amd64,
            "arm64" | "aarch64" | "arm64/v8" => Architecture::Arm64,
            "armv7" | "arm/v7" => Architecture::ArmV7,
            "armhf" | "arm/v6" | "arm" => Architecture::ArmV6,
            "386" | "x86" | "i386" => Architecture::I386,
            "ppc64le" => Architecture::Ppc64le,
            "s390x" => Architecture::S390x,
            "riscv64" => Architecture::Riscv64,
            other => anyhow::bail!(
                "Unsupported architecture: {}. Expected an apk name (x86_64, aarch64, ...) or an OCI name (amd64, arm64, ...)",
                other
            ),
        };
        Ok(arch)
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_apk())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apk_and_oci_spellings_agree() {
        assert_eq!(
            Architecture::from_str("x86_64").unwrap(),
            Architecture::from_str("amd64").unwrap()
        );
        assert_eq!(
            Architecture::from_str("aarch64").unwrap(),
            Architecture::from_str("arm64").unwrap()
        );
        assert_eq!(
            Architecture::from_str("armv7").unwrap(),
            Architecture::from_str("arm/v7").unwrap()
        );
    }

    #[test]
    fn test_apk_names() {
        assert_eq!(Architecture::Amd64.to_apk(), "x86_64");
        assert_eq!(Architecture::Arm64.to_apk(), "aarch64");
        assert_eq!(Architecture::ArmV6.to_apk(), "armhf");
        assert_eq!(Architecture::I386.to_apk(), "x86");
    }

    #[test]
    fn test_oci_platform() {
        assert_eq!(Architecture::Amd64.oci_architecture(), "amd64");
        assert_eq!(Architecture::ArmV7.oci_architecture(), "arm");
        assert_eq!(Architecture::ArmV7.oci_variant(), Some("v7"));
        assert_eq!(Architecture::Arm64.oci_variant(), None);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(
            Architecture::from_str("AMD64").unwrap(),
            Architecture::Amd64
        );
    }

    #[test]
    fn test_parse_unknown() {
        let result = Architecture::from_str("sparc");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unsupported architecture"));
    }

    #[test]
    fn test_display_uses_apk_name() {
        assert_eq!(Architecture::Ppc64le.to_string(), "ppc64le");
        assert_eq!(Architecture::Amd64.to_string(), "x86_64");
    }
}
