use std::fmt;
use std::path::PathBuf;

/// `algorithm:hex` content digest
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    algorithm: String,
    hex: String,
}

impl ContentDigest {
    pub fn sha256(hex: impl Into<String>) -> Self {
        Self {
            algorithm: "sha256".to_string(),
            hex: hex.into(),
        }
    }

    /// Parses `algorithm:hex`; a bare value is taken as sha256.
    pub fn parse(value: &str) -> Self {
        match value.split_once(':') {
            Some((algorithm, hex)) => Self {
                algorithm: algorithm.to_string(),
                hex: hex.to_string(),
            },
            None => Self::sha256(value),
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn hex(&self) -> &str {
        &self.hex
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.hex)
    }
}

/// Result of encoding the tree into a compressed layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TarballOutput {
    pub path: PathBuf,
    /// Digest of the uncompressed tar stream
    pub diff_id: ContentDigest,
    /// Digest of the compressed blob as stored
    pub digest: ContentDigest,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let digest = ContentDigest::sha256("abc123");
        assert_eq!(digest.to_string(), "sha256:abc123");
    }

    #[test]
    fn test_parse_combined() {
        let digest = ContentDigest::parse("sha512:deadbeef");
        assert_eq!(digest.algorithm(), "sha512");
        assert_eq!(digest.hex(), "deadbeef");
    }

    #[test]
    fn test_parse_bare_value_defaults_to_sha256() {
        let digest = ContentDigest::parse("deadbeef");
        assert_eq!(digest.algorithm(), "sha256");
        assert_eq!(digest.to_string(), "sha256:deadbeef");
    }
}
