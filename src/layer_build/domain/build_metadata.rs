use super::Architecture;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Identity of the image and layer being built
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub name: String,
    pub repository: Option<String>,
    /// Full tag references (`registry/repo:tag`). The pipeline may append.
    pub tags: Vec<String>,
    pub reference: Option<String>,
    /// `algorithm:hex`, known only once an image manifest exists
    pub image_digest: Option<String>,
    /// `sha256:hex` of the compressed layer, filled after encoding
    pub layer_digest: String,
    pub architecture: Option<Architecture>,
    pub source_date_epoch: DateTime<Utc>,
}

impl ImageInfo {
    pub fn new(name: impl Into<String>, source_date_epoch: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            repository: None,
            tags: Vec::new(),
            reference: None,
            image_digest: None,
            layer_digest: String::new(),
            architecture: None,
            source_date_epoch,
        }
    }

    /// Tag portion of the first tag reference (`latest` for `cgr.dev/foo:latest`)
    pub fn primary_tag(&self) -> Option<&str> {
        let first = self.tags.first()?;
        Some(split_tag(first).1.unwrap_or(first.as_str()))
    }
}

/// Splits `registry:5000/repo:tag` into (`registry:5000/repo`, `Some("tag")`).
///
/// A colon before the last `/` belongs to a registry port, not a tag.
pub fn split_tag(reference: &str) -> (&str, Option<&str>) {
    let last_slash = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
    match reference[last_slash..].rfind(':') {
        Some(colon) => {
            let at = last_slash + colon;
            (&reference[..at], Some(&reference[at + 1..]))
        }
        None => (reference, None),
    }
}

/// Operating system identity, as written to os-release and package-urls
#[derive(Debug, Clone, Default)]
pub struct OsInfo {
    pub id: String,
    pub name: String,
    pub version: String,
}

/// Where the build writes its artifacts
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub output_dir: PathBuf,
    /// Overrides the default `<output_dir>/layer.tar.gz`
    pub tarball_path: Option<PathBuf>,
}

impl OutputPaths {
    pub const DEFAULT_TARBALL_NAME: &'static str = "layer.tar.gz";

    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            tarball_path: None,
        }
    }

    pub fn tarball(&self) -> PathBuf {
        self.tarball_path
            .clone()
            .unwrap_or_else(|| self.output_dir.join(Self::DEFAULT_TARBALL_NAME))
    }
}

/// Everything the build knows about the artifact it is producing.
///
/// Read-only during a build, except that the additional-tags step may
/// append to `image.tags` and the encoder fills `image.layer_digest`.
#[derive(Debug, Clone)]
pub struct BuildMetadata {
    pub image: ImageInfo,
    pub os: OsInfo,
    pub output: OutputPaths,
}

impl BuildMetadata {
    pub fn new(image: ImageInfo, os: OsInfo, output: OutputPaths) -> Self {
        Self { image, os, output }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn epoch() -> DateTime<Utc> {
        Utc.timestamp_opt(0, 0).unwrap()
    }

    #[test]
    fn test_split_tag_simple() {
        assert_eq!(split_tag("alpine:3.19"), ("alpine", Some("3.19")));
    }

    #[test]
    fn test_split_tag_with_registry_port() {
        assert_eq!(
            split_tag("localhost:5000/base:latest"),
            ("localhost:5000/base", Some("latest"))
        );
        assert_eq!(split_tag("localhost:5000/base"), ("localhost:5000/base", None));
    }

    #[test]
    fn test_primary_tag() {
        let mut info = ImageInfo::new("base", epoch());
        assert_eq!(info.primary_tag(), None);

        info.tags.push("cgr.dev/chainguard/base:latest".to_string());
        info.tags.push("cgr.dev/chainguard/base:1.0".to_string());
        assert_eq!(info.primary_tag(), Some("latest"));
    }

    #[test]
    fn test_primary_tag_without_tag_part() {
        let mut info = ImageInfo::new("base", epoch());
        info.tags.push("edge".to_string());
        assert_eq!(info.primary_tag(), Some("edge"));
    }

    #[test]
    fn test_default_tarball_path() {
        let output = OutputPaths::new("/out");
        assert_eq!(output.tarball(), PathBuf::from("/out/layer.tar.gz"));

        let output = OutputPaths {
            output_dir: PathBuf::from("/out"),
            tarball_path: Some(PathBuf::from("/elsewhere/custom.tgz")),
        };
        assert_eq!(output.tarball(), PathBuf::from("/elsewhere/custom.tgz"));
    }
}
