//! Node naming and package-urls shared by the SBOM formats.

use crate::layer_build::domain::{BuildMetadata, ImageInfo, ResolvedPackage};
use crate::layer_build::services::PackageUrl;

/// Registry prefix implied by a reference without a `/`
const DEFAULT_REGISTRY_PREFIX: &str = "index.docker.io/library/";

/// Display name of the layer node
///
/// `name@layer-digest` when the image has a name, the bare layer digest
/// otherwise. A reference overrides both.
pub fn layer_package_name(image: &ImageInfo) -> String {
    if let Some(reference) = image.reference.as_deref().filter(|r| !r.is_empty()) {
        let prefix = if reference.contains('/') {
            ""
        } else {
            DEFAULT_REGISTRY_PREFIX
        };
        return format!("SPDXRef-{}{}", prefix, reference);
    }
    if image.name.is_empty() {
        image.layer_digest.clone()
    } else {
        format!("{}@{}", image.name, image.layer_digest)
    }
}

fn oci_purl(image: &ImageInfo, version: &str) -> PackageUrl {
    PackageUrl::new("oci", image.name.as_str())
        .with_version(version)
        .with_qualifier("tag", image.primary_tag())
        .with_qualifier("repository_url", image.repository.as_deref())
        .with_qualifier(
            "arch",
            image.architecture.map(|arch| arch.oci_architecture()),
        )
}

pub fn layer_purl(image: &ImageInfo) -> PackageUrl {
    oci_purl(image, &image.layer_digest)
}

pub fn image_purl(image: &ImageInfo, image_digest: &str) -> PackageUrl {
    oci_purl(image, image_digest)
}

/// `pkg:apk/<os id>/<name>@<version>?arch=<apk arch>`
pub fn apk_purl(metadata: &BuildMetadata, package: &ResolvedPackage) -> PackageUrl {
    PackageUrl::new("apk", package.name.as_str())
        .with_namespace(metadata.os.id.as_str())
        .with_version(package.version.as_str())
        .with_qualifier(
            "arch",
            metadata.image.architecture.map(|arch| arch.to_apk()),
        )
}
