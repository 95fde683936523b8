use super::json_document::write_json_document;
use super::provenance::{apk_purl, image_purl, layer_package_name, layer_purl};
use crate::layer_build::domain::{BuildMetadata, ContentDigest, ResolvedPackage};
use crate::layer_build::services::sanitize_identifier;
use crate::ports::outbound::SbomGenerator;
use crate::shared::Result;
use chrono::SecondsFormat;
use serde::Serialize;
use std::path::Path;

const NOASSERTION: &str = "NOASSERTION";
const SPDX_VERSION: &str = "SPDX-2.2";
const DATA_LICENSE: &str = "CC0-1.0";
const LICENSE_LIST_VERSION: &str = "3.16";
const DOCUMENT_NAMESPACE: &str = "https://spdx.org/spdxdocs/layercraft/";
const CONTAINS: &str = "CONTAINS";

#[derive(Debug, Serialize)]
struct Document {
    #[serde(rename = "SPDXID")]
    id: String,
    name: String,
    #[serde(rename = "spdxVersion")]
    version: String,
    #[serde(rename = "creationInfo")]
    creation_info: CreationInfo,
    #[serde(rename = "dataLicense")]
    data_license: String,
    #[serde(rename = "documentNamespace")]
    namespace: String,
    #[serde(rename = "documentDescribes")]
    document_describes: Vec<String>,
    packages: Vec<Package>,
    relationships: Vec<Relationship>,
}

#[derive(Debug, Serialize)]
struct CreationInfo {
    created: String,
    creators: Vec<String>,
    #[serde(rename = "licenseListVersion")]
    license_list_version: String,
}

#[derive(Debug, Serialize)]
struct Package {
    #[serde(rename = "SPDXID")]
    id: String,
    name: String,
    #[serde(rename = "versionInfo")]
    version: String,
    #[serde(rename = "filesAnalyzed")]
    files_analyzed: bool,
    #[serde(rename = "licenseConcluded")]
    license_concluded: String,
    #[serde(rename = "licenseDeclared")]
    license_declared: String,
    description: String,
    #[serde(rename = "downloadLocation")]
    download_location: String,
    originator: String,
    #[serde(rename = "sourceInfo")]
    source_info: String,
    #[serde(rename = "copyrightText")]
    copyright_text: String,
    checksums: Vec<Checksum>,
    #[serde(rename = "externalRefs")]
    external_refs: Vec<ExternalRef>,
}

#[derive(Debug, Serialize)]
struct Checksum {
    algorithm: String,
    #[serde(rename = "checksumValue")]
    value: String,
}

#[derive(Debug, Serialize)]
struct ExternalRef {
    #[serde(rename = "referenceCategory")]
    category: String,
    #[serde(rename = "referenceLocator")]
    locator: String,
    #[serde(rename = "referenceType")]
    reference_type: String,
}

impl ExternalRef {
    fn purl(locator: String) -> Self {
        Self {
            category: "PACKAGE_MANAGER".to_string(),
            locator,
            reference_type: "purl".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Relationship {
    #[serde(rename = "spdxElementId")]
    element: String,
    #[serde(rename = "relationshipType")]
    relationship_type: String,
    #[serde(rename = "relatedSpdxElement")]
    related: String,
}

impl Relationship {
    fn contains(element: &str, related: &str) -> Self {
        Self {
            element: element.to_string(),
            relationship_type: CONTAINS.to_string(),
            related: related.to_string(),
        }
    }
}

fn or_noassertion(value: &str) -> String {
    if value.is_empty() {
        NOASSERTION.to_string()
    } else {
        value.to_string()
    }
}

/// SpdxGenerator adapter for SPDX 2.2 JSON documents
///
/// The document always has a layer node; an image node is added only when
/// the image digest is known, and then becomes the described node. Every
/// resolved package is a node contained by the layer.
pub struct SpdxGenerator;

impl SpdxGenerator {
    pub fn new() -> Self {
        Self
    }

    fn build_document(&self, metadata: &BuildMetadata, packages: &[ResolvedPackage]) -> Document {
        let image = &metadata.image;
        let document_name = if image.layer_digest.is_empty() {
            "sbom".to_string()
        } else {
            format!("sbom-{}", image.layer_digest)
        };

        let layer = self.layer_package(metadata);
        let layer_id = layer.id.clone();
        let mut document_packages = Vec::with_capacity(packages.len() + 2);
        let mut relationships = Vec::with_capacity(packages.len() + 1);
        let mut document_describes = vec![layer_id.clone()];

        if let Some(image_package) = self.image_package(metadata) {
            document_describes = vec![image_package.id.clone()];
            relationships.push(Relationship::contains(&image_package.id, &layer_id));
            document_packages.push(image_package);
        }
        document_packages.push(layer);

        for package in packages {
            let node = self.apk_package(metadata, package, &layer_id);
            relationships.push(Relationship::contains(&layer_id, &node.id));
            document_packages.push(node);
        }

        Document {
            id: "SPDXRef-DOCUMENT".to_string(),
            name: document_name,
            version: SPDX_VERSION.to_string(),
            creation_info: CreationInfo {
                created: image
                    .source_date_epoch
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
                creators: vec![format!("Tool: layercraft ({})", env!("CARGO_PKG_VERSION"))],
                license_list_version: LICENSE_LIST_VERSION.to_string(),
            },
            data_license: DATA_LICENSE.to_string(),
            namespace: DOCUMENT_NAMESPACE.to_string(),
            document_describes,
            packages: document_packages,
            relationships,
        }
    }

    fn layer_package(&self, metadata: &BuildMetadata) -> Package {
        let name = layer_package_name(&metadata.image);
        Package {
            id: format!("SPDXRef-Package-{}", sanitize_identifier(&name)),
            name,
            version: metadata.os.version.clone(),
            files_analyzed: false,
            license_concluded: NOASSERTION.to_string(),
            license_declared: NOASSERTION.to_string(),
            description: "layercraft operating system layer".to_string(),
            download_location: NOASSERTION.to_string(),
            originator: String::new(),
            source_info: String::new(),
            copyright_text: NOASSERTION.to_string(),
            checksums: Vec::new(),
            external_refs: vec![ExternalRef::purl(layer_purl(&metadata.image).to_string())],
        }
    }

    fn image_package(&self, metadata: &BuildMetadata) -> Option<Package> {
        let image = &metadata.image;
        let image_digest = image.image_digest.as_deref().filter(|d| !d.is_empty())?;
        let digest = ContentDigest::parse(image_digest);

        Some(Package {
            id: sanitize_identifier(&format!("SPDXRef-Package-{}", image_digest)),
            name: format!("{}@{}", image.name, image_digest),
            version: String::new(),
            files_analyzed: false,
            license_concluded: NOASSERTION.to_string(),
            license_declared: NOASSERTION.to_string(),
            description: "layercraft container image".to_string(),
            download_location: NOASSERTION.to_string(),
            originator: String::new(),
            source_info: String::new(),
            copyright_text: NOASSERTION.to_string(),
            checksums: vec![Checksum {
                algorithm: digest.algorithm().to_uppercase(),
                value: digest.hex().to_string(),
            }],
            external_refs: vec![ExternalRef::purl(
                image_purl(image, image_digest).to_string(),
            )],
        })
    }

    fn apk_package(
        &self,
        metadata: &BuildMetadata,
        package: &ResolvedPackage,
        layer_id: &str,
    ) -> Package {
        // The layer id is part of the package id to keep packages of
        // different layers apart.
        let id = sanitize_identifier(&format!(
            "SPDXRef-Package-{}-{}-{}",
            layer_id, package.name, package.version
        ));

        Package {
            id,
            name: package.name.clone(),
            version: package.version.clone(),
            files_analyzed: false,
            license_concluded: or_noassertion(&package.license),
            license_declared: NOASSERTION.to_string(),
            description: package.description.clone(),
            download_location: or_noassertion(&package.url),
            originator: package.maintainer.clone(),
            source_info: "Package info from apk database".to_string(),
            copyright_text: NOASSERTION.to_string(),
            checksums: vec![Checksum {
                algorithm: "SHA1".to_string(),
                value: hex::encode(&package.checksum),
            }],
            external_refs: vec![ExternalRef::purl(apk_purl(metadata, package).to_string())],
        }
    }
}

impl Default for SpdxGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomGenerator for SpdxGenerator {
    fn key(&self) -> &'static str {
        "spdx"
    }

    fn ext(&self) -> &'static str {
        "spdx.json"
    }

    fn generate(
        &self,
        metadata: &BuildMetadata,
        packages: &[ResolvedPackage],
        path: &Path,
    ) -> Result<()> {
        let document = self.build_document(metadata, packages);
        write_json_document(&document, path)
    }
}
