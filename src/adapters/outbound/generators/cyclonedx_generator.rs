use super::json_document::write_json_document;
use super::provenance::{apk_purl, image_purl, layer_package_name, layer_purl};
use crate::layer_build::domain::{BuildMetadata, ContentDigest, ResolvedPackage};
use crate::ports::outbound::SbomGenerator;
use crate::shared::Result;
use chrono::SecondsFormat;
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

#[derive(Debug, Serialize)]
struct Bom {
    #[serde(rename = "bomFormat")]
    bom_format: String,
    #[serde(rename = "specVersion")]
    spec_version: String,
    #[serde(rename = "serialNumber")]
    serial_number: String,
    version: u32,
    metadata: Metadata,
    components: Vec<Component>,
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Serialize)]
struct Metadata {
    timestamp: String,
    tools: Vec<Tool>,
    component: Component,
}

#[derive(Debug, Serialize)]
struct Tool {
    vendor: String,
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct Component {
    #[serde(rename = "bom-ref")]
    bom_ref: String,
    #[serde(rename = "type")]
    component_type: String,
    name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    hashes: Vec<Hash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    licenses: Option<Vec<License>>,
    purl: String,
}

#[derive(Debug, Serialize)]
struct Hash {
    alg: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct License {
    license: LicenseContent,
}

#[derive(Debug, Serialize)]
struct LicenseContent {
    name: String,
}

#[derive(Debug, Serialize)]
struct Dependency {
    #[serde(rename = "ref")]
    bom_ref: String,
    #[serde(rename = "dependsOn")]
    depends_on: Vec<String>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// CycloneDxGenerator adapter for CycloneDX 1.4 JSON documents
///
/// Mirrors the SPDX graph: the topmost node (image if its digest is known,
/// else the layer) is the metadata component, and containment becomes
/// `dependencies`. The serial number is derived from the layer digest so
/// equal builds produce equal documents.
pub struct CycloneDxGenerator;

impl CycloneDxGenerator {
    pub fn new() -> Self {
        Self
    }

    fn build_bom(&self, metadata: &BuildMetadata, packages: &[ResolvedPackage]) -> Bom {
        let image = &metadata.image;
        let layer = self.layer_component(metadata);
        let package_components: Vec<Component> = packages
            .iter()
            .map(|package| self.package_component(metadata, package))
            .collect();

        let mut dependencies = vec![Dependency {
            bom_ref: layer.bom_ref.clone(),
            depends_on: package_components.iter().map(|c| c.bom_ref.clone()).collect(),
        }];

        let (top, mut components) = match self.image_component(metadata) {
            Some(image_component) => {
                dependencies.insert(
                    0,
                    Dependency {
                        bom_ref: image_component.bom_ref.clone(),
                        depends_on: vec![layer.bom_ref.clone()],
                    },
                );
                (image_component, vec![layer])
            }
            None => (layer, Vec::new()),
        };
        components.extend(package_components);

        Bom {
            bom_format: "CycloneDX".to_string(),
            spec_version: "1.4".to_string(),
            serial_number: format!(
                "urn:uuid:{}",
                Uuid::new_v5(&Uuid::NAMESPACE_URL, image.layer_digest.as_bytes())
            ),
            version: 1,
            metadata: Metadata {
                timestamp: image
                    .source_date_epoch
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
                tools: vec![Tool {
                    vendor: "layercraft".to_string(),
                    name: "layercraft".to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                }],
                component: top,
            },
            components,
            dependencies,
        }
    }

    fn layer_component(&self, metadata: &BuildMetadata) -> Component {
        let purl = layer_purl(&metadata.image).to_string();
        Component {
            bom_ref: purl.clone(),
            component_type: "operating-system".to_string(),
            name: layer_package_name(&metadata.image),
            version: metadata.os.version.clone(),
            author: None,
            description: Some("layercraft operating system layer".to_string()),
            hashes: Vec::new(),
            licenses: None,
            purl,
        }
    }

    fn image_component(&self, metadata: &BuildMetadata) -> Option<Component> {
        let image = &metadata.image;
        let image_digest = image.image_digest.as_deref().filter(|d| !d.is_empty())?;
        let digest = ContentDigest::parse(image_digest);
        let purl = image_purl(image, image_digest).to_string();

        Some(Component {
            bom_ref: purl.clone(),
            component_type: "container".to_string(),
            name: format!("{}@{}", image.name, image_digest),
            version: String::new(),
            author: None,
            description: Some("layercraft container image".to_string()),
            hashes: vec![Hash {
                alg: cyclonedx_algorithm(digest.algorithm()),
                content: digest.hex().to_string(),
            }],
            licenses: None,
            purl,
        })
    }

    fn package_component(&self, metadata: &BuildMetadata, package: &ResolvedPackage) -> Component {
        let purl = apk_purl(metadata, package).to_string();
        let hashes = if package.checksum.is_empty() {
            Vec::new()
        } else {
            vec![Hash {
                alg: "SHA-1".to_string(),
                content: hex::encode(&package.checksum),
            }]
        };

        Component {
            bom_ref: purl.clone(),
            component_type: "library".to_string(),
            name: package.name.clone(),
            version: package.version.clone(),
            author: non_empty(&package.maintainer),
            description: non_empty(&package.description),
            hashes,
            licenses: non_empty(&package.license).map(|name| {
                vec![License {
                    license: LicenseContent { name },
                }]
            }),
            purl,
        }
    }
}

/// `sha256` → `SHA-256`
fn cyclonedx_algorithm(algorithm: &str) -> String {
    let upper = algorithm.to_uppercase();
    match upper.strip_prefix("SHA") {
        Some(bits) if !bits.starts_with('-') => format!("SHA-{}", bits),
        _ => upper,
    }
}

impl Default for CycloneDxGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SbomGenerator for CycloneDxGenerator {
    fn key(&self) -> &'static str {
        "cyclonedx"
    }

    fn ext(&self) -> &'static str {
        "cdx"
    }

    fn generate(
        &self,
        metadata: &BuildMetadata,
        packages: &[ResolvedPackage],
        path: &Path,
    ) -> Result<()> {
        let bom = self.build_bom(metadata, packages);
        write_json_document(&bom, path)
    }
}
