/// Integration tests for the application layer
mod test_utilities;

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use layercraft::prelude::*;
use layercraft::shared::error::BuildError;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use test_utilities::mocks::*;

fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

fn metadata(output_dir: &Path, image_digest: Option<&str>) -> BuildMetadata {
    let mut image = ImageInfo::new("cgr.dev/chainguard/static", epoch());
    image.tags.push("cgr.dev/chainguard/static:latest".to_string());
    image.image_digest = image_digest.map(str::to_string);
    image.architecture = Some(Architecture::Amd64);
    let os = OsInfo {
        id: "wolfi".to_string(),
        name: "Wolfi".to_string(),
        version: "20230201".to_string(),
    };
    BuildMetadata::new(image, os, OutputPaths::new(output_dir))
}

fn configuration(yaml: &str) -> ImageConfiguration {
    serde_yaml_ng::from_str(yaml).unwrap()
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn package_ids(document: &Value) -> HashSet<String> {
    document["packages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["SPDXID"].as_str().unwrap().to_string())
        .collect()
}

fn assert_closed(document: &Value) {
    let ids = package_ids(document);
    for relationship in document["relationships"].as_array().unwrap() {
        assert!(ids.contains(relationship["spdxElementId"].as_str().unwrap()));
        assert!(ids.contains(relationship["relatedSpdxElement"].as_str().unwrap()));
    }
    let describes = document["documentDescribes"].as_array().unwrap();
    assert_eq!(describes.len(), 1);
    assert_eq!(describes[0], document["packages"][0]["SPDXID"]);
}

#[test]
fn test_account_failure_leaves_later_steps_unapplied() {
    let reporter = MockProgressReporter::new();
    let use_case = AssembleFilesystemUseCase::new(
        MockPackageInstaller::new(),
        S6SupervisionWriter::new(),
        reporter.clone(),
    );
    let temp_dir = TempDir::new().unwrap();
    let mut metadata = metadata(temp_dir.path(), None);
    let mut tree = InMemoryTree::new();
    tree.mkdir_all(Path::new("etc/passwd"), 0o755).unwrap();

    let configuration = configuration(
        r#"
accounts:
  users:
    - username: nonroot
      uid: 65532
paths:
  - path: /app
    type: directory
    permissions: 0o700
os_release:
  id: wolfi
entrypoint:
  services:
    app: /usr/bin/app
"#,
    );

    let error = use_case
        .execute(&mut metadata, &configuration, &mut tree)
        .unwrap_err();

    assert!(matches!(
        error.downcast_ref::<BuildError>(),
        Some(BuildError::StepFailed {
            step: BuildStep::MutateAccounts,
            ..
        })
    ));
    assert!(!tree.exists(Path::new("app")));
    assert!(!tree.exists(Path::new("etc/os-release")));
    assert!(!tree.exists(Path::new("sv/app/run")));
    assert!(!tree.exists(Path::new("dev/null")));
    assert!(reporter
        .get_messages()
        .iter()
        .any(|m| m.starts_with("Error: ") && m.contains("mutate-accounts")));
}

#[test]
fn test_existing_os_release_warns_and_is_preserved() {
    let reporter = MockProgressReporter::new();
    let use_case = AssembleFilesystemUseCase::new(
        MockPackageInstaller::new(),
        S6SupervisionWriter::new(),
        reporter.clone(),
    );
    let temp_dir = TempDir::new().unwrap();
    let mut metadata = metadata(temp_dir.path(), None);
    let mut tree = InMemoryTree::new();
    tree.mkdir_all(Path::new("etc"), 0o755).unwrap();
    tree.write_file(Path::new("etc/os-release"), b"ID=custom\n", 0o644)
        .unwrap();

    use_case
        .execute(
            &mut metadata,
            &configuration("os_release:\n  id: wolfi\n"),
            &mut tree,
        )
        .unwrap();

    assert_eq!(
        tree.read_file(Path::new("etc/os-release")).unwrap(),
        b"ID=custom\n"
    );
    let warnings = reporter.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("os-release"));
    assert!(tree.exists(Path::new("dev/urandom")));
}

#[test]
fn test_scenario_a_layer_only() {
    let temp_dir = TempDir::new().unwrap();
    let use_case = BuildLayerUseCase::new(
        MockPackageInstaller::new(),
        S6SupervisionWriter::new(),
        MockProgressReporter::new(),
    );
    let mut request = BuildRequest::new(
        metadata(temp_dir.path(), None),
        ImageConfiguration::default(),
    );
    request.packages = Some(vec![]);

    let response = use_case
        .execute(request, &mut InMemoryTree::new())
        .unwrap();

    let document = read_json(&response.sbom_paths[0]);
    assert_eq!(document["packages"].as_array().unwrap().len(), 1);
    assert!(document["relationships"].as_array().unwrap().is_empty());
    assert_closed(&document);
}

#[test]
fn test_scenario_b_image_layer_and_package() {
    let temp_dir = TempDir::new().unwrap();
    let use_case = BuildLayerUseCase::new(
        MockPackageInstaller::new().with_package("ca-certificates-bundle", "20230506-r0"),
        S6SupervisionWriter::new(),
        MockProgressReporter::new(),
    );
    let request = BuildRequest::new(
        metadata(temp_dir.path(), Some("sha256:9f00")),
        ImageConfiguration::default(),
    );

    let response = use_case
        .execute(request, &mut InMemoryTree::new())
        .unwrap();

    let document = read_json(&response.sbom_paths[0]);
    let packages = document["packages"].as_array().unwrap();
    let relationships = document["relationships"].as_array().unwrap();
    assert_eq!(packages.len(), 3);
    assert_eq!(relationships.len(), 2);
    assert_closed(&document);

    let image_id = packages[0]["SPDXID"].as_str().unwrap();
    let layer_id = packages[1]["SPDXID"].as_str().unwrap();
    let package_id = packages[2]["SPDXID"].as_str().unwrap();
    assert_eq!(relationships[0]["spdxElementId"], image_id);
    assert_eq!(relationships[0]["relatedSpdxElement"], layer_id);
    assert_eq!(relationships[1]["spdxElementId"], layer_id);
    assert_eq!(relationships[1]["relatedSpdxElement"], package_id);
    assert_eq!(packages[2]["name"], "ca-certificates-bundle");
}

#[test]
fn test_scenario_c_wall_clock_does_not_change_archive() {
    let first_dir = TempDir::new().unwrap();
    let second_dir = TempDir::new().unwrap();
    let configuration = configuration(
        r#"
accounts:
  users:
    - username: nonroot
      uid: 65532
os_release:
  id: wolfi
"#,
    );

    let build = |dir: &Path| {
        let use_case = BuildLayerUseCase::new(
            MockPackageInstaller::new(),
            S6SupervisionWriter::new(),
            MockProgressReporter::new(),
        );
        let request = BuildRequest::new(metadata(dir, None), configuration.clone());
        use_case.execute(request, &mut InMemoryTree::new()).unwrap()
    };

    let first = build(first_dir.path());
    std::thread::sleep(std::time::Duration::from_secs(1));
    let second = build(second_dir.path());

    assert_eq!(
        fs::read(&first.tarball.path).unwrap(),
        fs::read(&second.tarball.path).unwrap()
    );
    assert_eq!(first.tarball.digest, second.tarball.digest);
    assert_eq!(first.tarball.diff_id, second.tarball.diff_id);
}

#[test]
fn test_reported_digests_match_archive() {
    let temp_dir = TempDir::new().unwrap();
    let use_case = BuildLayerUseCase::new(
        MockPackageInstaller::new(),
        S6SupervisionWriter::new(),
        MockProgressReporter::new(),
    );
    let request = BuildRequest::new(
        metadata(temp_dir.path(), None),
        configuration("os_release:\n  id: wolfi\n"),
    );

    let response = use_case
        .execute(request, &mut InMemoryTree::new())
        .unwrap();

    let blob = fs::read(&response.tarball.path).unwrap();
    assert_eq!(response.tarball.size, blob.len() as u64);
    assert_eq!(
        response.tarball.digest.to_string(),
        format!("sha256:{}", hex::encode(Sha256::digest(&blob)))
    );

    let mut tar_bytes = Vec::new();
    GzDecoder::new(blob.as_slice())
        .read_to_end(&mut tar_bytes)
        .unwrap();
    assert_eq!(
        response.tarball.diff_id.to_string(),
        format!("sha256:{}", hex::encode(Sha256::digest(&tar_bytes)))
    );

    let mut archive = tar::Archive::new(tar_bytes.as_slice());
    for entry in archive.entries().unwrap() {
        let entry = entry.unwrap();
        assert_eq!(entry.header().mtime().unwrap(), 1_700_000_000);
        assert_eq!(entry.header().username().unwrap(), Some(""));
    }
}

#[test]
fn test_build_from_rootfs_directory() {
    let rootfs = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    fs::create_dir_all(rootfs.path().join("bin")).unwrap();
    fs::write(rootfs.path().join("bin/busybox"), b"\x7fELF busybox").unwrap();
    fs::create_dir_all(rootfs.path().join("lib/apk/db")).unwrap();
    fs::write(
        rootfs.path().join("lib/apk/db/installed"),
        "P:busybox\nV:1.36.1-r5\nA:x86_64\nL:GPL-2.0-only\n\
         C:Q1nJAmXr3cRWRmB4h6Bz5zNc2ZFL0=\nF:bin\nR:busybox\na:0:0:755\n\n",
    )
    .unwrap();

    let mut tree = DirectoryLoader::new().load(rootfs.path()).unwrap();
    let reporter = MockProgressReporter::new();
    let use_case = BuildLayerUseCase::new(
        ApkDatabaseInstaller::new(),
        S6SupervisionWriter::new(),
        reporter.clone(),
    );
    let mut request = BuildRequest::new(
        metadata(output.path(), None),
        configuration(
            r#"
accounts:
  groups:
    - groupname: nonroot
      gid: 65532
  users:
    - username: nonroot
      uid: 65532
entrypoint:
  services:
    web: /usr/bin/web --port 8080
"#,
        ),
    );
    request.sbom_formats = vec![SbomFormat::Spdx, SbomFormat::CycloneDx];

    let response = use_case.execute(request, &mut tree).unwrap();

    // Pipeline effects landed in the tree
    assert_eq!(
        tree.entry(Path::new("bin/sh")).unwrap().kind,
        EntryKind::Symlink(PathBuf::from("/bin/busybox"))
    );
    assert_eq!(tree.entry(Path::new("bin/busybox")).unwrap().mode, 0o755);
    let passwd = String::from_utf8(tree.read_file(Path::new("etc/passwd")).unwrap()).unwrap();
    assert!(passwd.contains("nonroot:x:65532:65532:"));
    assert_eq!(
        tree.entry(Path::new("home/nonroot")).unwrap().ownership(),
        Ownership::new(65532, 65532)
    );
    assert!(tree.read_file(Path::new("sv/web/run")).is_ok());

    // Outputs
    assert_eq!(
        response.sbom_paths,
        vec![
            output.path().join("sbom-x86_64.spdx.json"),
            output.path().join("sbom-x86_64.cdx"),
        ]
    );
    let spdx = read_json(&response.sbom_paths[0]);
    assert_closed(&spdx);
    assert_eq!(spdx["packages"][1]["name"], "busybox");

    let cyclonedx = read_json(&response.sbom_paths[1]);
    assert_eq!(cyclonedx["bomFormat"], "CycloneDX");
    assert_eq!(cyclonedx["components"][0]["name"], "busybox");

    assert!(reporter
        .get_messages()
        .iter()
        .any(|m| m.contains("busybox applet")));
}

#[test]
fn test_installer_failure_stops_before_encoding() {
    let temp_dir = TempDir::new().unwrap();
    let use_case = BuildLayerUseCase::new(
        MockPackageInstaller::failing("world is inconsistent"),
        S6SupervisionWriter::new(),
        MockProgressReporter::new(),
    );
    let request = BuildRequest::new(
        metadata(temp_dir.path(), None),
        ImageConfiguration::default(),
    );

    let error = use_case
        .execute(request, &mut InMemoryTree::new())
        .unwrap_err();

    assert!(error.to_string().contains("install-packages"));
    assert!(!temp_dir.path().join("layer.tar.gz").exists());
    assert!(!temp_dir.path().join("sbom-x86_64.spdx.json").exists());
}

#[test]
fn test_permissions_on_hardlink_reach_extracted_inode() {
    use std::os::unix::fs::PermissionsExt;

    let output = TempDir::new().unwrap();
    let unpacked = TempDir::new().unwrap();
    let mut tree = InMemoryTree::new();
    tree.mkdir_all(Path::new("usr/bin"), 0o755).unwrap();
    tree.write_file(Path::new("usr/bin/tool"), b"#!/bin/sh\n", 0o644)
        .unwrap();
    tree.hardlink(Path::new("usr/bin/tool"), Path::new("usr/bin/tool-alias"))
        .unwrap();

    let use_case = BuildLayerUseCase::new(
        MockPackageInstaller::new(),
        S6SupervisionWriter::new(),
        MockProgressReporter::new(),
    );
    let request = BuildRequest::new(
        metadata(output.path(), None),
        configuration(
            r#"
paths:
  - path: /usr/bin/tool-alias
    type: permissions
    permissions: 0o755
"#,
        ),
    );
    let response = use_case.execute(request, &mut tree).unwrap();

    let blob = fs::read(&response.tarball.path).unwrap();
    let mut archive = tar::Archive::new(GzDecoder::new(blob.as_slice()));
    archive.set_preserve_permissions(true);
    for entry in archive.entries().unwrap() {
        let mut entry = entry.unwrap();
        if entry.path().unwrap().starts_with("usr") {
            entry.unpack_in(unpacked.path()).unwrap();
        }
    }

    for name in ["tool", "tool-alias"] {
        let mode = fs::metadata(unpacked.path().join("usr/bin").join(name))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o7777, 0o755, "{}", name);
    }
}
