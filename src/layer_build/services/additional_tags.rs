use crate::layer_build::domain::{split_tag, VersionTagging};
use regex::Regex;
use std::sync::LazyLock;

/// apk package release suffix (`-r0`, `-r12`)
static RELEASE_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-r\d+$").expect("release suffix regex is valid"));

/// Versions a package version is tagged with
///
/// Without stems this is just the full version. With stems, the release
/// suffix is dropped and then one dotted segment at a time:
/// `1.2.3-r0` gives `1.2.3-r0`, `1.2.3`, `1.2`, `1`.
pub fn version_stems(version: &str, include_stems: bool) -> Vec<String> {
    let mut versions = vec![version.to_string()];
    if !include_stems {
        return versions;
    }

    let mut stem = RELEASE_SUFFIX.replace(version, "").into_owned();
    loop {
        if !stem.is_empty() && !versions.contains(&stem) {
            versions.push(stem.clone());
        }
        match stem.rfind('.') {
            Some(dot) => stem.truncate(dot),
            None => break,
        }
    }
    versions
}

/// New tag references derived from a package version
///
/// Each existing tag's repository is re-tagged with `<prefix><version>` for
/// every version from [`version_stems`]. References already in `tags` and
/// duplicates are skipped; order follows `tags`, then versions.
pub fn derive_version_tags(tags: &[String], version: &str, tagging: &VersionTagging) -> Vec<String> {
    let prefix = tagging.package_version_tag_prefix.as_deref().unwrap_or("");
    let versions = version_stems(version, tagging.package_version_tag_stem);

    let mut derived: Vec<String> = Vec::new();
    for tag in tags {
        let (repository, _) = split_tag(tag);
        for version in &versions {
            let candidate = format!("{}:{}{}", repository, prefix, version);
            if !tags.contains(&candidate) && !derived.contains(&candidate) {
                derived.push(candidate);
            }
        }
    }
    derived
}
