//! Pure build services: the mutation passes applied to a filesystem tree
//! and the helpers the SBOM generators share.

mod account_mutator;
mod additional_tags;
mod busybox_links;
mod char_devices;
mod elf_soname;
mod installed_database;
mod ldconfig_links;
mod os_release;
mod package_url;
mod path_mutator;
mod spdx_identifier;

pub use account_mutator::mutate_accounts;
pub use additional_tags::{derive_version_tags, version_stems};
pub use busybox_links::install_busybox_links;
pub use char_devices::install_char_devices;
pub use elf_soname::elf_soname;
pub use installed_database::{parse_installed_database, INSTALLED_DATABASE_PATH};
pub use ldconfig_links::install_ldconfig_links;
pub use os_release::{generate_os_release, parse_os_release, OS_RELEASE_PATH};
pub use package_url::PackageUrl;
pub use path_mutator::mutate_paths;
pub use spdx_identifier::sanitize_identifier;
