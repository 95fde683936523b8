pub mod architecture;
pub mod build_metadata;
pub mod build_step;
pub mod fs_entry;
pub mod image_configuration;
pub mod package;
pub mod tarball_output;

pub use architecture::Architecture;
pub use build_metadata::{split_tag, BuildMetadata, ImageInfo, OsInfo, OutputPaths};
pub use build_step::BuildStep;
pub use fs_entry::{EntryKind, FsEntry, Ownership};
pub use image_configuration::{
    Accounts, Entrypoint, Group, ImageConfiguration, OsRelease, PathMutation, PathMutationType,
    User, VersionTagging,
};
pub use package::{InstalledPackage, InstalledPath, PathAttributes, ResolvedPackage};
pub use tarball_output::{ContentDigest, TarballOutput};
