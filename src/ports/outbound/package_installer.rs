use super::FilesystemTree;
use crate::layer_build::domain::InstalledPackage;
use crate::shared::Result;

/// PackageInstaller port for the resolver's installer
///
/// Resolution and unpacking happen outside this crate. The installer
/// finalizes what is already in the tree and exposes the installed view.
pub trait PackageInstaller {
    /// Finalizes the installation recorded in the tree
    ///
    /// # Arguments
    /// * `tree` - The tree the packages were unpacked into
    ///
    /// # Errors
    /// Returns an error if the installed state is inconsistent with the tree
    fn fixate_world(&self, tree: &mut dyn FilesystemTree) -> Result<()>;

    /// Packages currently recorded as installed in the tree
    ///
    /// # Errors
    /// Returns an error if the installed database cannot be read or parsed
    fn installed_packages(&self, tree: &dyn FilesystemTree) -> Result<Vec<InstalledPackage>>;
}
