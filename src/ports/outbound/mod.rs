/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with the tree under construction, the package installer,
/// the console and the SBOM output formats.
pub mod filesystem_tree;
pub mod package_installer;
pub mod progress_reporter;
pub mod sbom_generator;
pub mod supervision_writer;

pub use filesystem_tree::FilesystemTree;
pub use package_installer::PackageInstaller;
pub use progress_reporter::ProgressReporter;
pub use sbom_generator::SbomGenerator;
pub use supervision_writer::SupervisionTreeWriter;
