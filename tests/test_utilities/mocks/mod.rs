/// Mock implementations for testing
mod mock_package_installer;
mod mock_progress_reporter;

pub use mock_package_installer::MockPackageInstaller;
pub use mock_progress_reporter::MockProgressReporter;
