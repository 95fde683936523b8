/// Package installer adapters
mod apk_installer;

pub use apk_installer::ApkDatabaseInstaller;
