use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::layer_build::domain::BuildStep;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between a failed build
/// and a malformed invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - layer and SBOMs were written
    Success = 0,
    /// Application error (configuration, filesystem, archive or SBOM failure)
    ApplicationError = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::ApplicationError => write!(f, "Application Error (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
        }
    }
}

/// Application-specific errors for layer assembly.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// reducing boilerplate while maintaining user-friendly error messages.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A pipeline step failed; the remaining steps were not run.
    #[error("Build step '{step}' failed: {source}")]
    StepFailed {
        step: BuildStep,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// The only recoverable pipeline condition.
    #[error("{path} already exists; not overwriting it")]
    OsReleaseAlreadyPresent { path: PathBuf },

    #[error("Filesystem tree error at {path}: {details}")]
    TreeError { path: PathBuf, details: String },

    #[error("Failed to write layer tarball: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    ArchiveError { path: PathBuf, details: String },

    #[error("Failed to write SBOM: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    SbomWriteError { path: PathBuf, details: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Invalid rootfs directory: {path}\nReason: {reason}\n\n💡 Hint: Point --rootfs at the directory the package installer populated")]
    InvalidRootfs { path: PathBuf, reason: String },
}

impl BuildError {
    /// Wraps a step failure, keeping the original error chain as the source.
    pub fn step_failed(step: BuildStep, source: anyhow::Error) -> Self {
        BuildError::StepFailed {
            step,
            source: source.into(),
        }
    }

    pub fn tree(path: impl Into<PathBuf>, details: impl Into<String>) -> Self {
        BuildError::TreeError {
            path: path.into(),
            details: details.into(),
        }
    }
}
