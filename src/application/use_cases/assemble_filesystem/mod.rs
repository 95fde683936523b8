use crate::layer_build::domain::{BuildMetadata, BuildStep, ImageConfiguration, VersionTagging};
use crate::layer_build::services::{
    derive_version_tags, generate_os_release, install_busybox_links, install_char_devices,
    install_ldconfig_links, mutate_accounts, mutate_paths,
};
use crate::ports::outbound::{
    FilesystemTree, PackageInstaller, ProgressReporter, SupervisionTreeWriter,
};
use crate::shared::error::BuildError;
use crate::shared::Result;

/// AssembleFilesystemUseCase - Runs the filesystem mutation pipeline
///
/// Every step in `BuildStep::ORDER` runs exactly once, in that order,
/// against the same tree. The first failing step stops the pipeline; an
/// already present `etc/os-release` is the one condition that only warns.
///
/// # Type Parameters
/// * `PI` - PackageInstaller implementation
/// * `SW` - SupervisionTreeWriter implementation
/// * `PR` - ProgressReporter implementation
pub struct AssembleFilesystemUseCase<PI, SW, PR> {
    package_installer: PI,
    supervision_writer: SW,
    progress_reporter: PR,
}

impl<PI, SW, PR> AssembleFilesystemUseCase<PI, SW, PR>
where
    PI: PackageInstaller,
    SW: SupervisionTreeWriter,
    PR: ProgressReporter,
{
    /// Creates a new AssembleFilesystemUseCase with injected dependencies
    pub fn new(package_installer: PI, supervision_writer: SW, progress_reporter: PR) -> Self {
        Self {
            package_installer,
            supervision_writer,
            progress_reporter,
        }
    }

    pub fn package_installer(&self) -> &PI {
        &self.package_installer
    }

    pub fn progress_reporter(&self) -> &PR {
        &self.progress_reporter
    }

    /// Executes every pipeline step against `tree`
    ///
    /// # Arguments
    /// * `metadata` - Build metadata; the additional-tags step may append tags
    /// * `configuration` - Declarative image configuration
    /// * `tree` - The root filesystem under construction
    ///
    /// # Errors
    /// Returns `BuildError::StepFailed` naming the first step that failed
    pub fn execute(
        &self,
        metadata: &mut BuildMetadata,
        configuration: &ImageConfiguration,
        tree: &mut dyn FilesystemTree,
    ) -> Result<()> {
        self.progress_reporter.report(&format!(
            "🔧 Assembling filesystem for {}",
            metadata.image.name
        ));

        let total = BuildStep::ORDER.len();
        for (index, step) in BuildStep::ORDER.into_iter().enumerate() {
            self.progress_reporter
                .report_progress(index + 1, total, Some(step.as_str()));

            match self.run_step(step, metadata, configuration, tree) {
                Ok(()) => {}
                Err(error) if is_recoverable(&error) => {
                    self.progress_reporter.report_warning(&error.to_string());
                }
                Err(error) => {
                    self.progress_reporter
                        .report_error(&format!("Step {} failed", step));
                    return Err(BuildError::step_failed(step, error).into());
                }
            }
        }

        self.progress_reporter
            .report_completion(&format!("✅ Filesystem assembled in {} steps", total));
        Ok(())
    }

    fn run_step(
        &self,
        step: BuildStep,
        metadata: &mut BuildMetadata,
        configuration: &ImageConfiguration,
        tree: &mut dyn FilesystemTree,
    ) -> Result<()> {
        match step {
            BuildStep::InstallPackages => self.package_installer.fixate_world(tree),
            BuildStep::AdditionalTags => {
                self.add_version_tags(metadata, &configuration.version_tagging, tree)
            }
            BuildStep::MutateAccounts => mutate_accounts(tree, &configuration.accounts),
            BuildStep::MutatePaths => mutate_paths(tree, &configuration.paths),
            BuildStep::GenerateOsRelease => generate_os_release(tree, &configuration.os_release),
            BuildStep::WriteSupervisionTree => self
                .supervision_writer
                .write_supervision_tree(tree, &configuration.entrypoint.services),
            BuildStep::InstallBusyboxLinks => {
                let installed = self.package_installer.installed_packages(tree)?;
                let created = install_busybox_links(tree, &installed)?;
                if created > 0 {
                    self.progress_reporter
                        .report(&format!("🔗 Linked {} busybox applet(s)", created));
                }
                Ok(())
            }
            BuildStep::InstallLdconfigLinks => {
                let created = install_ldconfig_links(tree)?;
                if created > 0 {
                    self.progress_reporter
                        .report(&format!("🔗 Linked {} shared object soname(s)", created));
                }
                Ok(())
            }
            BuildStep::InstallCharDevices => install_char_devices(tree),
        }
    }

    fn add_version_tags(
        &self,
        metadata: &mut BuildMetadata,
        tagging: &VersionTagging,
        tree: &dyn FilesystemTree,
    ) -> Result<()> {
        let Some(package_name) = tagging.package_version_tag.as_deref() else {
            return Ok(());
        };

        let installed = self.package_installer.installed_packages(tree)?;
        let Some(package) = installed.iter().find(|p| p.name() == package_name) else {
            self.progress_reporter.report_warning(&format!(
                "Package '{}' is not installed; no version tags added",
                package_name
            ));
            return Ok(());
        };

        let tags = derive_version_tags(&metadata.image.tags, package.version(), tagging);
        if !tags.is_empty() {
            self.progress_reporter.report(&format!(
                "🏷️  Added {} tag(s) from {} {}",
                tags.len(),
                package_name,
                package.version()
            ));
        }
        metadata.image.tags.extend(tags);
        Ok(())
    }
}

fn is_recoverable(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<BuildError>(),
        Some(BuildError::OsReleaseAlreadyPresent { .. })
    )
}
