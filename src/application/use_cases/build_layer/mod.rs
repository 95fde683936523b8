use super::AssembleFilesystemUseCase;
use crate::adapters::outbound::archive::TarballEncoder;
use crate::adapters::outbound::filesystem::IndexWriter;
use crate::application::dto::{BuildRequest, BuildResponse, SbomFormat};
use crate::application::factories::SbomGeneratorFactory;
use crate::layer_build::domain::{BuildMetadata, ResolvedPackage, TarballOutput};
use crate::layer_build::services::{parse_os_release, OS_RELEASE_PATH};
use crate::ports::outbound::{
    FilesystemTree, PackageInstaller, ProgressReporter, SupervisionTreeWriter,
};
use crate::shared::Result;
use std::path::{Path, PathBuf};

/// Platform segment of SBOM file names when no architecture is known
const NOARCH: &str = "noarch";

/// BuildLayerUseCase - Builds one layer and its provenance documents
///
/// Assembles the filesystem, encodes it into a reproducible tarball and
/// writes one SBOM per requested format next to it. The layer digest only
/// exists after encoding, so SBOMs are always generated last.
///
/// # Type Parameters
/// * `PI` - PackageInstaller implementation
/// * `SW` - SupervisionTreeWriter implementation
/// * `PR` - ProgressReporter implementation
pub struct BuildLayerUseCase<PI, SW, PR> {
    assemble: AssembleFilesystemUseCase<PI, SW, PR>,
    encoder: TarballEncoder,
}

impl<PI, SW, PR> BuildLayerUseCase<PI, SW, PR>
where
    PI: PackageInstaller,
    SW: SupervisionTreeWriter,
    PR: ProgressReporter,
{
    /// Creates a new BuildLayerUseCase with injected dependencies
    pub fn new(package_installer: PI, supervision_writer: SW, progress_reporter: PR) -> Self {
        Self {
            assemble: AssembleFilesystemUseCase::new(
                package_installer,
                supervision_writer,
                progress_reporter,
            ),
            encoder: TarballEncoder::new(),
        }
    }

    pub fn progress_reporter(&self) -> &PR {
        self.assemble.progress_reporter()
    }

    /// Executes the layer build
    ///
    /// # Arguments
    /// * `request` - Build metadata, image configuration and output choices
    /// * `tree` - The root filesystem the packages were installed into
    ///
    /// # Returns
    /// BuildResponse with the tarball digests, SBOM paths and final tags
    ///
    /// # Errors
    /// Fails on the first pipeline, archive or SBOM error. Files already
    /// written are left in place.
    pub fn execute(
        &self,
        request: BuildRequest,
        tree: &mut dyn FilesystemTree,
    ) -> Result<BuildResponse> {
        let BuildRequest {
            mut metadata,
            configuration,
            sbom_formats,
            packages,
            index,
        } = request;

        // Step 1: Run the mutation pipeline
        self.assemble.execute(&mut metadata, &configuration, tree)?;

        // Step 2: Encode the layer and record its digest
        let tarball = self.encode_layer(&metadata, tree)?;
        metadata.image.layer_digest = tarball.digest.to_string();

        // Step 3: Fill OS identity from the tree when the caller did not
        self.detect_os(&mut metadata, tree);

        // Step 4: Provenance documents
        let packages = match packages {
            Some(packages) => packages,
            None => self.installed_view(tree)?,
        };
        let sbom_paths = self.generate_sboms(&metadata, &packages, &sbom_formats)?;

        // Step 5: Optional image index pass-through
        let index_path = match index {
            Some(raw) => Some(self.write_index(&metadata.output.output_dir, &raw)?),
            None => None,
        };

        Ok(BuildResponse {
            tarball,
            sbom_paths,
            tags: metadata.image.tags,
            os: metadata.os,
            index_path,
        })
    }

    fn encode_layer(
        &self,
        metadata: &BuildMetadata,
        tree: &dyn FilesystemTree,
    ) -> Result<TarballOutput> {
        let path = metadata.output.tarball();
        self.progress_reporter()
            .report(&format!("📦 Writing layer to: {}", path.display()));

        let tarball = self
            .encoder
            .encode(tree, metadata.image.source_date_epoch, &path)?;

        self.progress_reporter().report_completion(&format!(
            "✅ Layer written: {} ({} bytes)",
            tarball.digest, tarball.size
        ));
        Ok(tarball)
    }

    fn detect_os(&self, metadata: &mut BuildMetadata, tree: &dyn FilesystemTree) {
        if !metadata.os.id.is_empty() {
            return;
        }
        let path = Path::new(OS_RELEASE_PATH);
        if !tree.exists(path) {
            return;
        }
        match tree.read_file(path) {
            Ok(contents) => metadata.os = parse_os_release(&String::from_utf8_lossy(&contents)),
            Err(e) => self
                .progress_reporter()
                .report_warning(&format!("Could not read {}: {}", OS_RELEASE_PATH, e)),
        }
    }

    fn installed_view(&self, tree: &dyn FilesystemTree) -> Result<Vec<ResolvedPackage>> {
        let installed = self.assemble.package_installer().installed_packages(tree)?;
        Ok(installed.into_iter().map(|i| i.package).collect())
    }

    fn generate_sboms(
        &self,
        metadata: &BuildMetadata,
        packages: &[ResolvedPackage],
        formats: &[SbomFormat],
    ) -> Result<Vec<PathBuf>> {
        let arch = metadata
            .image
            .architecture
            .map(|arch| arch.to_apk())
            .unwrap_or(NOARCH);

        let mut paths = Vec::new();
        let mut seen = Vec::new();
        for &format in formats {
            if seen.contains(&format) {
                continue;
            }
            seen.push(format);

            let generator = SbomGeneratorFactory::create(format);
            let path = metadata
                .output
                .output_dir
                .join(format!("sbom-{}.{}", arch, generator.ext()));

            self.progress_reporter()
                .report(SbomGeneratorFactory::progress_message(format));
            generator.generate(metadata, packages, &path)?;
            paths.push(path);
        }

        if !paths.is_empty() {
            self.progress_reporter().report_completion(&format!(
                "✅ {} SBOM document(s) describing {} package(s)",
                paths.len(),
                packages.len()
            ));
        }
        Ok(paths)
    }

    fn write_index(&self, output_dir: &Path, raw: &[u8]) -> Result<PathBuf> {
        let (path, size) = IndexWriter::new(output_dir).write(raw)?;
        self.progress_reporter().report(&format!(
            "🗂️  Wrote image index: {} ({} bytes)",
            path.display(),
            size
        ));
        Ok(path)
    }
}
