use clap::{Parser, Subcommand};
use std::path::PathBuf;

use layercraft::application::dto::SbomFormat;
use layercraft::layer_build::domain::Architecture;

/// Build reproducible container image layers with SBOMs
#[derive(Parser, Debug)]
#[command(name = "layercraft")]
#[command(version)]
#[command(about = "Build reproducible container image layers with SBOMs", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Assemble a rootfs into a layer tarball and write its SBOMs
    Build(BuildArgs),
}

#[derive(clap::Args, Debug)]
pub struct BuildArgs {
    /// Root filesystem the packages were installed into
    #[arg(short, long, value_name = "DIR")]
    pub rootfs: PathBuf,

    /// Build configuration (defaults to layercraft.yaml in the current directory)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory the layer, SBOMs and index are written to
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Layer tarball path (defaults to <output-dir>/layer.tar.gz)
    #[arg(long, value_name = "FILE")]
    pub tarball: Option<PathBuf>,

    /// SBOM format: spdx or cyclonedx
    /// Can be specified multiple times: --sbom-format spdx --sbom-format cyclonedx
    #[arg(short = 'f', long = "sbom-format", value_name = "FORMAT")]
    pub sbom_formats: Vec<SbomFormat>,

    /// Image name recorded in the SBOM
    #[arg(long)]
    pub name: Option<String>,

    /// Image tag reference, e.g. cgr.dev/chainguard/base:latest
    /// Can be specified multiple times
    #[arg(short, long = "tag", value_name = "REFERENCE")]
    pub tags: Vec<String>,

    /// Target architecture (apk or OCI spelling)
    #[arg(short, long)]
    pub arch: Option<Architecture>,

    /// Digest of the image manifest, as algorithm:hex
    #[arg(long, value_name = "DIGEST")]
    pub image_digest: Option<String>,

    /// Timestamp for every archive entry and SBOM, in seconds since the epoch
    /// (falls back to the config file, then SOURCE_DATE_EPOCH)
    #[arg(long, value_name = "SECONDS")]
    pub source_date_epoch: Option<i64>,

    /// Image index document to copy verbatim to <output-dir>/index.json
    #[arg(long, value_name = "FILE")]
    pub index: Option<PathBuf>,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
