mod cli;

use chrono::{DateTime, Utc};
use cli::{Args, BuildArgs, Command};
use layercraft::config::{discover_config, load_config_from_path, ConfigFile};
use layercraft::prelude::*;
use layercraft::shared::error::{BuildError, ExitCode};
use std::env;
use std::fs;
use std::process;

/// Environment variable consulted when neither the flag nor the config sets an epoch
const SOURCE_DATE_EPOCH_VAR: &str = "SOURCE_DATE_EPOCH";

fn main() {
    let args = Args::parse_args();

    if let Err(e) = run(args) {
        eprintln!("\n❌ An error occurred:\n");
        eprintln!("{}", e);

        // Display error chain
        let mut source = e.source();
        while let Some(err) = source {
            eprintln!("\nCaused by: {}", err);
            source = err.source();
        }

        eprintln!();
        process::exit(ExitCode::ApplicationError.as_i32());
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Build(build) => run_build(build),
    }
}

fn run_build(args: BuildArgs) -> Result<()> {
    let config = load_config(&args)?;

    let source_date_epoch = resolve_source_date_epoch(
        args.source_date_epoch,
        config.source_date_epoch,
        env::var(SOURCE_DATE_EPOCH_VAR).ok().as_deref(),
    )?;

    let mut image = ImageInfo::new(
        args.name.clone().or_else(|| config.name.clone()).unwrap_or_default(),
        source_date_epoch,
    );
    image.repository = config.repository.clone();
    image.reference = config.reference.clone();
    image.tags = if args.tags.is_empty() {
        config.tags.clone()
    } else {
        args.tags.clone()
    };
    image.image_digest = args.image_digest.clone();
    image.architecture = match args.arch {
        Some(arch) => Some(arch),
        None => config.architecture()?,
    };

    let mut output = OutputPaths::new(&args.output_dir);
    output.tarball_path = args.tarball.clone();
    fs::create_dir_all(&args.output_dir).map_err(|e| BuildError::ArchiveError {
        path: args.output_dir.clone(),
        details: format!("Failed to create output directory: {}", e),
    })?;

    let mut request = BuildRequest::new(
        BuildMetadata::new(image, OsInfo::default(), output),
        config.image_configuration(),
    );
    request.sbom_formats = if !args.sbom_formats.is_empty() {
        args.sbom_formats.clone()
    } else if !config.sbom_formats.is_empty() {
        config.sbom_formats()?
    } else {
        vec![SbomFormat::Spdx]
    };
    if let Some(index) = &args.index {
        let raw = fs::read(index).map_err(|e| BuildError::InvalidConfiguration {
            message: format!("Failed to read image index {}: {}", index.display(), e),
        })?;
        request.index = Some(raw);
    }

    // Create adapters (Dependency Injection)
    let mut tree = DirectoryLoader::new().load(&args.rootfs)?;
    let use_case = BuildLayerUseCase::new(
        ApkDatabaseInstaller::new(),
        S6SupervisionWriter::new(),
        StderrProgressReporter::new(),
    );

    let response = use_case.execute(request, &mut tree)?;

    println!("layer: {}", response.tarball.path.display());
    println!("diffID: {}", response.tarball.diff_id);
    println!("digest: {}", response.tarball.digest);
    println!("size: {}", response.tarball.size);
    for path in &response.sbom_paths {
        println!("sbom: {}", path.display());
    }
    for tag in &response.tags {
        println!("tag: {}", tag);
    }
    if let Some(index_path) = &response.index_path {
        println!("index: {}", index_path.display());
    }

    Ok(())
}

fn load_config(args: &BuildArgs) -> Result<ConfigFile> {
    if let Some(path) = &args.config {
        return load_config_from_path(path);
    }
    let current_dir = env::current_dir().map_err(|e| BuildError::InvalidConfiguration {
        message: format!("Failed to determine current directory: {}", e),
    })?;
    Ok(discover_config(&current_dir)?.unwrap_or_default())
}

/// Flag first, then config file, then the environment; the Unix epoch otherwise.
fn resolve_source_date_epoch(
    flag: Option<i64>,
    config: Option<i64>,
    env_value: Option<&str>,
) -> Result<DateTime<Utc>> {
    let seconds = match flag.or(config) {
        Some(seconds) => seconds,
        None => match env_value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => value.parse::<i64>().map_err(|_| BuildError::InvalidConfiguration {
                message: format!(
                    "{} must be an integer number of seconds, got '{}'",
                    SOURCE_DATE_EPOCH_VAR, value
                ),
            })?,
            None => 0,
        },
    };

    DateTime::from_timestamp(seconds, 0).ok_or_else(|| {
        BuildError::InvalidConfiguration {
            message: format!("Source date epoch {} is out of range", seconds),
        }
        .into()
    })
}
