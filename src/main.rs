//! altotext - plain-text transcriptions from ALTO manuscript pages

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::info;

use altotext::batch::{run_batch, select_directories, BatchOptions};
use altotext::{Config, SegmentationPolicy};

#[derive(Parser)]
#[command(name = "altotext")]
#[command(version, about = "Rebuild paragraph-segmented text from ALTO folios", long_about = None)]
#[command(after_help = "EXAMPLES:
    altotext data/btv1b8452           Write data/btv1b8452.txt
    altotext --metadata data/*        Also fetch catalogue records
    altotext --policy legacy data/ms  Use the historical segmentation rules")]
struct Cli {
    /// Manuscript directories, one ALTO file per folio
    #[arg(value_name = "DIRECTORIES")]
    directories: Vec<PathBuf>,

    /// Segmentation rule set (overrides the config file)
    #[arg(short, long, value_enum)]
    policy: Option<SegmentationPolicy>,

    /// Label of the main text zone (overrides the config file)
    #[arg(long, value_name = "LABEL")]
    main_zone: Option<String>,

    /// Fetch each manuscript's record from the BnF catalogue
    #[arg(short, long)]
    metadata: bool,

    /// Read configuration from this file instead of the default location
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the default configuration file and exit
    #[arg(long)]
    init_config: bool,

    /// Only report warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(quiet: bool) {
    let default_filter = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if cli.init_config {
        match Config::init_default()? {
            Some(path) => println!("Wrote default configuration to {}", path.display()),
            None => eprintln!("No configuration directory on this system"),
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(policy) = cli.policy {
        config.segmentation.policy = policy;
    }
    if let Some(label) = cli.main_zone {
        config.zones.main_label = label;
    }

    let directories = select_directories(&cli.directories);
    if directories.is_empty() {
        println!("No directory given");
        return Ok(ExitCode::SUCCESS);
    }

    let options = BatchOptions {
        transcription: config.transcription_options(),
        fetch_metadata: cli.metadata,
        catalogue: config.catalogue.clone(),
    };
    let reports = run_batch(directories, options).await?;

    let failed = reports.iter().filter(|report| report.result.is_err()).count();
    info!(
        "{} of {} documents transcribed",
        reports.len() - failed,
        reports.len()
    );

    if failed > 0 {
        for report in reports.iter().filter(|report| report.result.is_err()) {
            eprintln!("failed: {}", report.dir.display());
        }
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
