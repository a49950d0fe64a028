use buildgen_core::{generate_file, GenerateError};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

const EXIT_SUCCESS: u8 = 0;
const EXIT_FAILURE: u8 = 1;
// 2 is left to clap for usage errors.
const EXIT_CATALOG_ERROR: u8 = 3;
const EXIT_OUTPUT_ERROR: u8 = 4;

#[derive(Debug, Parser)]
#[command(
    name = "buildgen",
    version,
    about = "Generate the API BUILD file from a type database"
)]
struct Cli {
    /// Type database to read (JSON, or TOML when the extension is .toml).
    catalog: PathBuf,

    /// BUILD file to write; its directory must exist.
    output: PathBuf,
}

fn exit_code(err: &GenerateError) -> u8 {
    match err {
        GenerateError::CatalogRead { .. } => EXIT_CATALOG_ERROR,
        GenerateError::OutputWrite { .. } => EXIT_OUTPUT_ERROR,
        GenerateError::Render(_) => EXIT_FAILURE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("BUILDGEN_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match generate_file(&cli.catalog, &cli.output) {
        Ok(report) => {
            debug!(
                "{} descriptors: {} excluded, {} unclassified, {} without package",
                report.stats.descriptors,
                report.stats.excluded,
                report.stats.unclassified,
                report.stats.missing_package
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(exit_code(&err))
        }
    }
}
