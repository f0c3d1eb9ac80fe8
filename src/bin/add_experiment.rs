use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use amisr_catalog::app::{App, BatchResult, RunOptions};
use amisr_catalog::config::ConfigLoader;
use amisr_catalog::error::CatalogError;
use amisr_catalog::output::{ConsoleOutput, JsonOutput, OutputMode};
use amisr_catalog::store::{AssetStore, DryRunStore, LocalStore};

#[derive(Parser)]
#[command(name = "add-experiment")]
#[command(about = "Add processed AMISR experiments to the experiment catalog")]
#[command(version, author)]
struct Cli {
    /// Glob pattern of experiment directories, e.g. '/data/processed/2023/202303*'
    pattern: String,

    /// JSON run configuration (instrument table, link base, file names)
    #[arg(long)]
    config: Option<String>,

    /// Keep files already present in the output tree instead of copying again
    #[arg(long)]
    avoid_overwrite: bool,

    /// Write every experiment under this directory instead of the instrument roots
    #[arg(long)]
    output_root: Option<Utf8PathBuf>,

    /// Classify and render without creating directories or copying files
    #[arg(long)]
    dry_run: bool,

    /// Print the batch result as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(result) if result.failed() > 0 => ExitCode::from(1),
        Ok(_) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report:?}");
            if let Some(error) = report.downcast_ref::<CatalogError>() {
                return ExitCode::from(map_exit_code(error));
            }
            ExitCode::from(1)
        }
    }
}

fn map_exit_code(error: &CatalogError) -> u8 {
    match error {
        CatalogError::InvalidPattern(_) => 2,
        _ => 1,
    }
}

fn run() -> miette::Result<BatchResult> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let mut config = ConfigLoader::resolve(cli.config.as_deref())?;
    if cli.avoid_overwrite {
        config.avoid_overwrite = true;
    }
    if let Some(root) = cli.output_root.clone() {
        config = config.with_output_root(root);
    }

    let options = RunOptions {
        dry_run: cli.dry_run,
    };
    let result = if cli.dry_run {
        run_batch(App::new(config, DryRunStore), &cli.pattern, &options, output_mode)?
    } else {
        run_batch(App::new(config, LocalStore), &cli.pattern, &options, output_mode)?
    };

    match output_mode {
        OutputMode::Json => JsonOutput::print_batch(&result).into_diagnostic()?,
        OutputMode::Human => print_summary(&result),
    }
    Ok(result)
}

fn run_batch<S: AssetStore>(
    app: App<S>,
    pattern: &str,
    options: &RunOptions,
    output_mode: OutputMode,
) -> miette::Result<BatchResult> {
    let result = match output_mode {
        OutputMode::Json => app.run_batch(pattern, options, &JsonOutput)?,
        OutputMode::Human => app.run_batch(pattern, options, &ConsoleOutput)?,
    };
    Ok(result)
}

fn print_summary(result: &BatchResult) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    if result.directories.is_empty() {
        println!("{yellow}no experiment directories matched{reset}");
        return;
    }

    for entry in &result.directories {
        match (&entry.report, &entry.error) {
            (Some(report), _) => {
                println!(
                    "{green}ok {} -> {} (copied {}, kept {}, duplicates {}){reset}",
                    entry.directory,
                    report.manifest_path,
                    report.copied,
                    report.kept_existing,
                    report.duplicates
                );
                for skipped in &report.skipped {
                    println!("{yellow}   skipped {skipped}{reset}");
                }
                if let Some(manifest) = &report.manifest {
                    print!("{manifest}");
                }
            }
            (None, error) => {
                println!(
                    "{red}failed {}: {}{reset}",
                    entry.directory,
                    error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }

    println!(
        "{} directories, {} failed",
        result.directories.len(),
        result.failed()
    );
}
