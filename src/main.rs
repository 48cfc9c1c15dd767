use anyhow::{Context, Result};
use clap::Parser;
use fundata::{prepare_data, PrepareConfig, PrepareOptions, PrepareOutcome, ProjectFilter};
use std::{path::PathBuf, process::ExitCode};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

/// Clean a semicolon-delimited survey export.
#[derive(Parser, Debug)]
#[command(name = "fundata", version, about)]
struct Args {
    /// Export file to read.
    input: PathBuf,

    /// Where to write the cleaned table.
    #[arg(short, long)]
    output: PathBuf,

    /// `all`, or a comma-separated list of project names.
    #[arg(short, long, default_value = "funaction")]
    project: String,

    /// Keep photo attachment columns.
    #[arg(long)]
    keep_photos: bool,

    /// Keep boolean data-check columns.
    #[arg(long)]
    keep_checks: bool,

    /// YAML file overriding the built-in rules and settings.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> Result<ExitCode> {
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fundata=info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PrepareConfig::from_yaml_file(path)?,
        None => PrepareConfig::default(),
    };
    let filter: ProjectFilter = args
        .project
        .parse()
        .with_context(|| format!("invalid --project `{}`", args.project))?;

    let opts = PrepareOptions::new(&args.input, &args.output)
        .project_filter(filter)
        .remove_photo_columns(!args.keep_photos)
        .remove_check_columns(!args.keep_checks)
        .config(config);

    match prepare_data(&opts).context("preparing survey export")? {
        PrepareOutcome::Prepared(table) => {
            info!("done");
            println!(
                "{} rows x {} columns written to {}",
                table.n_rows(),
                table.n_columns(),
                args.output.display()
            );
            Ok(ExitCode::SUCCESS)
        }
        PrepareOutcome::InputMissing { message, .. } => {
            eprintln!("{}", message);
            Ok(ExitCode::from(2))
        }
    }
}
