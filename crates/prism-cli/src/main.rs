mod registry;
mod report;
mod values;

use std::path::PathBuf;
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use prism_config::{ConfigError, config_json_schema, load_config_file, read_document};
use prism_core::AggregatorRegistry;
use prism_rating::{RatingError, RatingPipeline};
use registry::{RunContext, init_logging, start_run, write_ratings};
use report::{RatingsReport, print_config_failure, print_config_ok};
use thiserror::Error;
use uuid::Uuid;
use values::{ValuesError, extract_values};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("rating error: {0}")]
    Rating(#[from] RatingError),
    #[error("values error: {0}")]
    Values(#[from] ValuesError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} of {1} config file(s) failed validation")]
    ValidationFailed(usize, usize),
    #[error("strict mode: metrics without values: {}", .0.join(", "))]
    SkippedMetrics(Vec<String>),
}

#[derive(Parser, Debug)]
#[command(name = "prism", version, about = "Prism model rating CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Rate a model from its config and computed metric values.
    Rate(RateArgs),
    /// Validate model config files.
    Validate(ValidateArgs),
    /// Print the JSON Schema for model config files.
    Schema(SchemaArgs),
}

#[derive(Args, Debug)]
struct RateArgs {
    /// Model config (YAML, JSON or TOML).
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
    /// Metric values keyed by metric (number or result object).
    #[arg(long, value_name = "PATH")]
    values: PathBuf,
    /// Output directory for runs; no run artifacts are written when omitted.
    #[arg(long)]
    run_dir: Option<PathBuf>,
    /// Optional output path for ratings.json.
    #[arg(long)]
    out: Option<PathBuf>,
    /// Fail when a declared metric has no value.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct ValidateArgs {
    /// Config files to check.
    #[arg(value_name = "PATH", required = true)]
    files: Vec<PathBuf>,
}

#[derive(Args, Debug)]
struct SchemaArgs {
    /// Write the schema here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Rate(args) => run_rate(args),
        Command::Validate(args) => run_validate(args),
        Command::Schema(args) => run_schema(args),
    }
}

fn run_rate(args: RateArgs) -> Result<(), CliError> {
    let RateArgs {
        config,
        values,
        run_dir,
        out,
        strict,
    } = args;

    let registry = AggregatorRegistry::new();
    let validated = match load_config_file(&config, &registry) {
        Ok(validated) => validated,
        Err(ConfigError::Invalid(report)) => {
            print_config_failure(&config, &report);
            return Err(ConfigError::Invalid(report).into());
        }
        Err(err) => return Err(err.into()),
    };

    let run_id = Uuid::new_v4().to_string();
    let run_paths = match run_dir {
        Some(run_dir) => {
            let run_ctx = RunContext {
                run_id: run_id.clone(),
                started_at: chrono::Utc::now(),
                model_id: validated.config.model_id.clone(),
                config_path: config.clone(),
                values_path: values.clone(),
                strict,
                run_dir,
            };
            Some(start_run(&run_ctx)?)
        }
        None => None,
    };
    init_logging(run_paths.as_ref().map(|paths| paths.logs_path.as_path()))?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        model_id = %validated.config.model_id,
        strict
    );
    if let Some(paths) = &run_paths {
        tracing::info!(event = "run_dir_created", path = %paths.root.display());
    }
    let timer = Instant::now();

    for issue in &validated.warnings {
        tracing::warn!(
            event = "config_warning",
            code = %issue.code,
            path = %issue.path,
            message = %issue.message
        );
    }

    let document = read_document(&values)?;
    let extracted = extract_values(&document, &validated.config)?;
    for skipped in &extracted.skipped {
        tracing::warn!(
            event = "value_skipped",
            metric = %skipped.metric,
            reason = %skipped.reason
        );
    }
    tracing::info!(event = "values_loaded", count = extracted.values.len());

    let result = RatingPipeline::new(&registry).compute(&validated.rating, &extracted.values)?;

    let run_id_ref = run_paths.as_ref().map(|_| run_id.as_str());
    let ratings = RatingsReport::new(&validated.config, &result, run_id_ref);
    write_ratings(run_paths.as_ref(), &ratings, out.as_deref())?;
    if let Some(paths) = &run_paths {
        tracing::info!(event = "ratings_written", path = %paths.ratings_path.display());
    }
    println!("{}", serde_json::to_string_pretty(&ratings)?);

    if let Err(err) = enforce_strict(strict, &result.skipped) {
        tracing::warn!(event = "run_finished", status = "failed", skipped = result.skipped.len());
        return Err(err);
    }

    let duration_ms = timer.elapsed().as_millis();
    tracing::info!(event = "run_finished", status = "success", duration_ms = duration_ms);

    Ok(())
}

/// In strict mode every declared metric must have produced a color.
fn enforce_strict(strict: bool, skipped: &[String]) -> Result<(), CliError> {
    if strict && !skipped.is_empty() {
        return Err(CliError::SkippedMetrics(skipped.to_vec()));
    }
    Ok(())
}

fn run_validate(args: ValidateArgs) -> Result<(), CliError> {
    validate_files(&args.files, &AggregatorRegistry::new())
}

/// Check every file, printing a verdict per file; fails if any file failed.
fn validate_files(files: &[PathBuf], registry: &AggregatorRegistry) -> Result<(), CliError> {
    let total = files.len();
    let mut failed = 0;

    for path in files {
        match load_config_file(path, registry) {
            Ok(validated) => print_config_ok(path, &validated.warnings),
            Err(ConfigError::Invalid(report)) => {
                print_config_failure(path, &report);
                failed += 1;
            }
            Err(err) => {
                println!("[FAIL] {}: {err}", path.display());
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::ValidationFailed(failed, total));
    }
    Ok(())
}

fn run_schema(args: SchemaArgs) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&config_json_schema())?;
    match args.out {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}
