//! test-selector command-line entry point
//!
//! Reads candidate tests as JSON, applies selection, and writes them back
//! out with skip annotations.

use clap::Parser;
use std::path::Path;
use test_selector::cancel::Cancellation;
use test_selector::cli::{Cli, Command, DEFAULT_CONFIG_PATH, SelectArgs, generate_config_template};
use test_selector::config::{AuthMode, Config};
use test_selector::error::{AppError, AppResult, SelectionFailure};
use test_selector::metrics::Metrics;
use test_selector::selection::TestSelection;
use test_selector::selector::CandidateTest;
use test_selector::source::{Credentials, FileSource, GcsSource, ObjectNaming, StatisticsSource};
use test_selector::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Config { output } => {
            let template = generate_config_template();
            match output {
                Some(path) => {
                    std::fs::write(&path, template)?;
                    eprintln!("Wrote template configuration to {}", path);
                }
                None => print!("{}", template),
            }
            Ok(())
        }
        Command::Select(args) => {
            let config = load_config(&cli.config)?;
            telemetry::init(&config.observability.log_level);
            run_select(&config, args).await?;
            Ok(())
        }
    }
}

/// Load the config file, falling back to defaults when the default path is absent
fn load_config(path: &str) -> AppResult<Config> {
    if path == DEFAULT_CONFIG_PATH && !Path::new(path).exists() {
        return Ok(Config::default());
    }
    Config::from_file(path)
}

async fn run_select(config: &Config, args: SelectArgs) -> AppResult<()> {
    let mut tests = read_candidates(&args.tests)?;
    let metrics = Metrics::new()?;

    let result = match build_source(config, &args) {
        Ok(source) => {
            TestSelection::new(source.as_ref())
                .with_metrics(&metrics)
                .run(&Cancellation::never(), &mut tests, &args.cloud, &args.suite)
                .await
        }
        Err(source) => {
            metrics.record_fetch_failure(source.kind());
            Err(SelectionFailure {
                suite: args.suite.clone(),
                cloud: args.cloud.clone(),
                fallback_count: tests.len(),
                source,
            })
        }
    };

    let runnable = match result {
        Ok(summary) => summary.runnable(),
        Err(failure) => {
            tracing::error!(error = %failure, "Running all candidates");
            if args.strict {
                write_metrics(&metrics, &args)?;
                return Err(failure.into_inner());
            }
            failure.fallback_count
        }
    };

    tracing::info!(
        suite = %args.suite,
        cloud = %args.cloud,
        candidates = tests.len(),
        runnable,
        "Selection finished"
    );

    write_candidates(&tests, args.output.as_deref())?;
    write_metrics(&metrics, &args)
}

fn build_source(config: &Config, args: &SelectArgs) -> AppResult<Box<dyn StatisticsSource>> {
    if let Some(dir) = &args.stats_dir {
        tracing::info!(dir = %dir.display(), "Reading statistics from local directory");
        return Ok(Box::new(FileSource::new(
            dir.clone(),
            ObjectNaming::from(&config.storage),
        )));
    }

    let env_name = config.storage.credentials_env();
    let credentials = match std::env::var(env_name) {
        Ok(json) if !json.is_empty() => Credentials::from_json(json.as_bytes())?,
        _ => {
            tracing::info!(
                env = %env_name,
                auth = ?config.storage.auth(),
                "Credentials environment variable is not set"
            );
            match config.storage.auth() {
                AuthMode::Default => Credentials::Ambient,
                AuthMode::Anonymous => Credentials::Anonymous,
            }
        }
    };

    Ok(Box::new(GcsSource::new(config.storage.clone(), credentials)?))
}

fn read_candidates(path: &Path) -> AppResult<Vec<CandidateTest>> {
    let content = std::fs::read_to_string(path).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

fn write_candidates(tests: &[CandidateTest], output: Option<&Path>) -> AppResult<()> {
    let json = serde_json::to_string_pretty(tests)?;
    match output {
        Some(path) => std::fs::write(path, json).map_err(|source| AppError::Io {
            path: path.display().to_string(),
            source,
        }),
        None => {
            println!("{}", json);
            Ok(())
        }
    }
}

fn write_metrics(metrics: &Metrics, args: &SelectArgs) -> AppResult<()> {
    let Some(path) = &args.metrics_file else {
        return Ok(());
    };
    let text = metrics.gather()?;
    std::fs::write(path, text).map_err(|source| AppError::Io {
        path: path.display().to_string(),
        source,
    })
}
