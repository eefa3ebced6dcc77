// Command line entry point. Flags override the settings file, which overrides
// built-in defaults. Generation failures name the stage they happened in and
// exit 1; a bad settings file or retention pattern exits 2 before any file is
// touched.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use config::{Config, File};
use regex::Regex;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use modelgen::error::ModelgenError;
use modelgen::parse::{ParseOptions, parse};
use modelgen::pipeline::{RunConfig, run};

#[derive(Parser, Debug)]
#[command(name = "modelgen", version, about = "Schema-driven Java source generator")]
struct Cli {
    /// Schema definition file.
    #[arg(long)]
    schema: PathBuf,
    /// Root directory for generated sources.
    #[arg(long)]
    out: PathBuf,
    /// Synthesize `1.0.<n>` versions for entities without an explicit tag.
    #[arg(long)]
    auto_version: bool,
    /// Settings file. Without this flag a `modelgen.toml` next to the working
    /// directory is picked up when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the parsed model as JSON and skip cleanup and generation.
    #[arg(long)]
    dump_model: bool,
}

#[derive(Debug, Deserialize)]
struct Settings {
    target_extension: String,
    retention_pattern: String,
    auto_version: bool,
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, ModelgenError> {
    let wrap = |e: config::ConfigError| ModelgenError::Config(e.to_string());
    let mut builder = Config::builder()
        .set_default("target_extension", "java")
        .map_err(wrap)?
        .set_default("retention_pattern", r"^\s*//\s+KEEP")
        .map_err(wrap)?
        .set_default("auto_version", false)
        .map_err(wrap)?;
    builder = match path {
        Some(p) => builder.add_source(File::from(p.clone())),
        None => builder.add_source(File::with_name("modelgen").required(false)),
    };
    builder.build().map_err(wrap)?.try_deserialize().map_err(wrap)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("modelgen: {e}");
            return ExitCode::from(2);
        }
    };
    let retention = match Regex::new(&settings.retention_pattern) {
        Ok(retention) => retention,
        Err(e) => {
            eprintln!("modelgen: Config error: invalid retention pattern: {e}");
            return ExitCode::from(2);
        }
    };
    let options = ParseOptions {
        auto_version_namespace: cli.auto_version || settings.auto_version,
    };

    if cli.dump_model {
        return dump_model(&cli.schema, options);
    }

    let config = RunConfig {
        schema_path: cli.schema,
        out_root: cli.out,
        options,
        target_extension: settings.target_extension,
        retention,
    };
    match run(&config) {
        Ok(summary) => {
            info!(
                entities = summary.entities,
                files = summary.written.len(),
                stale_removed = summary.reconciled.deleted_files,
                "generation complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("modelgen: {e}");
            ExitCode::FAILURE
        }
    }
}

fn dump_model(schema: &PathBuf, options: ParseOptions) -> ExitCode {
    let outcome = fs::read_to_string(schema)
        .map_err(|e| ModelgenError::file_system(schema, e))
        .and_then(|source| parse(&source, options))
        .and_then(|model| {
            serde_json::to_string_pretty(&model).map_err(|e| ModelgenError::Config(e.to_string()))
        });
    match outcome {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("modelgen: parse stage failed: {e}");
            ExitCode::FAILURE
        }
    }
}
