//! oas-changes: structural what-changed reports for OpenAPI 3.x documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oas_changes::{
    config::{generate_json_schema, AppConfig, ConfigPreset, DiffPaths, Validatable},
    pipeline::{self, exit_codes},
    reports::ReportFormat,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "oas-changes")]
#[command(version)]
#[command(about = "Structural what-changed reports for OpenAPI 3.x documents", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  No changes detected (or the failing flags are off)
    1  Changes detected (--fail-on-change)
    2  Breaking changes detected (--fail-on-breaking)
    3  Error occurred

EXAMPLES:
    # Markdown report on stdout
    oas-changes diff v1.yaml v2.yaml

    # HTML report in CI, failing on breaking changes
    oas-changes diff v1.yaml v2.yaml -o html --output-file changes.html --fail-on-breaking")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "OAS_CHANGES_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `diff` subcommand
#[derive(Parser)]
struct DiffArgs {
    /// Path to the original document
    left: PathBuf,

    /// Path to the modified document
    right: PathBuf,

    /// Output format [default: markdown]
    #[arg(short, long)]
    output: Option<ReportFormat>,

    /// Output file path (stdout if not specified)
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Named preset applied before the config file: default, ci, strict
    #[arg(long)]
    preset: Option<String>,

    /// Fail when an object kind has no visit rule
    #[arg(long)]
    strict: bool,

    /// Exit with code 2 if breaking changes are found
    #[arg(long)]
    fail_on_breaking: bool,

    /// Exit with code 1 if any change is found
    #[arg(long)]
    fail_on_change: bool,

    /// Include compared paths and a timestamp in the report
    #[arg(long)]
    metadata: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two OpenAPI documents and report what changed
    Diff(DiffArgs),

    /// Print the JSON Schema of the configuration file
    ConfigSchema,

    /// Print an example configuration file
    ConfigExample,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Diff(args) => run_diff(args, cli.config, cli.quiet),
        Commands::ConfigSchema => {
            println!("{}", generate_json_schema().context("failed to serialize schema")?);
            Ok(exit_codes::SUCCESS)
        }
        Commands::ConfigExample => {
            print!("{}", oas_changes::config::generate_example_config());
            Ok(exit_codes::SUCCESS)
        }
    }
}

fn run_diff(args: DiffArgs, config_path: Option<PathBuf>, quiet: bool) -> Result<i32> {
    let (mut config, loaded_from) = match args.preset.as_deref() {
        Some(name) => {
            let preset = ConfigPreset::from_name(name)
                .with_context(|| format!("unknown preset '{name}'"))?;
            let (file, loaded_from) = oas_changes::config::load_or_default(config_path.as_deref());
            let mut config = AppConfig::from_preset(preset);
            config.merge(&file);
            (config, loaded_from)
        }
        None => oas_changes::config::load_or_default(config_path.as_deref()),
    };
    if let Some(path) = &loaded_from {
        tracing::debug!("Using config file {}", path.display());
    }

    let overrides = AppConfig::builder()
        .output_file(args.output_file)
        .strict(args.strict)
        .fail_on_breaking(args.fail_on_breaking)
        .fail_on_change(args.fail_on_change)
        .include_metadata(args.metadata)
        .quiet(quiet)
        .build();
    config.merge(&overrides);
    // merge skips default values, so `-o markdown` is applied here
    if let Some(format) = args.output {
        config.output.format = format;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!("invalid configuration:\n  {}", messages.join("\n  "));
    }

    let paths = DiffPaths::new(args.left, args.right);
    let comparison = pipeline::compare_files(&paths, &config)?;
    pipeline::output_report(&comparison, &config)?;
    Ok(pipeline::exit_code(&comparison, &config.behavior))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_diff_args() {
        let cli = Cli::parse_from([
            "oas-changes",
            "diff",
            "v1.yaml",
            "v2.yaml",
            "-o",
            "html",
            "--fail-on-breaking",
        ]);
        let Commands::Diff(args) = cli.command else {
            panic!("expected diff");
        };
        assert_eq!(args.output, Some(ReportFormat::Html));
        assert!(args.fail_on_breaking);
        assert!(!args.strict);
    }
}
