pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use prodcat_core::config::{AppConfig, ConfigOverrides, LoadOptions, LogFormat, LoggingConfig};
use prodcat_core::{OutputFormat, RecomputePolicy, SortKey};

use crate::commands::list::ListArgs;

#[derive(Debug, Parser)]
#[command(
    name = "prodcat",
    about = "Product catalog filtering view",
    long_about = "Browse a static product catalog joined with its categories and category owners, narrowed by owner, category and name search.",
    after_help = "Examples:\n  prodcat list --owner 2 --query s\n  prodcat list --category 1 --sort product --format html\n  prodcat browse\n  prodcat doctor --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a prodcat.toml config file")]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "JSON dataset to load instead of the embedded catalog")]
    dataset: Option<PathBuf>,
    #[arg(long, global = true, value_parser = parse_recompute, help = "Filter recomputation: pure|chained")]
    recompute: Option<RecomputePolicy>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Render the catalog once with the given filters applied")]
    List {
        #[arg(long, help = "Only products whose category is owned by this user id")]
        owner: Option<u32>,
        #[arg(long, help = "Case-insensitive substring of the product name")]
        query: Option<String>,
        #[arg(long = "category", help = "Category id to include (repeatable)")]
        categories: Vec<u32>,
        #[arg(long, value_parser = commands::parse_sort_key, help = "Sort column: id|product|category|user (repeat to flip direction)")]
        sort: Vec<SortKey>,
        #[arg(long, value_parser = parse_format, help = "Output format: text|json|html")]
        format: Option<OutputFormat>,
    },
    #[command(about = "Interactive session: one filter command per line, re-rendered after each")]
    Browse {
        #[arg(long, value_parser = parse_format, help = "Output format: text|json|html")]
        format: Option<OutputFormat>,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, dataset loading and dataset integrity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

fn parse_recompute(value: &str) -> Result<RecomputePolicy, String> {
    value.parse().map_err(|error: prodcat_core::config::ConfigError| error.to_string())
}

fn parse_format(value: &str) -> Result<OutputFormat, String> {
    value.parse().map_err(|error: prodcat_core::config::ConfigError| error.to_string())
}

impl Cli {
    fn load_options(&self) -> LoadOptions {
        LoadOptions {
            config_path: self.config.clone(),
            require_file: self.config.is_some(),
            overrides: ConfigOverrides {
                dataset_path: self.dataset.clone(),
                recompute: self.recompute,
                ..ConfigOverrides::default()
            },
        }
    }
}

/// Installs the stderr subscriber; stdout carries command output only.
pub fn init_logging(logging: &LoggingConfig) -> Result<()> {
    use tracing::Level;

    let log_level = logging.level.parse::<Level>().unwrap_or(Level::WARN);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow!("failed to install log subscriber: {error}"))
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = cli.load_options();

    let logging = AppConfig::load(options.clone())
        .map(|config| config.logging)
        .unwrap_or_default();
    if let Err(error) = init_logging(&logging) {
        eprintln!("{error:#}");
    }

    let result = match cli.command {
        Command::List { owner, query, categories, sort, format } => commands::list::run(
            options,
            ListArgs { owner, query, categories, sort, format },
        ),
        Command::Browse { format } => commands::browse::run(options, format),
        Command::Config => commands::CommandResult::output(commands::config::run(options)),
        Command::Doctor { json } => {
            let (passed, output) = commands::doctor::run(options, json);
            commands::CommandResult { exit_code: if passed { 0 } else { 1 }, output }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
