//! ev-loader CLI - load the EV population CSV into DuckDB and report on it.

use clap::{Parser, Subcommand};
use ev_loader::{Config, LoadError, LoadStrategy, Pipeline, PipelineResult, Row};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, Level};
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "ev-loader")]
#[command(about = "Load the EV population CSV into DuckDB and run the fixed reports")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// CSV file to load (overrides source.path; used alone when the config file is absent)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Override target table name
    #[arg(long)]
    table: Option<String>,

    /// Override load strategy: bulk, manual or transform
    #[arg(long)]
    strategy: Option<LoadStrategy>,

    /// Store the location column as STRUCT(x, y) instead of loading the spatial extension
    #[arg(long)]
    no_spatial: bool,

    /// Output JSON result to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the table, load it, run every report and export Parquet
    Run {
        /// Skip the Parquet export
        #[arg(long)]
        no_export: bool,

        /// Override export output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Create the table and load it, then print the row count
    Load,

    /// Load the table, then execute a SQL statement and print the rows
    Query {
        /// SQL text, passed through unchanged
        sql: String,
    },

    /// Load the table, then write the Parquet export
    Export {
        /// Override export output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Validate the configuration without touching the database
    Validate,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

fn run() -> Result<(), LoadError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = load_config(&cli)?;
    config.validate()?;

    match cli.command {
        Commands::Validate => {
            println!("Configuration is valid");
            println!("  Source: {:?}", config.source.path);
            println!("  Table: {}", config.target.table);
            println!("  Strategy: {}", config.load.strategy);
        }

        Commands::Load => {
            let mut pipeline = Pipeline::new(config)?;
            let report = pipeline.prepare()?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("\nLoad completed!");
                println!("  Table: {}", report.table);
                println!("  Strategy: {}", report.strategy);
                println!("  Rows loaded: {}", report.rows_loaded);
                println!("  Row count: {}", report.row_count);
                println!("  Duration: {:.2}s", report.duration_seconds);
            }
        }

        Commands::Query { sql } => {
            let mut pipeline = Pipeline::new(config)?;
            pipeline.prepare()?;
            let rows = pipeline.query(&sql)?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print_rows(&rows);
            }
        }

        Commands::Export { output_dir } => {
            if let Some(dir) = output_dir {
                config.export.output_dir = dir;
            }
            let mut pipeline = Pipeline::new(config)?;
            pipeline.prepare()?;
            let export = pipeline.export()?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&export)?);
            } else {
                println!("Exported Parquet partitions to {:?}", export.path);
            }
        }

        Commands::Run {
            no_export,
            output_dir,
        } => {
            if let Some(dir) = output_dir {
                config.export.output_dir = dir;
            }
            let start = Instant::now();
            let mut pipeline = Pipeline::new(config)?;

            // A failed load is logged and the reports still run against
            // whatever the table holds; the load error decides the exit code.
            let (load, load_failure) = match pipeline.prepare() {
                Ok(report) => (Some(report), None),
                Err(e) => {
                    error!("Error during table creation or data loading: {}", e);
                    (None, Some(e))
                }
            };
            let reports = pipeline.run_reports();
            let export = if no_export {
                None
            } else {
                Some(pipeline.export()?)
            };

            let result = PipelineResult {
                load,
                load_error: load_failure.as_ref().map(|e| e.to_string()),
                reports,
                export,
                duration_seconds: start.elapsed().as_secs_f64(),
            };

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nPipeline completed!");
                match (&result.load, &result.load_error) {
                    (Some(load), _) => {
                        println!("  Table: {}", load.table);
                        println!("  Rows loaded: {}", load.rows_loaded);
                    }
                    (None, Some(err)) => println!("  Load failed: {}", err),
                    (None, None) => {}
                }
                for report in &result.reports {
                    println!("\n{}:", report.name);
                    match &report.error {
                        Some(err) => println!("  Error: {}", err),
                        None => print_rows(&report.rows),
                    }
                }
                if let Some(ref export) = result.export {
                    println!("\nExported Parquet partitions to {:?}", export.path);
                }
                println!("\n  Duration: {:.2}s", result.duration_seconds);
            }

            if let Some(e) = load_failure {
                return Err(e);
            }
        }
    }

    Ok(())
}

/// Build the effective configuration from the config file and CLI overrides.
///
/// When `--source` is given and the config file does not exist, defaults are
/// used for everything else.
fn load_config(cli: &Cli) -> Result<Config, LoadError> {
    let mut config = match &cli.source {
        Some(source) if !cli.config.exists() => Config::for_file(source.clone()),
        _ => {
            let config = Config::load(&cli.config)?;
            info!("Loaded configuration from {:?}", cli.config);
            config
        }
    };

    if let Some(ref source) = cli.source {
        config.source.path = source.clone();
    }
    if let Some(ref table) = cli.table {
        config.target.table = table.clone();
    }
    if let Some(strategy) = cli.strategy {
        config.load.strategy = strategy;
    }
    if cli.no_spatial {
        config.target.spatial_extension = false;
    }

    Ok(config)
}

fn print_rows(rows: &[Row]) {
    for row in rows {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("  {}", cells.join(" | "));
    }
    println!("  ({} rows)", rows.len());
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
