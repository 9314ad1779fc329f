//! mongo-pg-migrate CLI - MongoDB export to PostgreSQL migration.

use clap::{Parser, Subcommand};
use mongo_pg_migrate::{Config, MigrateError, Orchestrator};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "mongo-pg-migrate")]
#[command(about = "Migrate MongoDB JSON exports into PostgreSQL")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long, default_value = "migration.yaml")]
    config: PathBuf,

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
    /// Run the migration
    Run {
        /// Show the migration plan without transferring data
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the collection migration order
    Plan,

    /// Validate the configuration file
    Validate,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(|e| MigrateError::Config(e.to_string()))?;

    let config = Config::load(&cli.config)?;
    info!("Loaded configuration from {:?}", cli.config);

    match cli.command {
        Commands::Run { dry_run } => {
            if dry_run {
                // No database connection needed to show the plan
                print_plan(&mongo_pg_migrate::migration_plan(&config)?);
                return Ok(());
            }

            let orchestrator = Orchestrator::new(config).await?;
            let result = orchestrator.run().await?;

            if cli.output_json {
                println!("{}", result.to_json()?);
            } else {
                println!("\nMigration completed!");
                println!("  Run ID: {}", result.run_id);
                println!("  Duration: {:.2}s", result.duration_seconds);
                println!("  Collections: {}", result.collections_total);
                println!("  Rows: {}", result.rows_migrated);
                for col in &result.collections {
                    println!("    {} -> {}: {} rows", col.collection, col.table, col.rows);
                }
            }
        }

        Commands::Plan => {
            let order = mongo_pg_migrate::migration_plan(&config)?;
            print_plan(&order);
        }

        Commands::Validate => {
            // Config::load already validated; report success
            println!(
                "Configuration OK: {} collections",
                config.collections.len()
            );
        }
    }

    Ok(())
}

fn print_plan(order: &[String]) {
    println!("Migration order:");
    for (i, collection) in order.iter().enumerate() {
        println!("  {}. {}", i + 1, collection);
    }
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
