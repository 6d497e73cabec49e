//! Autofill API CLI - serve the API or manage its database from the terminal

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use autofill_api::config::{self, AutofillConfig, Overrides, ServerConfig, StorageLocation};
use autofill_api::storage::SqliteStore;
use autofill_api::{seed, ui, PlatformMappings, SeedOutcome};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "autofill-api")]
#[command(version)]
#[command(about = "Job Application Autofill API - field mappings and logs for the autofill extension")]
#[command(long_about = r#"
Backend for the job application autofill extension. Stores:
  • Field mappings (CSS selector candidates per ATS platform)
  • Application logs (one record per autofill attempt)
  • Custom selectors (per-domain overrides)

Example usage:
  autofill-api init
  autofill-api serve --port 8000
  autofill-api seed
  autofill-api mappings greenhouse
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Storage connection string (sqlite://path)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Insert the default Greenhouse mappings if none exist
    Seed {
        /// Storage connection string (sqlite://path)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Show the resolved mappings of a platform
    Mappings {
        /// Platform name, e.g. greenhouse
        platform: String,

        /// Storage connection string (sqlite://path)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Show row counts
    Stats {
        /// Storage connection string (sqlite://path)
        #[arg(short, long)]
        database: Option<String>,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);

    match cli.command {
        Commands::Serve { host, port, database } => {
            let file = config::load_config(Some(config_path.as_path()))?;
            let settings = ServerConfig::from_env(Overrides { database, host, port }, file)?;

            ui::header(&format!("Autofill API v{}", env!("CARGO_PKG_VERSION")));
            ui::info("Database", &settings.database.to_string());
            ui::info("Listening", &format!("http://{}:{}", settings.host, settings.port));

            autofill_api::server::start_server(settings).await?;
        }

        Commands::Seed { database } => {
            let mut store = open_store(&config_path, database)?;
            let outcome = seed::seed_greenhouse(&mut store)?;
            match outcome {
                SeedOutcome::Seeded(_) => ui::success(&outcome.message()),
                SeedOutcome::AlreadySeeded => ui::warn(&outcome.message()),
            }
        }

        Commands::Mappings { platform, database } => {
            let store = open_store(&config_path, database)?;
            let rows = store.find_field_mappings_by_platform(&platform)?;
            let resolved = PlatformMappings::resolve(platform.as_str(), rows);

            if resolved.is_empty() {
                ui::warn(&format!("No mappings for platform '{}'", platform));
            } else {
                ui::header(&format!("Mappings for {}", platform));
                println!("{}", ui::mappings_table(&resolved));
            }
        }

        Commands::Stats { database } => {
            let store = open_store(&config_path, database)?;
            let stats = store.stats()?;

            let field_mappings = stats.field_mappings.to_string();
            let application_logs = stats.application_logs.to_string();
            let custom_selectors = stats.custom_selectors.to_string();
            println!(
                "{}",
                ui::stats_table(&[
                    ("Field mappings", field_mappings.as_str()),
                    ("Application logs", application_logs.as_str()),
                    ("Custom selectors", custom_selectors.as_str()),
                ])
            );
        }

        Commands::Init { force } => {
            if let Err(e) = config::write_config(&config_path, &AutofillConfig::with_defaults(), force) {
                ui::error(&e.to_string());
                return Err(e);
            }
            ui::success(&format!("Wrote {}", config_path.display()));
        }
    }

    Ok(())
}

/// Open the configured database for a one-shot CLI command
fn open_store(config_path: &Path, database: Option<String>) -> anyhow::Result<SqliteStore> {
    let file = config::load_config(Some(config_path))?;
    let settings = ServerConfig::from_env(
        Overrides {
            database,
            ..Overrides::default()
        },
        file,
    )?;

    let store = match &settings.database {
        StorageLocation::File(path) => {
            config::ensure_db_dir(path)?;
            SqliteStore::open(path)?
        }
        StorageLocation::Memory => SqliteStore::open_in_memory()?,
    };
    tracing::debug!("Opened {}", settings.database);
    Ok(store)
}
