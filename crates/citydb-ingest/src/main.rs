//! citydb - GeoNames city loader

use citydb_common::logging::{init_logging, LogConfig, LogLevel};
use citydb_ingest::config::IngestConfig;
use citydb_ingest::geonames::GeonamesError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "citydb")]
#[command(author, version, about = "Load GeoNames city dumps into SQLite")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// SQLite database URL
    #[arg(long, global = true, env = "CITYDB_DATABASE_URL")]
    database_url: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replace the city table with the contents of a dump file
    Load {
        /// Tab-delimited GeoNames dump (defaults to CITYDB_SOURCE or
        /// geonames/cities5000.txt)
        source: Option<PathBuf>,

        /// Rows per INSERT statement
        #[arg(short, long, env = "CITYDB_BATCH_SIZE")]
        batch_size: Option<usize>,
    },

    /// Create the city table if it does not exist
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::builder()
        .level(if cli.verbose {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        })
        .log_file_prefix("citydb")
        .filter_directives("sqlx=warn")
        .build();

    // The loader works without logging, so a bad LOG_* value only warns
    let _guard = match log_config.apply_env().and_then(|config| init_logging(&config)) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging disabled: {:#}", e);
            None
        },
    };

    if let Err(e) = execute(cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {:#}", e);
        if let Some(hint) = table_state_hint(&e) {
            eprintln!("{}", hint);
        }
        process::exit(1);
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let mut config = IngestConfig::load()?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.command {
        Command::Load { source, batch_size } => {
            if let Some(source) = source {
                config.load.source_path = source;
            }
            if let Some(batch_size) = batch_size {
                config.load.batch_size = batch_size;
            }

            info!(
                source = %config.load.source_path.display(),
                database = %config.database.url,
                "Loading cities"
            );

            let stats = citydb_ingest::refresh(&config).await?;

            println!(
                "{} cities loaded from {}.",
                stats.parsed,
                config.load.source_path.display()
            );
            println!("{} cities loaded into database.", stats.table_rows);
        },
        Command::Init => {
            citydb_ingest::init(&config).await?;
            println!("City table ready in {}.", config.database.url);
        },
    }

    Ok(())
}

/// Tell the operator what state the table was left in
fn table_state_hint(err: &anyhow::Error) -> Option<&'static str> {
    let err = err.downcast_ref::<GeonamesError>()?;
    if err.is_parse_failure() {
        Some("The source file could not be read; the city table was not modified.")
    } else if err.is_rolled_back() {
        Some("The load was rolled back; the city table still holds its previous rows.")
    } else {
        None
    }
}
