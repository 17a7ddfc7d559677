use clap::Parser;
use tracing_subscriber::EnvFilter;

use safehold::config::{Cli, Command, Config};
use safehold::db;

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli)?;
    let db_path = config.db_path();
    tracing::info!("Database: {}", db_path.display());

    let pool = db::create_pool(&db_path, config.database.max_connections)?;

    match cli.command {
        Command::Up => {
            let applied = db::run_migrations(&pool)?;
            if applied.is_empty() {
                println!("Database is up to date");
            }
            for id in applied {
                println!("Applied {id}");
            }
        }
        Command::Down { steps, all } => {
            let steps = if all { None } else { Some(steps) };
            let reverted = db::revert_migrations(&pool, steps)?;
            if reverted.is_empty() {
                println!("Nothing to revert");
            }
            for id in reverted {
                println!("Reverted {id}");
            }
        }
        Command::Status { json } => {
            let status = db::migration_status(&pool)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                for entry in status {
                    match entry.applied_at {
                        Some(at) => println!("{:<24} applied {}", entry.id, at),
                        None => println!("{:<24} pending", entry.id),
                    }
                }
            }
        }
    }

    Ok(())
}
