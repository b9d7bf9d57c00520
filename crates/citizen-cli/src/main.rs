use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;

use citizen_infrastructure::{BackendFactory, MockStore};
use citizen_shared::config::AppConfig;
use citizen_shared::telemetry::init_telemetry;

mod seed;

#[derive(Parser, Debug)]
#[command(name = "citizen-cli", version, about = "CitizenConnect maintenance commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show whether the backend settings are usable and which client is active
    CheckConfig,
    /// Insert the built-in guide categories and guides
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    let _guard = init_telemetry(&config.log)?;

    let factory = BackendFactory::new(&config.backend, Arc::new(MockStore::new()));

    match cli.command {
        Commands::CheckConfig => {
            println!("backend status : {}", factory.status());
            println!("backend client : {}", factory.kind());
            println!("backend url    : {}", config.backend.url().unwrap_or("<unset>"));
            println!(
                "anon key       : {}",
                if config.backend.anon_key().is_some_and(|k| !k.is_empty()) {
                    "<set>"
                } else {
                    "<unset>"
                }
            );
        }
        Commands::Seed => {
            let client = factory.client();
            info!("Seeding through the {} backend", client.kind());
            let report = seed::run(client.as_ref()).await?;
            println!(
                "seeded {} categories and {} guides ({} backend)",
                report.categories,
                report.guides,
                client.kind()
            );
        }
    }

    Ok(())
}
