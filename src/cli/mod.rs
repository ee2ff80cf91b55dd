use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use crate::config::AppConfig;
use crate::core::llm::LlmManager;
use crate::core::pipeline::Pipeline;
use crate::core::store::{Store, seed_default_prompts};
use crate::interfaces::web;

fn print_help() {
    println!("vra - Video Risk Assessment service\n");
    println!("Commands:");
    println!("  serve    Start the API server (default)");
    println!("  seed     Install the stock agent instructions into the prompt store");
    println!("  help     Show this message\n");
    println!("Usage: vra <command>");
}

pub(crate) async fn run_main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str).unwrap_or("serve") {
        "serve" => serve().await,
        "seed" => seed().await,
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        other => {
            print_help();
            bail!("unknown command: {}", other);
        }
    }
}

async fn serve() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let config = AppConfig::from_env()?;
    info!(
        "Starting VRA service (scope: {}/{}, db: {})",
        config.scope.app_name,
        config.scope.region,
        config.db_path.display()
    );

    let store = Store::open(&config.db_path)?;
    let llm = Arc::new(LlmManager::from_config(&config)?);
    let pipeline = Arc::new(Pipeline::new(store.clone(), llm, &config));

    web::serve(&config, store, pipeline).await
}

async fn seed() -> Result<()> {
    let config = AppConfig::from_env()?;
    let store = Store::open(&config.db_path)?;
    let count = seed_default_prompts(&store, &config.scope).await?;
    println!(
        "Seeded {} prompts under scope {}/{}",
        count, config.scope.app_name, config.scope.region
    );
    Ok(())
}
