use std::env;
use std::sync::Arc;

use database::Database;
use orchestrator::{LoggingNotifier, SearchOrchestrator};
use perplexity_search::PerplexityProvider;
use scheduler::{DueCheckScheduler, SchedulerConfig};
use telegram_client::TelegramClient;
use tracing::{info, warn};
use watch_core::{Notifier, SearchProvider, SystemClock};

/// Dry run when `WATCH_DRY_RUN` is set to a truthy value.
fn dry_run() -> bool {
    env::var("WATCH_DRY_RUN")
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

async fn build_notifier() -> Result<Arc<dyn Notifier>, Box<dyn std::error::Error>> {
    if dry_run() {
        info!("Dry run: messages are logged, not sent");
        return Ok(Arc::new(LoggingNotifier));
    }

    match TelegramClient::from_env() {
        Ok(client) => {
            // A rejected token fails here rather than on the first delivery.
            client.get_me().await?;
            Ok(Arc::new(client))
        }
        Err(e) if env::var("BOT_TOKEN").is_err() => {
            warn!("{}; falling back to logging notifier", e);
            Ok(Arc::new(LoggingNotifier))
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = SchedulerConfig::from_env()?;

    info!("Opening database at {}", config.database_url);
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let provider = PerplexityProvider::from_env()?;
    info!("Using search provider: {}", provider.name());

    let notifier = build_notifier().await?;

    let scheduler = DueCheckScheduler::new(
        db.clone(),
        SearchOrchestrator::new(provider),
        notifier,
        SystemClock,
        config,
    );

    tokio::select! {
        _ = scheduler.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutting down");
        }
    }

    db.close().await;
    Ok(())
}
