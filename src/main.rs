use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono_tz::Tz;
use tokio_util::sync::CancellationToken;

use crossover::appsettings::AppSettings;
use crossover::clock::ZonedClock;
use crossover::engine::CountdownEngine;
use crossover::settings::SettingsStore;
use crossover::storage::FileStore;
use crossover::view::{ConsoleView, LogCelebration};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init();

    let app = AppSettings::load().context("loading app configuration")?;
    // A wrong zone would make every computed instant silently wrong, so an
    // unknown zone name is fatal rather than degraded.
    let zone = app
        .countdown
        .time_zone
        .parse::<Tz>()
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("unknown time zone {:?}", app.countdown.time_zone))?;

    let engine = CountdownEngine::new(
        ZonedClock::new(zone),
        SettingsStore::new(Arc::new(FileStore::new(app.storage.path.clone()))),
        Arc::new(ConsoleView),
        Arc::new(LogCelebration),
        Duration::from_millis(app.countdown.tick_interval_ms),
    );

    let shutdown = CancellationToken::new();
    let signals = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signals.cancel();
        }
    });

    log::info!("Counting down in {zone}");
    engine.run(shutdown).await;
    Ok(())
}
