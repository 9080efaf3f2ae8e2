use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::clock::ZonedClock;
use crate::phase::{self, Phase};
use crate::settings::{Settings, SettingsStore};
use crate::view::{CelebrationEffect, CountdownView};

pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Drives the load-settings → evaluate → render pipeline on a fixed
/// interval from a single task, so ticks never overlap.
pub struct CountdownEngine {
    clock: ZonedClock,
    settings: SettingsStore,
    view: Arc<dyn CountdownView>,
    celebration: Arc<dyn CelebrationEffect>,
    tick_interval: Duration,
}

impl CountdownEngine {
    pub fn new(
        clock: ZonedClock,
        settings: SettingsStore,
        view: Arc<dyn CountdownView>,
        celebration: Arc<dyn CelebrationEffect>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            clock,
            settings,
            view,
            celebration,
            tick_interval,
        }
    }

    pub async fn run(&self, shutdown: CancellationToken) {
        let mut interval = tokio::time::interval(self.tick_interval);
        let mut previous: Option<Phase> = None;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    log::info!("Countdown loop shutting down");
                    break;
                }
                _ = interval.tick() => {
                    previous = Some(self.tick(previous).await);
                }
            }
        }
    }

    /// One full pipeline pass. Settings are re-read from the store every
    /// tick, so edits (including a target moved back into the future after
    /// elapsing) take effect on the next pass.
    pub async fn tick(&self, previous: Option<Phase>) -> Phase {
        let settings = self.settings.load();
        let frame = phase::evaluate(&self.clock, Utc::now(), &settings);
        let current = frame.phase;
        if previous != Some(current) {
            self.on_phase_change(previous, current).await;
        }
        self.view.render(&frame).await;
        current
    }

    // Celebration side effects fire on phase edges only, never re-fire
    // while a phase persists.
    async fn on_phase_change(&self, from: Option<Phase>, to: Phase) {
        if to == Phase::Elapsed {
            if let Err(err) = self.celebration.start().await {
                log::warn!("Celebration effect failed to start: {err:#}");
            }
        } else if from == Some(Phase::Elapsed) {
            if let Err(err) = self.celebration.stop().await {
                log::warn!("Celebration effect failed to stop: {err:#}");
            }
        }
    }

    /// Persists an edited settings record as the full new blob.
    pub fn apply(&self, settings: &Settings) -> anyhow::Result<()> {
        self.settings.save(settings)
    }

    pub fn reset(&self) -> anyhow::Result<Settings> {
        self.settings.reset()
    }

    /// Collapses the waiting phase: the target becomes the next zone-local
    /// midnight and the window is stretched to cover the whole gap, so the
    /// final countdown begins immediately.
    pub fn start_now(&self, now: DateTime<Utc>) -> anyhow::Result<Settings> {
        let midnight = self.clock.next_midnight(now);
        // Always positive: the next midnight is strictly after `now`.
        let until_midnight = (midnight - now).num_milliseconds();
        let duration_minutes = u32::try_from(((until_midnight + 59_999) / 60_000).max(1))?;

        let next = Settings {
            duration_minutes,
            show_meta: true,
            target: Some(self.clock.components_of(midnight)),
        };
        self.settings.save(&next)?;
        Ok(next)
    }
}
