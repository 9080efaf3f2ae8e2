use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct CountdownConfig {
    pub time_zone: String,
    pub tick_interval_ms: u64,
}

#[derive(Deserialize, Debug)]
pub struct StorageConfig {
    pub path: PathBuf,
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub countdown: CountdownConfig,
    pub storage: StorageConfig,
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Self::defaults(Config::builder())?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

    fn defaults(
        builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        builder
            .set_default("countdown.time_zone", "Africa/Lagos")?
            .set_default("countdown.tick_interval_ms", 250)?
            .set_default("storage.path", "./data")
    }
}
