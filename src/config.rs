use config::{builder::DefaultState, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub model_path: String,
    pub cors_permissive: bool,
}

impl Config {
    /// Defaults, then an optional `triage.toml`, then `TRIAGE_*` env vars.
    pub fn load() -> Result<Self, AppError> {
        let settings = Self::defaults()?
            .add_source(File::with_name("triage").required(false))
            .add_source(Environment::with_prefix("TRIAGE"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>, AppError> {
        Ok(config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("model_path", "models/disease_model.json")?
            .set_default("cors_permissive", true)?)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
