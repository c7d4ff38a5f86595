use std::path::PathBuf;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::{PackError, Result};

pub const ENV_PREFIX: &str = "PACKS";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub batch_size: usize,
    pub progress_every: u64,
    pub output_dir: PathBuf,
    pub analyze: bool,
    pub vacuum: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            batch_size: 1000,
            progress_every: 5000,
            output_dir: PathBuf::from("packs"),
            analyze: true,
            vacuum: true,
        }
    }
}

impl Settings {
    /// Defaults, then `packs.{toml,json,yaml}` if present, then `PACKS_*` env vars.
    pub fn load() -> Result<Self> {
        Self::from_config(
            Self::builder()?
                .add_source(File::with_name("packs").required(false))
                .add_source(Environment::with_prefix(ENV_PREFIX))
                .build()?,
        )
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let d = Settings::default();
        Ok(Config::builder()
            .set_default("batch_size", d.batch_size as u64)?
            .set_default("progress_every", d.progress_every)?
            .set_default("output_dir", d.output_dir.to_string_lossy().into_owned())?
            .set_default("analyze", d.analyze)?
            .set_default("vacuum", d.vacuum)?)
    }

    fn from_config(cfg: Config) -> Result<Self> {
        let settings: Settings = cfg.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(PackError::InvalidSetting {
                key: "batch_size",
                reason: "must be at least 1".into(),
            });
        }
        if self.progress_every == 0 {
            return Err(PackError::InvalidSetting {
                key: "progress_every",
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}
