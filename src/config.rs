use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project defaults, also used to seed the user config on first run.
const BLUEPRINT: &str = include_str!("../devis.toml");

/// The one environment variable the client reads.
pub const API_BASE_ENV: &str = "DEVIS_API_BASE";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub api_base: String,
    pub request_timeout_secs: u64,
    pub custom_prompt_path: Option<String>,
    pub log_dir: Option<String>,
}

impl Settings {
    /// Blueprint, then the user's global config, then `./devis.toml`, then an
    /// explicit `--config` file, then `DEVIS_API_BASE`.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let user_config_path = get_user_config_path();

        let mut builder = Config::builder().add_source(File::from_str(BLUEPRINT, FileFormat::Toml));
        if let Some(path) = user_config_path {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(File::with_name("devis.toml").required(false));
        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path).required(true));
        }

        Self::finish(builder, std::env::var(API_BASE_ENV).ok())
    }

    fn finish(builder: ConfigBuilder<DefaultState>, env_api_base: Option<String>) -> Result<Self, ConfigError> {
        let env_api_base = env_api_base.filter(|v| !v.trim().is_empty());
        builder
            .set_override_option("api_base", env_api_base)?
            .build()?
            .try_deserialize()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn log_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).as_ref()),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("devis")
                .join("logs"),
        }
    }
}

pub fn get_user_config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".config");
    path.push("devis");
    path.push("devis.toml");
    Some(path)
}

/// Writes the blueprint to the user config location if nothing is there yet.
/// Returns whether a file was written.
pub fn seed_user_config(path: &Path) -> std::io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, BLUEPRINT)?;
    Ok(true)
}
