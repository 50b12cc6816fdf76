use config::{Config, ConfigError, Environment, File};
use sbadmin_core::administration::AdministrationClientOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "SBADMIN";
const CONFIG_FILE_NAME: &str = "config.toml";
const MAX_PAGE_SIZE: u32 = 1000;

/// Application configuration: the namespace to administer, client tuning
/// and logging.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    connection_string: Option<String>,
    #[serde(default)]
    client: AdministrationClientOptions,
    #[serde(default)]
    logging: LoggingConfig,
}

impl AppConfig {
    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string
            .as_deref()
            .filter(|s| !s.trim().is_empty())
    }

    pub fn client(&self) -> &AdministrationClientOptions {
        &self.client
    }

    pub fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    pub fn validate(&self) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        if self.client.page_size == 0 || self.client.page_size > MAX_PAGE_SIZE {
            errors.push(ConfigValidationError::PageSize {
                configured: self.client.page_size,
                limit: MAX_PAGE_SIZE,
            });
        }
        if self.client.timeout_secs == 0 {
            errors.push(ConfigValidationError::Timeout);
        }
        if self.client.sas_validity().is_err() {
            errors.push(ConfigValidationError::SasValidity {
                configured: self.client.sas_token_validity_hours,
            });
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingConfig {
    level: Option<String>,
    file: Option<String>,
}

impl LoggingConfig {
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or("info")
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("client.page_size must be between 1 and {limit}, got {configured}")]
    PageSize { configured: u32, limit: u32 },
    #[error("client.timeout_secs must be greater than zero")]
    Timeout,
    #[error("client.sas_token_validity_hours must be a positive, representable number of hours, got {configured}")]
    SasValidity { configured: i64 },
}

/// Load `.env`, then the config file, then `SBADMIN__*` environment overrides.
///
/// An explicit path must exist. Without one, the user config directory and
/// the working directory are both consulted and may be absent.
pub fn load(explicit: Option<&Path>) -> Result<AppConfig, ConfigError> {
    dotenv::dotenv().ok();

    let mut builder = Config::builder();
    match explicit {
        Some(path) => builder = builder.add_source(File::from(path).required(true)),
        None => {
            for path in default_locations() {
                builder = builder.add_source(File::from(path).required(false));
            }
        }
    }

    builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("sbadmin").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}
