//! Configuration loading
//!
//! Handles loading configuration from embedded defaults, files, and environment.

use super::config::AppConfig;
use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

/// Embedded default configuration (compiled into binary)
pub const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Environment variable selecting `config/{name}.toml`
pub const ENV_SELECTOR: &str = "STRATA_ENV";

/// Load configuration from files and environment
pub fn load_config() -> Result<AppConfig> {
    let environment =
        std::env::var(ENV_SELECTOR).unwrap_or_else(|_| "development".to_string());

    let config = Config::builder()
        // 1. Embedded defaults
        .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
        // 2. Optional file overrides
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{environment}")).required(false))
        .add_source(File::with_name("config/local").required(false))
        // 3. STRATA_SERVER__PORT=8080 style environment overrides.
        // prefix_separator("_") keeps a single underscore after the prefix.
        .add_source(
            Environment::with_prefix("STRATA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .set_override_option("environment", std::env::var(ENV_SELECTOR).ok())
        .context("Failed to apply environment override")?
        .build()
        .context("Failed to build configuration")?;

    config
        .try_deserialize()
        .context("Failed to deserialize configuration")
}
