// src/config/mod.rs
mod schema;

use std::path::{Path, PathBuf};

use config::{Config as ConfigLoader, FileFormat};
use tracing::{info, warn};

pub use schema::{Config, CredentialConfig, GlobalConfig, KindConfig, PortConfig, ServiceConfig};

use crate::error::{OsintError, OsintResult};

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

/// Centralized configuration handling
impl Config {
    /// Load configuration from built-in defaults, a config file and the environment
    pub fn load(config_path: Option<&Path>) -> OsintResult<Self> {
        info!("Loading configuration");

        let mut config_builder = ConfigLoader::builder();

        // Default configuration
        config_builder = config_builder.add_source(config::File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // User-provided configuration
        if let Some(path) = config_path {
            if path.exists() {
                config_builder = config_builder.add_source(config::File::from(path));
                info!("Loading user configuration from: {}", path.display());
            } else {
                return Err(OsintError::Configuration(format!(
                    "Configuration file not found: {}",
                    path.display()
                )));
            }
        } else {
            let default_path = Self::get_default_config_path();
            if default_path.exists() {
                config_builder = config_builder.add_source(config::File::from(default_path.as_path()));
                info!("Loading default configuration from: {}", default_path.display());
            } else {
                info!("No existing configuration found, using built-in defaults");
            }
        }

        // Environment variables, e.g. PROBEHOUND_USERNAME__CONCURRENCY=40
        config_builder = config_builder.add_source(
            config::Environment::with_prefix("PROBEHOUND")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Config = match config_builder.build() {
            Ok(c) => match c.try_deserialize() {
                Ok(config) => config,
                Err(e) => {
                    return Err(OsintError::Configuration(format!(
                        "Failed to parse configuration: {}",
                        e
                    )))
                }
            },
            Err(e) => {
                return Err(OsintError::Configuration(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the dispatcher cannot run with
    pub fn validate(&self) -> OsintResult<()> {
        for kind in crate::target::TargetKind::ALL {
            let settings = self.kind(kind);
            if settings.concurrency == 0 {
                return Err(OsintError::Configuration(format!("{}.concurrency must be at least 1", kind)));
            }
            if settings.timeout_secs == 0 {
                return Err(OsintError::Configuration(format!("{}.timeout_secs must be at least 1", kind)));
            }
        }

        if self.ports.tcp.is_empty() {
            warn!("No TCP ports configured; open_ports probe will report an empty list");
        }

        Ok(())
    }

    /// Get the default configuration path
    pub fn get_default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".probehound/config.toml")
    }

    /// Write the default configuration to the default path
    pub fn init(force: bool) -> OsintResult<PathBuf> {
        let config_path = Self::get_default_config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OsintError::Persistence {
                path: parent.to_path_buf(),
                message: format!("Failed to create directory: {}", e),
            })?;
        }

        if config_path.exists() && !force {
            return Err(OsintError::Configuration(format!(
                "Configuration already exists at {}. Use --force to overwrite.",
                config_path.display()
            )));
        }

        Config::default().save(&config_path)?;

        Ok(config_path)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> OsintResult<()> {
        let config_str = toml::to_string_pretty(self)
            .map_err(|e| OsintError::Serialization(format!("Failed to serialize configuration: {}", e)))?;

        std::fs::write(path, config_str).map_err(|e| OsintError::Persistence {
            path: path.to_path_buf(),
            message: format!("Failed to write configuration: {}", e),
        })?;

        info!("Configuration saved to {}", path.display());

        Ok(())
    }
}
