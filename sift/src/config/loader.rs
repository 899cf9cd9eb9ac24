//! Configuration loader.
//!
//! Layers, lowest priority first: built-in defaults, the first configuration
//! file found, then `SIFT_` environment variables.

use super::{ConfigError, DEFAULT_CONFIG_FILES, ENV_PREFIX, Result, models::*, validation};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use std::path::{Path, PathBuf};

/// Configuration loader that handles loading from multiple sources.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    figment: Figment,
}

impl ConfigLoader {
    /// Create a new configuration loader with default values.
    pub fn new() -> Self {
        let figment = Figment::new().merge(Serialized::defaults(SiftConfig::default()));
        Self { figment }
    }

    /// Load configuration from a file.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileLoadError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        let figment = std::mem::take(&mut self.figment);
        let merged = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => figment.merge(Toml::file(path)),
            Some("yaml") | Some("yml") => figment.merge(Yaml::file(path)),
            Some("json") => figment.merge(Json::file(path)),
            _ => {
                self.figment = figment;
                return Err(ConfigError::FileLoadError(format!(
                    "Unsupported file format: {}",
                    path.display()
                )));
            }
        };
        self.figment = merged;

        Ok(self)
    }

    /// Attempt to load from default configuration file locations.
    ///
    /// The working directory is searched first, then the user configuration
    /// directory. Only the first file found is merged.
    pub fn load_default_files(&mut self) -> &mut Self {
        let mut candidates: Vec<PathBuf> =
            DEFAULT_CONFIG_FILES.iter().map(PathBuf::from).collect();

        if let Some(proj_dirs) = directories::ProjectDirs::from("org", "sift", "sift") {
            let config_dir = proj_dirs.config_dir();
            for ext in ["toml", "yaml", "yml", "json"] {
                candidates.push(config_dir.join(format!("config.{}", ext)));
            }
        }

        for path in candidates {
            if path.exists() && self.load_file(&path).is_ok() {
                tracing::debug!(path = %path.display(), "Loaded configuration file");
                break;
            }
        }

        self
    }

    /// Load configuration from `SIFT_` environment variables.
    pub fn load_env(&mut self) -> &mut Self {
        let figment =
            std::mem::take(&mut self.figment).merge(Env::prefixed(ENV_PREFIX).split("__"));
        self.figment = figment;
        self
    }

    /// Load configuration from a custom source.
    pub fn merge<T: figment::Provider>(&mut self, provider: T) -> &mut Self {
        let figment = std::mem::take(&mut self.figment).merge(provider);
        self.figment = figment;
        self
    }

    /// Extract and validate the configuration.
    pub fn extract(&self) -> Result<SiftConfig> {
        let config: SiftConfig = self
            .figment
            .extract()
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        validation::validate_config(&config)?;

        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
