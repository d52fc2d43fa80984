//! Filter and settings loading

use crate::schema::{FilterDefinition, Settings};
use crate::validation::FilterValidator;
use ratingscope_common::{is_safe_name, LogFormat, RatingsError, Result as RatingsResult};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming the settings file.
pub const CONFIG_ENV_VAR: &str = "RATINGSCOPE_CONFIG";

/// Settings files looked up in the working directory, in order.
pub const DEFAULT_CONFIG_FILES: [&str; 3] =
    ["ratingscope.yaml", "ratingscope.yml", "ratingscope.toml"];

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading a configuration file
    #[error("Failed to read {}: {source}", .path.display())]
    IoError {
        /// File that could not be read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("Failed to parse YAML settings: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML settings: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Settings file with an extension other than yaml, yml or toml
    #[error("Unsupported settings format for {}, expected .yaml, .yml or .toml", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Configuration validation error
    #[error("Settings validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Variable name
        var: String,
        /// Underlying parse error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for RatingsError {
    fn from(err: ConfigError) -> Self {
        Self::config_with_source(err.to_string(), err)
    }
}

/// Loads named filter definitions from a directory of JSON files.
#[derive(Debug, Clone)]
pub struct FilterLoader {
    dir: PathBuf,
}

impl FilterLoader {
    /// Creates a loader over `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory the filters are read from.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Names of the filters in the directory, sorted.
    pub fn available(&self) -> RatingsResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir).map_err(|e| {
            RatingsError::config_with_source(
                format!("cannot read filters directory {}", self.dir.display()),
                e,
            )
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if is_safe_name(stem) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Loads and validates the filter called `name`.
    pub fn load(&self, name: &str) -> RatingsResult<FilterDefinition> {
        if !is_safe_name(name) {
            return Err(RatingsError::config(format!(
                "invalid filter name '{name}': use letters, digits, '-' and '_' only"
            )));
        }

        let path = self.dir.join(format!("{name}.json"));
        if !path.is_file() {
            let available = self.available().unwrap_or_default();
            let listing = if available.is_empty() {
                "none".to_string()
            } else {
                available.join(", ")
            };
            return Err(RatingsError::config(format!(
                "filter '{name}' not found in {}; available filters: {listing}",
                self.dir.display()
            )));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            RatingsError::config_with_source(format!("cannot read {}", path.display()), e)
        })?;
        let mut filter: FilterDefinition = serde_json::from_str(&content).map_err(|e| {
            RatingsError::config_with_source(format!("malformed filter {}", path.display()), e)
        })?;
        filter.name = name.to_string();

        FilterValidator::validate(&filter)?;
        debug!(filter = name, title = %filter.title, bracketed = filter.is_bracketed(), "Loaded filter");
        Ok(filter)
    }
}

/// Settings loader with environment variable overrides
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Settings, ConfigError> {
        let mut settings = Self::parse_file(path.as_ref())?;
        Self::apply_env_overrides(&mut settings)?;
        settings.validate_all()?;
        Ok(settings)
    }

    /// Parses a settings file, picking the format by extension
    pub fn parse_file(path: &Path) -> Result<Settings, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&content)?),
            Some("toml") => Ok(toml::from_str(&content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Load settings from `explicit`, else `RATINGSCOPE_CONFIG`, else the
    /// first default settings file in the working directory, else defaults.
    pub fn load(explicit: Option<&Path>) -> RatingsResult<Settings> {
        let path = explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(CONFIG_ENV_VAR).map(PathBuf::from))
            .or_else(|| Self::discover_in(Path::new(".")));

        let settings = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading settings");
                Self::load_config(&path)?
            }
            None => {
                debug!("No settings file found, using defaults");
                let mut settings = Settings::default();
                Self::apply_env_overrides(&mut settings)?;
                settings.validate_all().map_err(ConfigError::ValidationError)?;
                settings
            }
        };

        Ok(settings)
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> RatingsResult<Settings> {
        Ok(Self::load_config(path)?)
    }

    /// First default settings file present in `dir`.
    pub fn discover_in(dir: &Path) -> Option<PathBuf> {
        DEFAULT_CONFIG_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), ConfigError> {
        Self::apply_overrides(settings, |var| env::var(var).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to
    /// its value.
    pub fn apply_overrides<F>(settings: &mut Settings, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("RATINGSCOPE_DATA_FILE") {
            settings.data_file = PathBuf::from(path);
        }

        if let Some(path) = lookup("RATINGSCOPE_OUTPUT_DIR") {
            settings.output_dir = PathBuf::from(path);
        }

        if let Some(path) = lookup("RATINGSCOPE_FILTERS_DIR") {
            settings.filters_dir = PathBuf::from(path);
        }

        if let Some(path) = lookup("RATINGSCOPE_DASHBOARD_PAGE") {
            settings.dashboard_page = PathBuf::from(path);
        }

        if let Some(level) = lookup("RATINGSCOPE_LOG_LEVEL") {
            settings.logging.level = level;
        }

        if let Some(raw) = lookup("RATINGSCOPE_LOG_FORMAT") {
            settings.logging.format =
                serde_json::from_value::<LogFormat>(serde_json::Value::String(raw)).map_err(
                    |e| ConfigError::EnvParseError {
                        var: "RATINGSCOPE_LOG_FORMAT".to_string(),
                        source: Box::new(e),
                    },
                )?;
        }

        if let Some(height) = lookup("RATINGSCOPE_CHART_HEIGHT") {
            settings.chart.height =
                Some(height.parse().map_err(|e| ConfigError::EnvParseError {
                    var: "RATINGSCOPE_CHART_HEIGHT".to_string(),
                    source: Box::new(e),
                })?);
        }

        Ok(())
    }
}
