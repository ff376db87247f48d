//! Configuration loading for GradePal.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Project config (`.gradepal/config.toml` in the working directory or an ancestor)
//! 3. User config (`~/.gradepal/config.toml`)
//! 4. Defaults (lowest priority)
//!
//! All configuration is optional. The system runs with sensible defaults
//! when no config exists.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{GradepalError, Result};

/// Storage key the course collection is persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "gradepal-courses";

/// Default chat-completions endpoint for predictions.
pub const DEFAULT_PREDICTION_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Default model for predictions.
pub const DEFAULT_PREDICTION_MODEL: &str = "gpt-4o-mini";

/// Default name of the env var holding the prediction API key.
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Minimum valid prediction timeout in seconds.
pub const MIN_TIMEOUT_SECONDS: u64 = 1;

/// Main configuration struct for GradePal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Durable storage configuration.
    pub storage: StorageConfig,
    /// Prediction service configuration.
    pub prediction: PredictionConfig,
}

/// Durable storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for data files. Defaults to `<gradepal_home>/data`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    /// Key the course collection is stored under.
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}

impl StorageConfig {
    /// Check if a storage key is usable as a file name.
    pub fn is_valid_key(value: &str) -> bool {
        !value.is_empty()
            && !value.starts_with('.')
            && value
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    }

    /// Resolve the data directory, falling back to `<gradepal_home>/data`.
    pub fn resolve_data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(data_dir)
    }
}

/// Prediction service configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PredictionConfig {
    /// OpenAI-compatible chat-completions URL.
    pub endpoint: String,
    /// Model name sent with each request.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PREDICTION_ENDPOINT.to_string(),
            model: DEFAULT_PREDICTION_MODEL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_seconds: 60,
        }
    }
}

impl PredictionConfig {
    /// Check if a timeout value is valid (must be >= 1).
    pub fn is_valid_timeout(value: u64) -> bool {
        value >= MIN_TIMEOUT_SECONDS
    }

    /// Read the API key from the configured environment variable.
    ///
    /// Empty values count as unset.
    pub fn api_key(&self) -> Option<String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

impl Config {
    /// Load configuration with full precedence chain.
    pub fn load() -> Self {
        match env::current_dir() {
            Ok(cwd) => Self::load_from_cwd(&cwd),
            Err(_) => {
                let mut config = Config::default();
                if let Some(user_config) = Self::load_user_config() {
                    config = config.merge(user_config);
                }
                config.apply_env_overrides();
                config
            }
        }
    }

    /// Load configuration with a specific working directory.
    pub fn load_from_cwd(cwd: &Path) -> Self {
        let mut config = Config::default();

        if let Some(user_config) = Self::load_user_config() {
            config = config.merge(user_config);
        }

        if let Some(project_config) = Self::load_project_config(cwd) {
            config = config.merge(project_config);
        }

        config.apply_env_overrides();

        config
    }

    /// Load user config from `~/.gradepal/config.toml`.
    fn load_user_config() -> Option<Config> {
        let home = gradepal_home()?;
        Self::load_optional(&home.join("config.toml"))
    }

    /// Load project config from the nearest `.gradepal/config.toml`.
    fn load_project_config(cwd: &Path) -> Option<Config> {
        let dir = find_project_dir(cwd)?;
        Self::load_optional(&dir.join("config.toml"))
    }

    /// Load a config file that may not exist.
    ///
    /// A missing file is silent; an unreadable or invalid one is logged.
    fn load_optional(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        match Self::load_from_file(path) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring config file");
                None
            }
        }
    }

    /// Load config from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let content = fs::read_to_string(path).map_err(|e| GradepalError::storage(path, e))?;
        toml::from_str(&content).map_err(|e| GradepalError::config(e.to_string()))
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        // GRADEPAL_DATA_DIR
        if let Ok(val) = env::var("GRADEPAL_DATA_DIR") {
            if val.is_empty() {
                eprintln!("Warning: GRADEPAL_DATA_DIR is empty. Ignoring.");
            } else {
                self.storage.data_dir = Some(PathBuf::from(val));
            }
        }

        // GRADEPAL_STORAGE_KEY
        if let Ok(val) = env::var("GRADEPAL_STORAGE_KEY") {
            if StorageConfig::is_valid_key(&val) {
                self.storage.key = val;
            } else {
                eprintln!(
                    "Warning: Invalid GRADEPAL_STORAGE_KEY value '{}'. \
                    Use letters, digits, '-', '_' or '.'. Using '{}'.",
                    val, self.storage.key
                );
            }
        }

        // GRADEPAL_PREDICTION_ENDPOINT
        if let Ok(val) = env::var("GRADEPAL_PREDICTION_ENDPOINT") {
            if val.starts_with("http://") || val.starts_with("https://") {
                self.prediction.endpoint = val;
            } else {
                eprintln!(
                    "Warning: Invalid GRADEPAL_PREDICTION_ENDPOINT value '{}'. \
                    Expected an http(s) URL. Using '{}'.",
                    val, self.prediction.endpoint
                );
            }
        }

        // GRADEPAL_PREDICTION_MODEL
        if let Ok(val) = env::var("GRADEPAL_PREDICTION_MODEL") {
            if !val.trim().is_empty() {
                self.prediction.model = val;
            }
        }

        // GRADEPAL_PREDICTION_TIMEOUT
        if let Ok(val) = env::var("GRADEPAL_PREDICTION_TIMEOUT") {
            match val.parse::<u64>() {
                Ok(n) if PredictionConfig::is_valid_timeout(n) => {
                    self.prediction.timeout_seconds = n
                }
                _ => eprintln!(
                    "Warning: Invalid GRADEPAL_PREDICTION_TIMEOUT value '{}'. \
                    Expected a positive integer. Using '{}'.",
                    val, self.prediction.timeout_seconds
                ),
            }
        }
    }

    /// Merge another config into this one.
    ///
    /// Field by field: every non-default value in `other` wins. A layer
    /// cannot reset a value back to its default.
    fn merge(mut self, other: Config) -> Self {
        let default_storage = StorageConfig::default();
        if other.storage.data_dir.is_some() {
            self.storage.data_dir = other.storage.data_dir;
        }
        if other.storage.key != default_storage.key {
            self.storage.key = other.storage.key;
        }

        let default_prediction = PredictionConfig::default();
        if other.prediction.endpoint != default_prediction.endpoint {
            self.prediction.endpoint = other.prediction.endpoint;
        }
        if other.prediction.model != default_prediction.model {
            self.prediction.model = other.prediction.model;
        }
        if other.prediction.api_key_env != default_prediction.api_key_env {
            self.prediction.api_key_env = other.prediction.api_key_env;
        }
        if other.prediction.timeout_seconds != default_prediction.timeout_seconds {
            self.prediction.timeout_seconds = other.prediction.timeout_seconds;
        }

        self
    }
}

/// Get the GradePal home directory.
///
/// Uses `$GRADEPAL_HOME` if set and non-empty, otherwise `~/.gradepal`.
pub fn gradepal_home() -> Option<PathBuf> {
    if let Ok(home) = env::var("GRADEPAL_HOME") {
        if home.is_empty() {
            tracing::warn!("GRADEPAL_HOME is empty, using default");
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return Some(path);
            }
            if let Ok(canonical) = path.canonicalize() {
                return Some(canonical);
            }
            tracing::warn!("GRADEPAL_HOME is relative and doesn't exist, using as-is");
            return Some(path);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return Some(home.join(".gradepal"));
    }

    let fallback_path = fallback_gradepal_home();
    tracing::warn!(
        "HOME not set, using fallback location: {}",
        fallback_path.display()
    );
    Some(fallback_path)
}

/// Get fallback home path when HOME is unavailable.
#[cfg(unix)]
fn fallback_gradepal_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/gradepal-{}", uid))
}

/// Get fallback home path when HOME is unavailable.
#[cfg(not(unix))]
fn fallback_gradepal_home() -> PathBuf {
    std::env::temp_dir().join("gradepal")
}

/// Get the default data directory.
///
/// Returns `<gradepal_home>/data/`.
pub fn data_dir() -> Option<PathBuf> {
    gradepal_home().map(|h| h.join("data"))
}

/// Get the crash log path.
///
/// Returns `<gradepal_home>/crash.log`.
pub fn crash_log_path() -> Option<PathBuf> {
    gradepal_home().map(|h| h.join("crash.log"))
}

/// Find the nearest `.gradepal/` directory at or above `cwd`.
pub fn find_project_dir(cwd: &Path) -> Option<PathBuf> {
    cwd.ancestors()
        .map(|ancestor| ancestor.join(".gradepal"))
        .find(|candidate| candidate.is_dir())
}
