// Configuration loading and parsing (config/settings.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::pool::heuristic::ProjectionWeights;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    pub server: ServerConfig,
    pub contest: ContestConfig,
    pub projection: ProjectionWeights,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Published CSV endpoint for the projection spreadsheet.
    pub csv_url: String,
    /// Hard deadline for the remote fetch. Expiry surfaces as a data source
    /// failure, never a hung request.
    pub fetch_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContestConfig {
    pub salary_cap: u32,
    /// Inclusive bounds on distinct teams represented in a lineup.
    pub min_teams: usize,
    pub max_teams: usize,
    /// Candidates requested per lineup wanted, to absorb duplicates.
    pub candidate_multiplier: usize,
}

impl Default for ContestConfig {
    fn default() -> Self {
        ContestConfig {
            salary_cap: 50_000,
            min_teams: 4,
            max_teams: 6,
            candidate_multiplier: 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/settings.toml` relative to
/// the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization
/// automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let settings_path = base_dir.join("config").join("settings.toml");
    let text =
        std::fs::read_to_string(&settings_path).map_err(|_| ConfigError::FileNotFound {
            path: settings_path.clone(),
        })?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: settings_path,
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Ensure `config/settings.toml` exists by copying it from `defaults/`.
/// Returns the list of files that were copied.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_path = base_dir.join("defaults").join("settings.toml");
    let config_dir = base_dir.join("config");
    let target = config_dir.join("settings.toml");

    if target.exists() {
        return Ok(vec![]);
    }

    if !defaults_path.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor defaults/settings.toml found in {}; \
                 run from the project root or ensure defaults/ is present",
                target.display(),
                base_dir.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&defaults_path, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", defaults_path.display()),
    })?;

    Ok(vec![target])
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying the default settings file into place first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.source.csv_url.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "source.csv_url".into(),
            message: "must not be empty".into(),
        });
    }

    if config.source.fetch_timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "source.fetch_timeout_secs".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.contest.salary_cap == 0 {
        return Err(ConfigError::ValidationError {
            field: "contest.salary_cap".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.contest.min_teams == 0 {
        return Err(ConfigError::ValidationError {
            field: "contest.min_teams".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.contest.min_teams > config.contest.max_teams {
        return Err(ConfigError::ValidationError {
            field: "contest.max_teams".into(),
            message: format!(
                "must be >= min_teams ({}), got {}",
                config.contest.min_teams, config.contest.max_teams
            ),
        });
    }

    if config.contest.candidate_multiplier == 0 {
        return Err(ConfigError::ValidationError {
            field: "contest.candidate_multiplier".into(),
            message: "must be greater than 0".into(),
        });
    }

    if config.projection.dampening <= 0.0 {
        return Err(ConfigError::ValidationError {
            field: "projection.dampening".into(),
            message: format!("must be > 0, got {}", config.projection.dampening),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
