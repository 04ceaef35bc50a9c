//! User configuration (`config.toml`)
//!
//! Located at `$XDG_CONFIG_HOME/carteira/config.toml`, falling back to the
//! platform config directory. A missing file means defaults.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::calc::{DEFAULT_PROJECTION_MONTHS, MAX_PROJECTION_MONTHS};
use crate::portfolio::get_default_portfolio_path;

/// Environment variable overriding the portfolio file location
pub const PORTFOLIO_ENV_VAR: &str = "CARTEIRA_PORTFOLIO";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub portfolio_file: Option<PathBuf>,
    pub projection_months: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            portfolio_file: None,
            projection_months: DEFAULT_PROJECTION_MONTHS,
        }
    }
}

impl Config {
    /// Load from `path`, or from the default location when `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => get_config_path()?,
        };

        if !path.exists() {
            debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file at {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Invalid config file at {:?}", path))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.projection_months == 0 || config.projection_months > MAX_PROJECTION_MONTHS {
            return Err(anyhow!(
                "projection_months must be between 1 and {}",
                MAX_PROJECTION_MONTHS
            ));
        }
        Ok(config)
    }

    /// Resolve the portfolio file: explicit flag, then env var, then config, then default
    pub fn resolve_portfolio_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(PORTFOLIO_ENV_VAR).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.portfolio_file {
            return Ok(path.clone());
        }
        get_default_portfolio_path()
    }
}

pub fn get_config_dir() -> Result<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("carteira"))
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}
