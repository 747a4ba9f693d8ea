//! Analytics configuration
//!
//! Holds the categorizer keyword table and the tunable constants of the
//! forecaster, outlier detector and advisor. The value is loaded once at
//! startup and handed to the pipeline by reference; nothing mutates it
//! afterwards.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for an override (~/.local/share/spendlens/config/analytics.toml,
//!    or an explicit path)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their embedded values.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::forecast::ForecastSettings;
use crate::outliers::OutlierSettings;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/analytics.toml");

/// Seconds an advice backend gets before the rule-based fallback is used
pub const DEFAULT_ADVICE_TIMEOUT_SECS: u64 = 20;

/// Keywords that map a description to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryKeywords {
    pub name: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdviceSettings {
    pub timeout_secs: u64,
}

impl AdviceSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for AdviceSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_ADVICE_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsConfig {
    pub forecast: ForecastSettings,
    pub outliers: OutlierSettings,
    pub advice: AdviceSettings,
    /// Categorizer table in priority order
    pub categories: Vec<CategoryKeywords>,
    /// Override file this config was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl AnalyticsConfig {
    /// Embedded defaults only
    pub fn embedded() -> Result<Self> {
        parse_config(DEFAULT_CONFIG, Self::builtin())
    }

    /// Load from the default override location, or the embedded defaults
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::embedded(),
        }
    }

    /// Load an explicit override file layered over the embedded defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        debug!(path = %path.display(), "Loading analytics config override");

        let mut config = Self::from_toml(&content)?;
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    /// Parse override TOML layered over the embedded defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content, Self::embedded()?)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to render config: {}", e)))
    }

    /// Hard-coded values with an empty keyword table
    fn builtin() -> Self {
        Self {
            forecast: ForecastSettings::default(),
            outliers: OutlierSettings::default(),
            advice: AdviceSettings::default(),
            categories: Vec::new(),
            source: None,
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self::embedded().unwrap_or_else(|_| Self::builtin())
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("spendlens").join("config").join("analytics.toml"))
}

/// Raw config structure for TOML parsing
///
/// Settings sections stay untyped so they can be layered key by key.
#[derive(Debug, Deserialize)]
struct RawConfig {
    forecast: Option<toml::Table>,
    outliers: Option<toml::Table>,
    advice: Option<toml::Table>,
    categories: Option<Vec<CategoryKeywords>>,
}

/// Parse config from TOML content over `base`: keys present in a section
/// replace the base value, absent keys and sections keep it. The category
/// table is replaced as a whole.
fn parse_config(content: &str, base: AnalyticsConfig) -> Result<AnalyticsConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = base;

    if let Some(forecast) = raw.forecast {
        config.forecast = merge_section("forecast", &config.forecast, forecast)?;
    }
    if let Some(outliers) = raw.outliers {
        config.outliers = merge_section("outliers", &config.outliers, outliers)?;
    }
    if let Some(advice) = raw.advice {
        config.advice = merge_section("advice", &config.advice, advice)?;
    }
    if let Some(categories) = raw.categories {
        config.categories = categories;
    }

    validate(&config)?;
    Ok(config)
}

fn merge_section<T>(name: &str, base: &T, overrides: toml::Table) -> Result<T>
where
    T: Serialize + DeserializeOwned,
{
    let mut merged = match toml::Value::try_from(base) {
        Ok(toml::Value::Table(table)) => table,
        Ok(_) => toml::Table::new(),
        Err(e) => return Err(Error::Config(format!("Failed to render [{}]: {}", name, e))),
    };
    for (key, value) in overrides {
        merged.insert(key, value);
    }

    toml::Value::Table(merged)
        .try_into()
        .map_err(|e| Error::Config(format!("Invalid [{}] section: {}", name, e)))
}

fn validate(config: &AnalyticsConfig) -> Result<()> {
    for category in &config.categories {
        if category.name.trim().is_empty() {
            return Err(Error::Config("Category name cannot be empty".to_string()));
        }
        if category.keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(Error::Config(format!(
                "Category '{}' has an empty keyword",
                category.name
            )));
        }
    }

    if config.forecast.month_step_days <= 0 {
        return Err(Error::Config(
            "forecast.month_step_days must be positive".to_string(),
        ));
    }
    if config.forecast.max_horizon == 0 {
        return Err(Error::Config(
            "forecast.max_horizon must be at least 1".to_string(),
        ));
    }
    if config.forecast.default_horizon > config.forecast.max_horizon {
        return Err(Error::Config(format!(
            "forecast.default_horizon ({}) exceeds forecast.max_horizon ({})",
            config.forecast.default_horizon, config.forecast.max_horizon
        )));
    }
    if config.forecast.confidence_z < 0.0 || config.outliers.sigma < 0.0 {
        return Err(Error::Config(
            "confidence_z and sigma cannot be negative".to_string(),
        ));
    }

    Ok(())
}
