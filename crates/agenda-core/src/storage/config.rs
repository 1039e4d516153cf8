//! TOML-based application configuration.
//!
//! Stores:
//! - The default owner id used by the CLI
//! - Planner policy (slot length, horizon cap, energy multipliers)
//! - Which planning strategy to use, and where the external one lives
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::agenda::DEFAULT_MAX_HORIZON_HOURS;
use crate::energy::{EnergyLevel, TieredEnergyCurve};
use crate::error::{ConfigError, CoreError};
use crate::scheduler::SchedulerConfig;

/// Which planner produces agendas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlannerStrategy {
    #[default]
    Deterministic,
    External,
}

/// External planner settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalPlannerConfig {
    /// URL the planning request is POSTed to.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Planner configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub strategy: PlannerStrategy,
    #[serde(default = "default_slot_minutes")]
    pub slot_minutes: u32,
    #[serde(default = "default_max_horizon_hours")]
    pub max_horizon_hours: f64,
    #[serde(default)]
    pub default_energy: EnergyLevel,
    #[serde(default)]
    pub energy: TieredEnergyCurve,
    #[serde(default)]
    pub external: ExternalPlannerConfig,
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Owner id used when none is given on the command line.
    #[serde(default = "default_user_id")]
    pub user_id: String,
    #[serde(default)]
    pub planner: PlannerConfig,
}

fn default_user_id() -> String {
    "local".into()
}
fn default_slot_minutes() -> u32 {
    30
}
fn default_max_horizon_hours() -> f64 {
    DEFAULT_MAX_HORIZON_HOURS
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for ExternalPlannerConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            strategy: PlannerStrategy::default(),
            slot_minutes: default_slot_minutes(),
            max_horizon_hours: default_max_horizon_hours(),
            default_energy: EnergyLevel::default(),
            energy: TieredEnergyCurve::default(),
            external: ExternalPlannerConfig::default(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: default_user_id(),
            planner: PlannerConfig::default(),
        }
    }
}

impl PlannerConfig {
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            slot_minutes: self.slot_minutes,
            max_horizon_hours: self.max_horizon_hours,
        }
    }

    /// Check policy values.
    ///
    /// # Errors
    /// Returns an error naming the first invalid key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.slot_minutes == 0 || self.slot_minutes > 24 * 60 {
            return Err(ConfigError::InvalidValue {
                key: "planner.slot_minutes".into(),
                message: format!("must be between 1 and 1440, got {}", self.slot_minutes),
            });
        }
        if !self.max_horizon_hours.is_finite() || self.max_horizon_hours <= 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "planner.max_horizon_hours".into(),
                message: format!("must be positive, got {}", self.max_horizon_hours),
            });
        }
        if self.external.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "planner.external.timeout_secs".into(),
                message: "must be at least 1".into(),
            });
        }
        self.energy.validate().map_err(|e| ConfigError::InvalidValue {
            key: "planner.energy".into(),
            message: e.to_string(),
        })
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::MissingKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return (and write) the default.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing the default if it is missing.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed or the default cannot
    /// be written.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), CoreError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the result fails validation.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.planner.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    /// Returns an error if the key is unknown, the value is invalid, or the
    /// config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.set_value(key, value)?;
        self.save()
    }
}
