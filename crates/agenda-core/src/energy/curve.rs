//! Energy level types and multiplier curves.
//!
//! An energy tier scales a project's estimated hours before it is cut into
//! slots: a low-energy day plans less work per project, a high-energy day
//! plans more.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Energy level supplied with a planning request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum EnergyLevel {
    /// Low energy (e.g., end of a long day)
    Low,
    /// Medium energy (default)
    #[default]
    #[serde(alias = "med")]
    Medium,
    /// High energy
    High,
}

impl EnergyLevel {
    pub const ALL: [EnergyLevel; 3] = [EnergyLevel::Low, EnergyLevel::Medium, EnergyLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyLevel::Low => "low",
            EnergyLevel::Medium => "medium",
            EnergyLevel::High => "high",
        }
    }
}

impl fmt::Display for EnergyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnergyLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(EnergyLevel::Low),
            "med" | "medium" => Ok(EnergyLevel::Medium),
            "high" => Ok(EnergyLevel::High),
            other => Err(ValidationError::UnknownEnergy(other.to_string())),
        }
    }
}

/// Maps an energy tier to the factor applied to estimated hours.
pub trait EnergyCurve: Send + Sync {
    fn multiplier(&self, level: EnergyLevel) -> f64;
}

/// Fixed multiplier per tier. No interpolation between tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TieredEnergyCurve {
    #[serde(default = "default_low")]
    pub low: f64,
    #[serde(default = "default_medium")]
    pub medium: f64,
    #[serde(default = "default_high")]
    pub high: f64,
}

fn default_low() -> f64 {
    0.7
}
fn default_medium() -> f64 {
    1.0
}
fn default_high() -> f64 {
    1.3
}

impl Default for TieredEnergyCurve {
    fn default() -> Self {
        Self {
            low: default_low(),
            medium: default_medium(),
            high: default_high(),
        }
    }
}

impl TieredEnergyCurve {
    /// Check that every multiplier is a positive, finite number.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for level in EnergyLevel::ALL {
            let m = self.multiplier(level);
            if !m.is_finite() || m <= 0.0 {
                return Err(ValidationError::InvalidValue {
                    field: format!("planner.energy.{level}"),
                    message: format!("multiplier must be positive, got {m}"),
                });
            }
        }
        Ok(())
    }
}

impl EnergyCurve for TieredEnergyCurve {
    fn multiplier(&self, level: EnergyLevel) -> f64 {
        match level {
            EnergyLevel::Low => self.low,
            EnergyLevel::Medium => self.medium,
            EnergyLevel::High => self.high,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_multipliers() {
        let curve = TieredEnergyCurve::default();
        assert_eq!(curve.multiplier(EnergyLevel::Low), 0.7);
        assert_eq!(curve.multiplier(EnergyLevel::Medium), 1.0);
        assert_eq!(curve.multiplier(EnergyLevel::High), 1.3);
    }

    #[test]
    fn parse_accepts_med_alias() {
        assert_eq!("med".parse::<EnergyLevel>().unwrap(), EnergyLevel::Medium);
        assert_eq!("HIGH".parse::<EnergyLevel>().unwrap(), EnergyLevel::High);
        assert!("turbo".parse::<EnergyLevel>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_and_alias() {
        assert_eq!(serde_json::to_string(&EnergyLevel::Low).unwrap(), "\"low\"");
        let level: EnergyLevel = serde_json::from_str("\"med\"").unwrap();
        assert_eq!(level, EnergyLevel::Medium);
    }

    #[test]
    fn validate_rejects_zero_multiplier() {
        let curve = TieredEnergyCurve {
            low: 0.0,
            ..TieredEnergyCurve::default()
        };
        assert!(curve.validate().is_err());
        assert!(TieredEnergyCurve::default().validate().is_ok());
    }
}
