//! Monte Carlo simulation settings

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

fn default_num_simulations() -> usize {
    1000
}

fn default_confidence_level() -> f64 {
    0.95
}

fn default_true() -> bool {
    true
}

fn default_income_base_volatility() -> f64 {
    0.1
}

fn default_income_minimum_factor() -> f64 {
    0.1
}

fn default_expense_base_volatility() -> f64 {
    0.05
}

fn default_expense_minimum_factor() -> f64 {
    0.5
}

/// Knobs for the stochastic replay. Fields omitted from a config file take
/// these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    #[serde(default = "default_num_simulations")]
    pub num_simulations: usize,
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    #[serde(default = "default_true")]
    pub include_black_swan_events: bool,
    /// Std-dev of the yearly income multiplier during working years.
    #[serde(default = "default_income_base_volatility")]
    pub income_base_volatility: f64,
    /// Floor applied to the income multiplier.
    #[serde(default = "default_income_minimum_factor")]
    pub income_minimum_factor: f64,
    /// Std-dev of the yearly expense multiplier, applied lifelong.
    #[serde(default = "default_expense_base_volatility")]
    pub expense_base_volatility: f64,
    /// Floor applied to the expense multiplier.
    #[serde(default = "default_expense_minimum_factor")]
    pub expense_minimum_factor: f64,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            num_simulations: default_num_simulations(),
            confidence_level: default_confidence_level(),
            include_black_swan_events: true,
            income_base_volatility: default_income_base_volatility(),
            income_minimum_factor: default_income_minimum_factor(),
            expense_base_volatility: default_expense_base_volatility(),
            expense_minimum_factor: default_expense_minimum_factor(),
        }
    }
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.num_simulations == 0 {
            return Err(ValidationError::NoSimulations);
        }
        if !(0.5..=0.99).contains(&self.confidence_level) {
            return Err(ValidationError::ConfidenceLevelOutOfRange(
                self.confidence_level,
            ));
        }
        for vol in [self.income_base_volatility, self.expense_base_volatility] {
            if !vol.is_finite() || vol < 0.0 {
                return Err(ValidationError::InvalidVolatility(vol));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_omitted_fields() {
        let settings: SimulationSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings, SimulationSettings::default());
        assert_eq!(settings.num_simulations, 1000);
        assert!(settings.include_black_swan_events);
    }

    #[test]
    fn test_confidence_level_bounds() {
        let settings = SimulationSettings {
            confidence_level: 0.3,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ValidationError::ConfidenceLevelOutOfRange(_))
        ));
    }
}
