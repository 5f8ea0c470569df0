//! Versioned plan configuration (v1.0 JSON)
//!
//! The config file is the single persisted input format: profile, items,
//! overrides, and simulation settings under a version marker. Unknown
//! top-level keys are captured in a side table and written back on export;
//! unknown nested keys may be dropped by the typed models.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValidationError};
use crate::model::{IncomeExpenseItem, Override, SimulationSettings, UserProfile};

pub const CONFIG_VERSION: &str = "1.0";

fn default_version() -> String {
    CONFIG_VERSION.to_string()
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<jiff::Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<jiff::Timestamp>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub description: String,
}

impl Default for ConfigMetadata {
    fn default() -> Self {
        Self {
            created_at: None,
            updated_at: None,
            language: default_language(),
            description: String::new(),
        }
    }
}

/// Version 1.0 of the plan configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfigV1 {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub metadata: ConfigMetadata,
    pub profile: UserProfile,
    #[serde(default)]
    pub income_items: Vec<IncomeExpenseItem>,
    #[serde(default)]
    pub expense_items: Vec<IncomeExpenseItem>,
    #[serde(default)]
    pub overrides: Vec<Override>,
    #[serde(default)]
    pub simulation_settings: SimulationSettings,
    /// Unrecognized top-level keys, preserved on round-trip.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PlannerConfigV1 {
    /// Boundary validation: version marker, profile invariants, item ranges,
    /// settings bounds.
    pub fn validate(&self, current_year: i32) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(ValidationError::UnknownConfigVersion(self.version.clone()).into());
        }
        self.profile.validate(current_year)?;
        for item in self.income_items.iter().chain(&self.expense_items) {
            item.validate(&self.profile, current_year)?;
        }
        self.simulation_settings.validate()?;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
