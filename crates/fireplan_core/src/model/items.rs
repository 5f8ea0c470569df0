//! Income and expense stream definitions

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::model::UserProfile;

/// Time unit the per-period amount is quoted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Monthly,
    Quarterly,
    #[default]
    Annually,
}

impl TimeUnit {
    pub fn periods_per_year(self) -> f64 {
        match self {
            TimeUnit::Monthly => 12.0,
            TimeUnit::Quarterly => 4.0,
            TimeUnit::Annually => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ItemFrequency {
    #[default]
    #[serde(rename = "recurring")]
    Recurring,
    #[serde(rename = "one-time")]
    OneTime,
}

fn new_item_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn default_interval() -> u32 {
    1
}

/// A recurring or one-time cash-flow stream.
///
/// Amounts are after tax. The projection builder normalizes the per-period
/// amount to a yearly figure via [`IncomeExpenseItem::annual_amount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeExpenseItem {
    #[serde(default = "new_item_id")]
    pub id: String,
    pub name: String,
    pub after_tax_amount_per_period: f64,
    #[serde(default)]
    pub time_unit: TimeUnit,
    #[serde(default)]
    pub frequency: ItemFrequency,
    /// Interval in `time_unit` periods (e.g. 6 with a monthly unit means
    /// every six months).
    #[serde(default = "default_interval")]
    pub interval_periods: u32,
    pub start_age: i32,
    /// Last age the stream pays out; ignored for one-time items.
    #[serde(default)]
    pub end_age: Option<i32>,
    /// Annual growth rate (%), compounded from `start_age`.
    #[serde(default)]
    pub annual_growth_rate: f64,
    pub is_income: bool,
    #[serde(default)]
    pub category: Option<String>,
}

impl IncomeExpenseItem {
    pub fn recurring(
        name: impl Into<String>,
        annual_amount: f64,
        start_age: i32,
        end_age: i32,
        is_income: bool,
    ) -> Self {
        Self {
            id: new_item_id(),
            name: name.into(),
            after_tax_amount_per_period: annual_amount,
            time_unit: TimeUnit::Annually,
            frequency: ItemFrequency::Recurring,
            interval_periods: 1,
            start_age,
            end_age: Some(end_age),
            annual_growth_rate: 0.0,
            is_income,
            category: None,
        }
    }

    pub fn one_time(name: impl Into<String>, amount: f64, age: i32, is_income: bool) -> Self {
        Self {
            id: new_item_id(),
            name: name.into(),
            after_tax_amount_per_period: amount,
            time_unit: TimeUnit::Annually,
            frequency: ItemFrequency::OneTime,
            interval_periods: 1,
            start_age: age,
            end_age: None,
            annual_growth_rate: 0.0,
            is_income,
            category: None,
        }
    }

    pub fn with_growth_rate(mut self, rate: f64) -> Self {
        self.annual_growth_rate = rate;
        self
    }

    /// Per-period amount normalized to one calendar year.
    pub fn annual_amount(&self) -> f64 {
        self.after_tax_amount_per_period * self.time_unit.periods_per_year()
            / self.interval_periods as f64
    }

    /// Boundary validation against the owning profile.
    pub fn validate(&self, profile: &UserProfile, current_year: i32) -> Result<(), ValidationError> {
        if self.interval_periods == 0 {
            return Err(ValidationError::NonPositiveInterval(self.name.clone()));
        }

        let current_age = profile.current_age(current_year);
        if self.start_age < current_age {
            return Err(ValidationError::StartBeforeCurrentAge(
                self.name.clone(),
                self.start_age,
                current_age,
            ));
        }

        if self.frequency == ItemFrequency::Recurring {
            let end_age = self
                .end_age
                .ok_or_else(|| ValidationError::MissingEndAge(self.name.clone()))?;
            if end_age < self.start_age {
                return Err(ValidationError::EndBeforeStart(
                    self.name.clone(),
                    end_age,
                    self.start_age,
                ));
            }
            if end_age > profile.life_expectancy {
                return Err(ValidationError::EndPastLifeExpectancy(
                    self.name.clone(),
                    end_age,
                    profile.life_expectancy,
                ));
            }
        }
        Ok(())
    }
}

/// A user-pinned value for one `(age, item)` cell of the projection table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Override {
    pub age: i32,
    pub item_id: String,
    pub value: f64,
}
