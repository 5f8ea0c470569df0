//! Household profile and portfolio configuration
//!
//! All invariants are checked by `validate` methods called at the mutation
//! and import boundaries, never mid-simulation. Profiles are immutable
//! during a calculation run; the advisor works on copies.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Earliest birth year accepted by profile validation.
pub const MIN_BIRTH_YEAR: i32 = 1950;

/// How quickly an asset can be turned into spendable cash.
///
/// Controls the order of withdrawals in the cash-flow strategy: HIGH is
/// drained first, LOW last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityLevel {
    High,
    Medium,
    Low,
}

/// A single asset class in the portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetClass {
    /// Display name as entered by the user (e.g. "Stocks").
    pub name: String,
    /// Share of the portfolio, 0..=100.
    pub allocation_percentage: f64,
    /// Expected annual return (%), after tax.
    pub expected_return: f64,
    /// Annual volatility (%); consumed only by the Monte Carlo engine.
    #[serde(default)]
    pub volatility: f64,
    /// Declared liquidity tier; name heuristics apply when absent.
    #[serde(default)]
    pub liquidity_level: Option<LiquidityLevel>,
}

impl AssetClass {
    pub fn new(name: impl Into<String>, allocation_percentage: f64, expected_return: f64) -> Self {
        Self {
            name: name.into(),
            allocation_percentage,
            expected_return,
            volatility: 0.0,
            liquidity_level: None,
        }
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn with_liquidity(mut self, level: LiquidityLevel) -> Self {
        self.liquidity_level = Some(level);
        self
    }

    /// Canonical lookup key: lowercase with runs of whitespace collapsed.
    pub fn normalized_name(&self) -> String {
        self.name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    /// Effective liquidity tier: the declared level, or a guess from the
    /// normalized name (cash -> HIGH, stocks -> MEDIUM, bonds/savings -> LOW).
    pub fn liquidity(&self) -> LiquidityLevel {
        if let Some(level) = self.liquidity_level {
            return level;
        }
        match self.normalized_name().as_str() {
            "cash" => LiquidityLevel::High,
            "stocks" => LiquidityLevel::Medium,
            "bonds" | "savings" => LiquidityLevel::Low,
            _ => LiquidityLevel::Medium,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Ordered set of asset classes plus the rebalancing switch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioConfiguration {
    pub asset_classes: Vec<AssetClass>,
    #[serde(default = "default_true")]
    pub enable_rebalancing: bool,
}

impl Default for PortfolioConfiguration {
    fn default() -> Self {
        Self {
            asset_classes: vec![
                AssetClass::new("Stocks", 30.0, 5.0).with_volatility(15.0),
                AssetClass::new("Bonds", 0.0, 3.0).with_volatility(5.0),
                AssetClass::new("Savings", 60.0, 1.0).with_volatility(5.0),
                AssetClass::new("Cash", 10.0, 0.0).with_volatility(1.0),
            ],
            enable_rebalancing: true,
        }
    }
}

impl PortfolioConfiguration {
    /// Check allocation bounds, the 100% sum invariant, and name uniqueness.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.asset_classes.is_empty() {
            return Err(ValidationError::EmptyPortfolio);
        }

        let mut seen = Vec::with_capacity(self.asset_classes.len());
        let mut sum = 0.0;
        for asset in &self.asset_classes {
            if !(0.0..=100.0).contains(&asset.allocation_percentage) {
                return Err(ValidationError::AllocationOutOfRange(
                    asset.allocation_percentage,
                    asset.name.clone(),
                ));
            }
            if !asset.volatility.is_finite() || asset.volatility < 0.0 {
                return Err(ValidationError::InvalidVolatility(asset.volatility));
            }
            let key = asset.normalized_name();
            if seen.contains(&key) {
                return Err(ValidationError::DuplicateAssetName(asset.name.clone()));
            }
            seen.push(key);
            sum += asset.allocation_percentage;
        }

        if (sum - 100.0).abs() > 100.0 * f64::EPSILON {
            return Err(ValidationError::AllocationSum(sum));
        }
        Ok(())
    }

    /// Target allocation as fractions, in configuration order.
    pub fn target_allocation(&self) -> Vec<f64> {
        self.asset_classes
            .iter()
            .map(|a| a.allocation_percentage / 100.0)
            .collect()
    }
}

fn default_inflation_rate() -> f64 {
    3.0
}

fn default_safety_buffer_months() -> f64 {
    12.0
}

/// Scalar household parameters.
///
/// The current age is always derived from `birth_year` and the calendar
/// year; it is never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub birth_year: i32,
    pub expected_fire_age: i32,
    pub legal_retirement_age: i32,
    pub life_expectancy: i32,
    #[serde(default)]
    pub current_net_worth: f64,
    /// Expected annual inflation rate (%), applied to expense items only.
    #[serde(default = "default_inflation_rate")]
    pub inflation_rate: f64,
    /// Cash reserve required for sustainability, in months of that year's
    /// expenses.
    #[serde(default = "default_safety_buffer_months")]
    pub safety_buffer_months: f64,
    /// Reserved bridging adjustment; 0.0 means none is applied.
    #[serde(default)]
    pub bridge_discount_rate: f64,
    #[serde(default)]
    pub portfolio: PortfolioConfiguration,
}

impl UserProfile {
    pub fn current_age(&self, current_year: i32) -> i32 {
        current_year - self.birth_year
    }

    /// Validate the birth-year range, the age progression, and the embedded
    /// portfolio configuration.
    pub fn validate(&self, current_year: i32) -> Result<(), ValidationError> {
        if self.birth_year < MIN_BIRTH_YEAR || self.birth_year > current_year {
            return Err(ValidationError::BirthYearOutOfRange(
                self.birth_year,
                current_year,
            ));
        }

        let current = self.current_age(current_year);
        if !(current <= self.expected_fire_age
            && self.expected_fire_age <= self.legal_retirement_age
            && self.legal_retirement_age <= self.life_expectancy)
        {
            return Err(ValidationError::AgeProgression {
                current,
                fire: self.expected_fire_age,
                retirement: self.legal_retirement_age,
                life: self.life_expectancy,
            });
        }

        self.portfolio.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(birth_year: i32) -> UserProfile {
        UserProfile {
            birth_year,
            expected_fire_age: 50,
            legal_retirement_age: 65,
            life_expectancy: 85,
            current_net_worth: 100_000.0,
            inflation_rate: 3.0,
            safety_buffer_months: 12.0,
            bridge_discount_rate: 0.0,
            portfolio: PortfolioConfiguration::default(),
        }
    }

    #[test]
    fn test_age_progression_enforced() {
        let mut p = profile(1992);
        assert!(p.validate(2026).is_ok());

        p.expected_fire_age = 90;
        assert!(matches!(
            p.validate(2026),
            Err(ValidationError::AgeProgression { .. })
        ));
    }

    #[test]
    fn test_birth_year_bounds() {
        assert!(matches!(
            profile(1949).validate(2026),
            Err(ValidationError::BirthYearOutOfRange(1949, 2026))
        ));
        assert!(matches!(
            profile(2030).validate(2026),
            Err(ValidationError::BirthYearOutOfRange(2030, 2026))
        ));
    }

    #[test]
    fn test_allocation_sum_is_strict() {
        let mut p = profile(1992);
        p.portfolio.asset_classes = vec![
            AssetClass::new("Stocks", 33.33, 7.0),
            AssetClass::new("Bonds", 33.33, 3.0),
            AssetClass::new("Cash", 33.33, 1.0),
        ];
        assert!(matches!(
            p.validate(2026),
            Err(ValidationError::AllocationSum(_))
        ));
    }

    #[test]
    fn test_duplicate_names_detected_case_insensitively() {
        let mut p = profile(1992);
        p.portfolio.asset_classes = vec![
            AssetClass::new("Stocks", 50.0, 7.0),
            AssetClass::new("  STOCKS ", 50.0, 3.0),
        ];
        assert!(matches!(
            p.validate(2026),
            Err(ValidationError::DuplicateAssetName(_))
        ));
    }

    #[test]
    fn test_liquidity_name_heuristics() {
        assert_eq!(
            AssetClass::new("Cash", 10.0, 0.0).liquidity(),
            LiquidityLevel::High
        );
        assert_eq!(
            AssetClass::new("Stocks", 70.0, 7.0).liquidity(),
            LiquidityLevel::Medium
        );
        assert_eq!(
            AssetClass::new("Savings", 20.0, 1.0).liquidity(),
            LiquidityLevel::Low
        );
        // Declared level wins over the heuristic
        assert_eq!(
            AssetClass::new("Cash", 10.0, 0.0)
                .with_liquidity(LiquidityLevel::Low)
                .liquidity(),
            LiquidityLevel::Low
        );
    }
}
