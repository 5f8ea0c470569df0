//! Calculation output types
//!
//! `YearlyState` rows are the per-year log of the deterministic engine;
//! `FireCalculationResult` is its top-line aggregate. `PlannerResults`
//! bundles the engine result with the optional Monte Carlo success rate and
//! the advisor's typed recommendations.

use serde::{Deserialize, Serialize};

/// Per-year output of the FIRE engine.
///
/// `net_worth` equals the portfolio value while the portfolio is funded and
/// goes negative once depletion turns yearly shortfalls into accumulated
/// debt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyState {
    pub age: i32,
    pub year: i32,
    pub total_income: f64,
    pub total_expense: f64,
    pub net_cash_flow: f64,
    pub portfolio_value: f64,
    pub investment_return: f64,
    pub net_worth: f64,
    pub is_sustainable: bool,
    /// 25x that year's expenses; reference only, not the verdict.
    pub fire_number: f64,
    pub fire_progress: f64,
}

/// Top-line result of a deterministic calculation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireCalculationResult {
    pub is_fire_achievable: bool,
    pub fire_net_worth: f64,
    pub min_net_worth_after_fire: f64,
    pub final_net_worth: f64,
    pub safety_buffer_months: f64,
    pub min_safety_buffer_ratio: f64,
    pub yearly_results: Vec<YearlyState>,
    pub traditional_fire_number: f64,
    pub traditional_fire_achieved: bool,
    /// Populated by the Monte Carlo layer, absent on the pure engine result.
    pub fire_success_probability: Option<f64>,
    pub total_years_simulated: usize,
    pub retirement_years: usize,
}

/// Typed advisor recommendation payloads.
///
/// Serialized as `{"type": "...", "params": {...}}` so downstream adapters
/// can translate; the core never emits localized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "params", rename_all = "snake_case")]
pub enum RecommendationKind {
    EarlyRetirement {
        age: i32,
        years: i32,
    },
    DelayedRetirement {
        age: i32,
        years: i32,
    },
    DelayedRetirementNotFeasible {
        age: i32,
    },
    IncreaseIncome {
        percentage: f64,
        fire_age: i32,
        additional_annual_income: f64,
    },
    ReduceExpenses {
        percentage: f64,
        fire_age: i32,
        annual_savings: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(flatten)]
    pub kind: RecommendationKind,
    pub is_achievable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monte_carlo_success_rate: Option<f64>,
}

/// Complete result bundle produced by [`crate::planner::Planner`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerResults {
    pub fire_calculation: FireCalculationResult,
    #[serde(default)]
    pub monte_carlo_success_rate: Option<f64>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    pub calculation_timestamp: jiff::Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommendation_serializes_as_discriminated_object() {
        let rec = Recommendation {
            kind: RecommendationKind::EarlyRetirement { age: 47, years: 3 },
            is_achievable: true,
            monte_carlo_success_rate: Some(0.92),
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "early_retirement");
        assert_eq!(json["params"]["age"], 47);
        assert_eq!(json["params"]["years"], 3);
        assert_eq!(json["is_achievable"], true);

        let back: Recommendation = serde_json::from_value(json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn test_not_feasible_variant_type_id() {
        let rec = Recommendation {
            kind: RecommendationKind::DelayedRetirementNotFeasible { age: 65 },
            is_achievable: false,
            monte_carlo_success_rate: None,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "delayed_retirement_not_feasible");
        assert_eq!(json["params"]["age"], 65);
        assert!(json.get("monte_carlo_success_rate").is_none());
    }
}
