//! Black-swan event library
//!
//! Fifteen rare, multi-year shocks to income and/or expense, each a plain
//! record with a tagged impact. Recovery years replay the event with the
//! first-year delta scaled by `recovery_factor`: a -40% hit at a recovery
//! multiplier of 0.8 becomes a multiplier of `1 + (-0.4 * 0.8) = 0.68`.
//!
//! Age ranges are personalized per profile so that, for example, career
//! events stop firing at the expected FIRE age.

use crate::model::UserProfile;
use crate::projection::AnnualRow;

/// How an event modifies a projection row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventImpact {
    /// Multiplicative on income: `income *= 1 + delta * m`.
    Income { delta: f64 },
    /// Multiplicative on expense.
    Expense { delta: f64 },
    /// Multiplicative on both sides.
    Mixed { income_delta: f64, expense_delta: f64 },
    /// Income multiplier clamped from below (job-loss style shocks never
    /// erase more than `1 - floor` of the baseline).
    FlooredIncome { delta: f64, floor: f64 },
    /// Adds `multiple * current_income * m` to income.
    Inheritance { multiple: f64 },
}

/// A parameterized rare event.
#[derive(Debug, Clone, PartialEq)]
pub struct BlackSwanEvent {
    pub event_id: &'static str,
    pub annual_probability: f64,
    pub duration_years: u32,
    /// Scales the delta in years after the first hit; 0..=1.
    pub recovery_factor: f64,
    /// Inclusive age span in which the event can trigger.
    pub age_range: (i32, i32),
    pub impact: EventImpact,
}

impl BlackSwanEvent {
    pub fn is_in_age_range(&self, age: i32) -> bool {
        self.age_range.0 <= age && age <= self.age_range.1
    }

    /// Apply this event's impact to one row, with `recovery_multiplier`
    /// 1.0 in the trigger year and `recovery_factor` afterwards.
    pub fn apply(&self, row: &mut AnnualRow, recovery_multiplier: f64) {
        match self.impact {
            EventImpact::Income { delta } => {
                row.total_income *= 1.0 + delta * recovery_multiplier;
            }
            EventImpact::Expense { delta } => {
                row.total_expense *= 1.0 + delta * recovery_multiplier;
            }
            EventImpact::Mixed {
                income_delta,
                expense_delta,
            } => {
                row.total_income *= 1.0 + income_delta * recovery_multiplier;
                row.total_expense *= 1.0 + expense_delta * recovery_multiplier;
            }
            EventImpact::FlooredIncome { delta, floor } => {
                let multiplier = (1.0 + delta * recovery_multiplier).max(floor);
                row.total_income *= multiplier;
            }
            EventImpact::Inheritance { multiple } => {
                row.total_income += multiple * row.total_income * recovery_multiplier;
            }
        }
    }
}

/// Build the event library personalized to a profile's age spans.
pub fn standard_events(profile: &UserProfile, current_year: i32) -> Vec<BlackSwanEvent> {
    let current_age = profile.current_age(current_year);
    let life = profile.life_expectancy;

    // Economy-wide shocks can hit at any simulated age; career shocks end
    // at the FIRE age; workforce shocks also respect the legal retirement
    // age; care costs only appear in legal retirement.
    let economy = (current_age, life);
    let adult = (current_age.max(18), life);
    let career = (current_age, profile.expected_fire_age);
    let working = (
        current_age.max(22),
        profile.expected_fire_age.min(profile.legal_retirement_age),
    );
    let retirement = (profile.legal_retirement_age, life);
    let inheritance = (30, life.min(70));

    vec![
        BlackSwanEvent {
            event_id: "financial_crisis",
            annual_probability: 0.016,
            duration_years: 2,
            recovery_factor: 0.8,
            age_range: economy,
            impact: EventImpact::Income { delta: -0.40 },
        },
        BlackSwanEvent {
            event_id: "economic_recession",
            annual_probability: 0.030,
            duration_years: 1,
            recovery_factor: 0.9,
            age_range: economy,
            impact: EventImpact::Income { delta: -0.25 },
        },
        BlackSwanEvent {
            event_id: "market_crash",
            annual_probability: 0.020,
            duration_years: 1,
            recovery_factor: 0.9,
            age_range: economy,
            impact: EventImpact::Income { delta: -0.30 },
        },
        BlackSwanEvent {
            event_id: "hyperinflation",
            annual_probability: 0.010,
            duration_years: 3,
            recovery_factor: 0.7,
            age_range: economy,
            impact: EventImpact::Mixed {
                income_delta: -0.30,
                expense_delta: 0.30,
            },
        },
        BlackSwanEvent {
            event_id: "unemployment",
            annual_probability: 0.006,
            duration_years: 2,
            recovery_factor: 0.4,
            age_range: career,
            impact: EventImpact::FlooredIncome {
                delta: -1.0,
                floor: 0.10,
            },
        },
        BlackSwanEvent {
            event_id: "industry_collapse",
            annual_probability: 0.002,
            duration_years: 3,
            recovery_factor: 0.6,
            age_range: working,
            impact: EventImpact::FlooredIncome {
                delta: -0.70,
                floor: 0.10,
            },
        },
        BlackSwanEvent {
            event_id: "unexpected_promotion",
            annual_probability: 0.004,
            duration_years: 5,
            recovery_factor: 1.0,
            age_range: career,
            impact: EventImpact::Income { delta: 0.30 },
        },
        BlackSwanEvent {
            event_id: "major_illness",
            annual_probability: 0.004,
            duration_years: 2,
            recovery_factor: 0.9,
            age_range: economy,
            impact: EventImpact::Expense { delta: 1.50 },
        },
        BlackSwanEvent {
            event_id: "long_term_care",
            annual_probability: 0.001,
            duration_years: 10,
            recovery_factor: 0.5,
            age_range: retirement,
            impact: EventImpact::Expense { delta: 1.20 },
        },
        BlackSwanEvent {
            event_id: "regional_conflict",
            annual_probability: 0.006,
            duration_years: 2,
            recovery_factor: 0.9,
            age_range: adult,
            impact: EventImpact::Mixed {
                income_delta: -0.20,
                expense_delta: 0.10,
            },
        },
        BlackSwanEvent {
            event_id: "global_war",
            annual_probability: 0.0016,
            duration_years: 4,
            recovery_factor: 0.7,
            age_range: adult,
            impact: EventImpact::Mixed {
                income_delta: -0.60,
                expense_delta: 0.40,
            },
        },
        BlackSwanEvent {
            event_id: "economic_sanctions",
            annual_probability: 0.004,
            duration_years: 3,
            recovery_factor: 0.8,
            age_range: economy,
            impact: EventImpact::Income { delta: -0.30 },
        },
        BlackSwanEvent {
            event_id: "energy_crisis",
            annual_probability: 0.008,
            duration_years: 2,
            recovery_factor: 0.85,
            age_range: adult,
            impact: EventImpact::Mixed {
                income_delta: -0.25,
                expense_delta: 0.25,
            },
        },
        BlackSwanEvent {
            event_id: "inheritance",
            annual_probability: 0.0016,
            duration_years: 1,
            recovery_factor: 1.0,
            age_range: inheritance,
            impact: EventImpact::Inheritance { multiple: 2.0 },
        },
        BlackSwanEvent {
            event_id: "investment_windfall",
            annual_probability: 0.0002,
            duration_years: 1,
            recovery_factor: 1.0,
            age_range: working,
            impact: EventImpact::Income { delta: 3.0 },
        },
    ]
}
