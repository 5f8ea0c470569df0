//! Plan advisor
//!
//! Searches single levers for the smallest change that flips
//! sustainability. A sustainable plan gets an earliest-retirement probe;
//! an unsustainable one gets up to three alternatives: delayed retirement,
//! income increase, and expense reduction. The age searches walk year by
//! year; the income and expense searches bisect, assuming sustainability
//! is monotonic in the lever.
//!
//! Every probe builds a fresh perturbed projection and an ephemeral engine;
//! the advisor never mutates its inputs.

use crate::engine::{EngineInput, FireEngine};
use crate::error::Result;
use crate::model::{
    IncomeExpenseItem, Recommendation, RecommendationKind, SimulationSettings, UserProfile,
};
use crate::monte_carlo::MonteCarloSimulator;
use crate::projection::{AnnualRow, ProjectionTable};

const INCOME_MULTIPLIER_RANGE: (f64, f64) = (1.0, 5.0);
const INCOME_MULTIPLIER_PRECISION: f64 = 0.01;
const EXPENSE_REDUCTION_RANGE: (f64, f64) = (0.0, 0.8);
const EXPENSE_REDUCTION_PRECISION: f64 = 0.001;

pub struct Advisor<'a> {
    profile: &'a UserProfile,
    projection: &'a ProjectionTable,
    income_items: &'a [IncomeExpenseItem],
    current_year: i32,
}

impl<'a> Advisor<'a> {
    /// `projection` must already have overrides applied.
    pub fn new(
        profile: &'a UserProfile,
        projection: &'a ProjectionTable,
        income_items: &'a [IncomeExpenseItem],
        current_year: i32,
    ) -> Self {
        Self {
            profile,
            projection,
            income_items,
            current_year,
        }
    }

    /// All recommendations for the current plan, ordered by relevance.
    pub fn recommendations(&self) -> Result<Vec<Recommendation>> {
        let base_rows = self.projection.annual_summary();
        let mut recommendations = Vec::new();

        if self.is_achievable(&base_rows)? {
            if let Some(rec) = self.find_earliest_retirement()? {
                recommendations.push(rec);
            }
        } else {
            recommendations.push(self.find_required_delayed_retirement()?);
            if let Some(rec) = self.find_required_income_increase(&base_rows)? {
                recommendations.push(rec);
            }
            if let Some(rec) = self.find_required_expense_reduction(&base_rows)? {
                recommendations.push(rec);
            }
        }

        Ok(recommendations)
    }

    fn is_achievable(&self, rows: &[AnnualRow]) -> Result<bool> {
        let mut engine = FireEngine::new(EngineInput {
            profile: self.profile,
            rows,
        });
        Ok(engine.calculate()?.is_fire_achievable)
    }

    /// Work-income streams are the ones ending exactly at the planned FIRE
    /// age; those are the columns the age searches manipulate.
    fn work_income_items(&self) -> Vec<&IncomeExpenseItem> {
        self.income_items
            .iter()
            .filter(|item| item.end_age == Some(self.profile.expected_fire_age))
            .collect()
    }

    /// Projection rows with work income zeroed beyond `test_age`.
    fn rows_with_income_truncated_at(&self, test_age: i32) -> Vec<AnnualRow> {
        let mut table = self.projection.clone();
        let last_age = *self.projection.ages().last().unwrap_or(&test_age);
        for item in self.work_income_items() {
            for age in (test_age + 1)..=last_age {
                table.set_value(age, &item.id, 0.0);
            }
        }
        table.annual_summary()
    }

    /// Projection rows with work income regrown out to `target_age` at each
    /// item's declared growth rate.
    fn rows_with_income_extended_to(&self, target_age: i32) -> Vec<AnnualRow> {
        let mut table = self.projection.clone();
        for item in self.work_income_items() {
            let Some(end_age) = item.end_age else { continue };
            let growth = 1.0 + item.annual_growth_rate / 100.0;
            for age in (end_age + 1)..=target_age {
                let value = item.annual_amount() * growth.powi(age - item.start_age);
                table.set_value(age, &item.id, value);
            }
        }
        table.annual_summary()
    }

    /// Walk backwards from the planned FIRE age and report the last age
    /// that still sustains, with a Monte Carlo success rate attached.
    fn find_earliest_retirement(&self) -> Result<Option<Recommendation>> {
        let fire_age = self.profile.expected_fire_age;
        let current_age = self.profile.current_age(self.current_year);

        let mut earliest = fire_age;
        let mut test_age = fire_age - 1;
        while test_age >= current_age {
            let rows = self.rows_with_income_truncated_at(test_age);
            if self.is_achievable(&rows)? {
                earliest = test_age;
                test_age -= 1;
            } else {
                break;
            }
        }

        if earliest >= fire_age {
            return Ok(None);
        }

        let rows = self.rows_with_income_truncated_at(earliest);
        let mut optimal_profile = self.profile.clone();
        optimal_profile.expected_fire_age = earliest;
        let simulator = MonteCarloSimulator::new(
            &optimal_profile,
            &rows,
            SimulationSettings::default(),
            None,
            self.current_year,
        );
        let monte_carlo_success_rate = simulator.run_simulation().ok().map(|r| r.success_rate);

        Ok(Some(Recommendation {
            kind: RecommendationKind::EarlyRetirement {
                age: earliest,
                years: fire_age - earliest,
            },
            is_achievable: true,
            monte_carlo_success_rate,
        }))
    }

    /// Walk forwards to the legal retirement age; the first sustainable age
    /// wins. When none works, report the maximum delay as not feasible.
    fn find_required_delayed_retirement(&self) -> Result<Recommendation> {
        let fire_age = self.profile.expected_fire_age;
        let legal_age = self.profile.legal_retirement_age;

        for test_age in (fire_age + 1)..=legal_age {
            let rows = self.rows_with_income_extended_to(test_age);
            if self.is_achievable(&rows)? {
                return Ok(Recommendation {
                    kind: RecommendationKind::DelayedRetirement {
                        age: test_age,
                        years: test_age - fire_age,
                    },
                    is_achievable: true,
                    monte_carlo_success_rate: None,
                });
            }
        }

        Ok(Recommendation {
            kind: RecommendationKind::DelayedRetirementNotFeasible { age: legal_age },
            is_achievable: false,
            monte_carlo_success_rate: None,
        })
    }

    /// Bisect the smallest uniform whole-life income multiplier that makes
    /// the plan sustainable. The multiplier deliberately also scales
    /// post-FIRE income, mirroring the original behavior.
    fn find_required_income_increase(
        &self,
        base_rows: &[AnnualRow],
    ) -> Result<Option<Recommendation>> {
        let (mut low, mut high) = INCOME_MULTIPLIER_RANGE;
        let mut best_feasible = None;

        while high - low > INCOME_MULTIPLIER_PRECISION {
            let mid = f64::midpoint(low, high);
            let rows: Vec<AnnualRow> = base_rows
                .iter()
                .map(|r| AnnualRow {
                    total_income: r.total_income * mid,
                    ..*r
                })
                .collect();

            if self.is_achievable(&rows)? {
                best_feasible = Some(mid);
                high = mid;
            } else {
                low = mid;
            }
        }

        Ok(best_feasible.map(|multiplier| {
            let original_income = base_rows.first().map(|r| r.total_income).unwrap_or(0.0);
            Recommendation {
                kind: RecommendationKind::IncreaseIncome {
                    percentage: (multiplier - 1.0) * 100.0,
                    fire_age: self.profile.expected_fire_age,
                    additional_annual_income: original_income * (multiplier - 1.0),
                },
                is_achievable: true,
                monte_carlo_success_rate: None,
            }
        }))
    }

    /// Bisect the smallest expense-reduction fraction that makes the plan
    /// sustainable.
    fn find_required_expense_reduction(
        &self,
        base_rows: &[AnnualRow],
    ) -> Result<Option<Recommendation>> {
        let (mut low, mut high) = EXPENSE_REDUCTION_RANGE;
        let mut best_feasible = None;

        while high - low > EXPENSE_REDUCTION_PRECISION {
            let mid = f64::midpoint(low, high);
            let rows: Vec<AnnualRow> = base_rows
                .iter()
                .map(|r| AnnualRow {
                    total_expense: r.total_expense * (1.0 - mid),
                    ..*r
                })
                .collect();

            if self.is_achievable(&rows)? {
                best_feasible = Some(mid);
                high = mid;
            } else {
                low = mid;
            }
        }

        Ok(best_feasible.map(|reduction| {
            let original_expense = base_rows.first().map(|r| r.total_expense).unwrap_or(0.0);
            Recommendation {
                kind: RecommendationKind::ReduceExpenses {
                    percentage: reduction * 100.0,
                    fire_age: self.profile.expected_fire_age,
                    annual_savings: original_expense * reduction,
                },
                is_achievable: true,
                monte_carlo_success_rate: None,
            }
        }))
    }
}
