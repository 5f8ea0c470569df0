//! Monte Carlo risk analysis
//!
//! Replays the base projection `num_simulations` times with stochastic
//! income/expense variation and scheduled black-swan events, then runs the
//! deterministic engine over each perturbed scenario.
//!
//! Every scenario gets its own RNG sub-stream derived from the top-level
//! seed and the scenario index, and aggregation runs over per-scenario
//! scalars kept in scenario order, so sequential and parallel execution
//! produce bit-identical aggregates.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use rand_distr::{Distribution, Normal};

#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::engine::{EngineInput, FireEngine};
use crate::error::{PlannerError, PreconditionError, Result, ValidationError};
use crate::events::{BlackSwanEvent, standard_events};
use crate::model::{SimulationSettings, UserProfile};
use crate::projection::AnnualRow;
use crate::stats;

/// Progress hook: `(completed, total)`, invoked at roughly 1% granularity
/// plus once at completion. Returning `false` cancels the run; aggregates
/// then cover only the completed scenarios.
pub type ProgressCallback<'a> = &'a mut dyn FnMut(usize, usize) -> bool;

/// Statistical summary across all scenario replays.
#[derive(Debug, Clone, PartialEq)]
pub struct MonteCarloResult {
    /// Fraction of scenarios in which the plan stayed sustainable.
    pub success_rate: f64,
    pub total_simulations: usize,
    pub successful_simulations: usize,

    pub mean_final_net_worth: f64,
    pub median_final_net_worth: f64,
    pub percentile_5_net_worth: f64,
    pub percentile_25_net_worth: f64,
    pub percentile_75_net_worth: f64,
    pub percentile_95_net_worth: f64,
    pub worst_case_final_net_worth: f64,
    pub best_case_final_net_worth: f64,
    pub standard_deviation_final_net_worth: f64,

    // Minimum net worth is the most sensitive risk indicator.
    pub mean_minimum_net_worth: f64,
    pub median_minimum_net_worth: f64,
    pub percentile_5_minimum_net_worth: f64,
    pub percentile_25_minimum_net_worth: f64,
    pub percentile_75_minimum_net_worth: f64,
    pub percentile_95_minimum_net_worth: f64,
    pub worst_case_minimum_net_worth: f64,
    pub best_case_minimum_net_worth: f64,
    pub standard_deviation_minimum_net_worth: f64,

    pub black_swan_analysis: Option<BlackSwanAnalysis>,
    /// 0..=100; combines success rate with outcome stability.
    pub resilience_score: Option<f64>,
    /// Suggested emergency fund in absolute terms.
    pub recommended_emergency_fund: Option<f64>,
}

/// Event telemetry and tail analysis, present when black-swan events ran.
#[derive(Debug, Clone, PartialEq)]
pub struct BlackSwanAnalysis {
    pub worst_10_percent_avg_net_worth: f64,
    pub worst_10_percent_success_rate: f64,
    /// `max(0, 1 - worst-10% success rate)`.
    pub impact_severity: f64,
    pub event_counts: BTreeMap<String, usize>,
    pub total_events_triggered: usize,
    pub avg_events_per_simulation: f64,
}

struct ScenarioOutcome {
    final_net_worth: f64,
    minimum_net_worth: f64,
    fire_success: bool,
    triggered_events: Vec<&'static str>,
}

pub struct MonteCarloSimulator<'a> {
    profile: &'a UserProfile,
    base: &'a [AnnualRow],
    settings: SimulationSettings,
    events: Vec<BlackSwanEvent>,
    seed: Option<u64>,
    current_year: i32,
}

impl<'a> MonteCarloSimulator<'a> {
    pub fn new(
        profile: &'a UserProfile,
        base: &'a [AnnualRow],
        settings: SimulationSettings,
        seed: Option<u64>,
        current_year: i32,
    ) -> Self {
        let events = standard_events(profile, current_year);
        Self {
            profile,
            base,
            settings,
            events,
            seed,
            current_year,
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    /// Run all scenarios and aggregate. Parallel across scenarios when the
    /// `parallel` feature is enabled.
    pub fn run_simulation(&self) -> Result<MonteCarloResult> {
        self.check_inputs()?;
        let base_seed = self.resolve_seed();
        let n = self.settings.num_simulations;

        #[cfg(feature = "parallel")]
        let outcomes: Vec<ScenarioOutcome> = (0..n)
            .into_par_iter()
            .map(|run| self.run_scenario(base_seed, run))
            .collect::<std::result::Result<_, _>>()?;

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<ScenarioOutcome> = (0..n)
            .map(|run| self.run_scenario(base_seed, run))
            .collect::<std::result::Result<_, _>>()?;

        Ok(self.aggregate(&outcomes))
    }

    /// Sequential run with a progress callback; cancellation yields partial
    /// aggregates over the scenarios completed so far.
    pub fn run_simulation_with_progress(
        &self,
        progress: ProgressCallback<'_>,
    ) -> Result<MonteCarloResult> {
        self.check_inputs()?;
        let base_seed = self.resolve_seed();
        let n = self.settings.num_simulations;
        let step = (n / 100).max(1);

        let mut outcomes = Vec::with_capacity(n);
        for run in 0..n {
            if run % step == 0 && !progress(run, n) {
                break;
            }
            outcomes.push(self.run_scenario(base_seed, run)?);
        }
        progress(outcomes.len(), n);

        Ok(self.aggregate(&outcomes))
    }

    /// Sweep one uncertainty knob over the given values and report the
    /// success rate at each, using a quarter of the configured scenario
    /// count per probe.
    pub fn analyze_sensitivity(&self, parameter: &str, variations: &[f64]) -> Result<Vec<f64>> {
        let mut rates = Vec::with_capacity(variations.len());
        for &value in variations {
            let mut settings = self.settings.clone();
            settings.num_simulations = (self.settings.num_simulations / 4).max(1);
            match parameter {
                "income_volatility" => settings.income_base_volatility = value,
                "expense_volatility" => settings.expense_base_volatility = value,
                "black_swan_probability" => settings.include_black_swan_events = value > 0.5,
                other => {
                    return Err(ValidationError::UnknownSensitivityParameter(other.to_string()).into());
                }
            }

            let simulator = MonteCarloSimulator::new(
                self.profile,
                self.base,
                settings,
                self.seed,
                self.current_year,
            );
            rates.push(simulator.run_simulation()?.success_rate);
        }
        Ok(rates)
    }

    fn check_inputs(&self) -> Result<()> {
        self.settings.validate()?;
        if self.base.is_empty() {
            return Err(PreconditionError::EmptyProjection.into());
        }
        Ok(())
    }

    /// Top-level seed: the configured one, or fresh OS entropy per run.
    fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| rand::rng().random())
    }

    fn run_scenario(
        &self,
        base_seed: u64,
        run: usize,
    ) -> std::result::Result<ScenarioOutcome, PlannerError> {
        let mut rng = SmallRng::seed_from_u64(scenario_seed(base_seed, run));
        let mut rows = self.base.to_vec();

        let income_noise = Normal::new(1.0, self.settings.income_base_volatility)
            .map_err(|_| ValidationError::InvalidVolatility(self.settings.income_base_volatility))?;
        let expense_noise = Normal::new(1.0, self.settings.expense_base_volatility)
            .map_err(|_| ValidationError::InvalidVolatility(self.settings.expense_base_volatility))?;

        // Working-year income uncertainty only; post-FIRE income is treated
        // as fixed (pensions, contracted returns).
        for row in rows.iter_mut() {
            if row.age < self.profile.expected_fire_age {
                let m = income_noise
                    .sample(&mut rng)
                    .max(self.settings.income_minimum_factor);
                row.total_income *= m;
            }
        }

        // Expense uncertainty applies across the whole lifetime.
        for row in rows.iter_mut() {
            let m = expense_noise
                .sample(&mut rng)
                .max(self.settings.expense_minimum_factor);
            row.total_expense *= m;
        }

        let triggered_events = if self.settings.include_black_swan_events {
            apply_black_swan_events(&mut rows, &self.events, |event, _age| {
                rng.random::<f64>() < event.annual_probability
            })
        } else {
            Vec::new()
        };

        let mut engine = FireEngine::new(EngineInput {
            profile: self.profile,
            rows: &rows,
        });
        let result = engine.calculate()?;

        let minimum_net_worth = result
            .yearly_results
            .iter()
            .map(|s| s.net_worth)
            .fold(f64::INFINITY, f64::min)
            .min(result.final_net_worth);

        Ok(ScenarioOutcome {
            final_net_worth: result.final_net_worth,
            minimum_net_worth,
            fire_success: result.is_fire_achievable,
            triggered_events,
        })
    }

    fn aggregate(&self, outcomes: &[ScenarioOutcome]) -> MonteCarloResult {
        let n = outcomes.len();
        let finals: Vec<f64> = outcomes.iter().map(|o| o.final_net_worth).collect();
        let mins: Vec<f64> = outcomes.iter().map(|o| o.minimum_net_worth).collect();
        let successful = outcomes.iter().filter(|o| o.fire_success).count();
        let success_rate = if n > 0 { successful as f64 / n as f64 } else { 0.0 };

        let finals_sorted = stats::sorted_copy(&finals);
        let mins_sorted = stats::sorted_copy(&mins);

        let (black_swan_analysis, resilience_score, recommended_emergency_fund) =
            if self.settings.include_black_swan_events && n > 0 {
                (
                    Some(self.analyze_black_swan_impact(outcomes)),
                    Some(self.resilience_score(success_rate, &finals)),
                    Some(self.recommend_emergency_fund(success_rate)),
                )
            } else {
                (None, None, None)
            };

        MonteCarloResult {
            success_rate,
            total_simulations: n,
            successful_simulations: successful,

            mean_final_net_worth: stats::mean(&finals),
            median_final_net_worth: stats::median_of_sorted(&finals_sorted),
            percentile_5_net_worth: stats::percentile_of_sorted(&finals_sorted, 5.0),
            percentile_25_net_worth: stats::percentile_of_sorted(&finals_sorted, 25.0),
            percentile_75_net_worth: stats::percentile_of_sorted(&finals_sorted, 75.0),
            percentile_95_net_worth: stats::percentile_of_sorted(&finals_sorted, 95.0),
            worst_case_final_net_worth: finals_sorted.first().copied().unwrap_or(0.0),
            best_case_final_net_worth: finals_sorted.last().copied().unwrap_or(0.0),
            standard_deviation_final_net_worth: stats::std_dev(&finals),

            mean_minimum_net_worth: stats::mean(&mins),
            median_minimum_net_worth: stats::median_of_sorted(&mins_sorted),
            percentile_5_minimum_net_worth: stats::percentile_of_sorted(&mins_sorted, 5.0),
            percentile_25_minimum_net_worth: stats::percentile_of_sorted(&mins_sorted, 25.0),
            percentile_75_minimum_net_worth: stats::percentile_of_sorted(&mins_sorted, 75.0),
            percentile_95_minimum_net_worth: stats::percentile_of_sorted(&mins_sorted, 95.0),
            worst_case_minimum_net_worth: mins_sorted.first().copied().unwrap_or(0.0),
            best_case_minimum_net_worth: mins_sorted.last().copied().unwrap_or(0.0),
            standard_deviation_minimum_net_worth: stats::std_dev(&mins),

            black_swan_analysis,
            resilience_score,
            recommended_emergency_fund,
        }
    }

    fn analyze_black_swan_impact(&self, outcomes: &[ScenarioOutcome]) -> BlackSwanAnalysis {
        let worst_count = (outcomes.len() / 10).max(1);
        let mut by_final: Vec<&ScenarioOutcome> = outcomes.iter().collect();
        by_final.sort_by(|a, b| {
            a.final_net_worth
                .partial_cmp(&b.final_net_worth)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        let worst = &by_final[..worst_count];

        let worst_avg = stats::mean(&worst.iter().map(|o| o.final_net_worth).collect::<Vec<_>>());
        let worst_success_rate =
            worst.iter().filter(|o| o.fire_success).count() as f64 / worst.len() as f64;

        let mut event_counts: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_events = 0usize;
        for outcome in outcomes {
            for &id in &outcome.triggered_events {
                *event_counts.entry(id.to_string()).or_insert(0) += 1;
                total_events += 1;
            }
        }

        BlackSwanAnalysis {
            worst_10_percent_avg_net_worth: worst_avg,
            worst_10_percent_success_rate: worst_success_rate,
            impact_severity: (1.0 - worst_success_rate).max(0.0),
            event_counts,
            total_events_triggered: total_events,
            avg_events_per_simulation: total_events as f64 / outcomes.len() as f64,
        }
    }

    /// `(0.7 * success_rate + 0.3 * stability) * 100`, where stability is
    /// `max(0, 1 - cv)` and `cv` is the coefficient of variation of the
    /// final net worth.
    fn resilience_score(&self, success_rate: f64, finals: &[f64]) -> f64 {
        let mean = stats::mean(finals);
        let cv = if mean == 0.0 {
            1.0
        } else {
            stats::std_dev(finals) / mean.abs()
        };
        let stability = (1.0 - cv).max(0.0);
        ((success_rate * 0.7 + stability * 0.3) * 100.0).clamp(0.0, 100.0)
    }

    /// Months of the base projection's mean annual expenses, scaled by how
    /// shaky the plan looks.
    fn recommend_emergency_fund(&self, success_rate: f64) -> f64 {
        let annual_expenses =
            stats::mean(&self.base.iter().map(|r| r.total_expense).collect::<Vec<_>>());
        let months = if success_rate >= 0.9 {
            6.0
        } else if success_rate >= 0.7 {
            12.0
        } else {
            18.0
        };
        annual_expenses * months / 12.0
    }
}

/// Layer black-swan events over a scenario.
///
/// `sample` decides whether an event triggers at a given age (production
/// passes a Bernoulli draw). For each row, in order: freshly sampled events
/// that are not already active trigger at full strength and, when
/// multi-year, go on the active list; already-active events replay at
/// `recovery_factor` strength and expire when their duration runs out.
/// A fresh hit on an active event is suppressed.
///
/// Returns the ids of all actual triggers, in order.
pub fn apply_black_swan_events(
    rows: &mut [AnnualRow],
    events: &[BlackSwanEvent],
    mut sample: impl FnMut(&BlackSwanEvent, i32) -> bool,
) -> Vec<&'static str> {
    let mut triggered_ids: Vec<&'static str> = Vec::new();
    // (event index, years remaining), insertion-ordered for determinism
    let mut active: Vec<(usize, u32)> = Vec::new();

    for row_idx in 0..rows.len() {
        let age = rows[row_idx].age;

        let mut new_this_year: Vec<usize> = Vec::new();
        for (event_idx, event) in events.iter().enumerate() {
            if event.is_in_age_range(age)
                && sample(event, age)
                && !active.iter().any(|&(i, _)| i == event_idx)
            {
                new_this_year.push(event_idx);
            }
        }

        for &event_idx in &new_this_year {
            let event = &events[event_idx];
            event.apply(&mut rows[row_idx], 1.0);
            triggered_ids.push(event.event_id);
            if event.duration_years > 1 {
                active.push((event_idx, event.duration_years - 1));
            }
        }

        // Damped replay of ongoing events, skipping ones that just fired
        active.retain_mut(|(event_idx, years_remaining)| {
            if new_this_year.contains(event_idx) {
                return true;
            }
            let event = &events[*event_idx];
            event.apply(&mut rows[row_idx], event.recovery_factor);
            *years_remaining -= 1;
            *years_remaining > 0
        });
    }

    triggered_ids
}

/// Deterministic per-scenario sub-stream seed (splitmix64 over the
/// top-level seed and scenario index).
fn scenario_seed(base_seed: u64, run: usize) -> u64 {
    let mut z = base_seed.wrapping_add((run as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
