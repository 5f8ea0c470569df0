//! Deterministic FIRE calculation engine
//!
//! Drives the portfolio simulator over the annual summary rows and tracks
//! accumulated shortfall once the portfolio is depleted. Depletion and
//! failure to reach FIRE are modeled outcomes; the only hard failure is an
//! empty projection.

use crate::error::PreconditionError;
use crate::model::{FireCalculationResult, UserProfile, YearlyState};
use crate::portfolio::PortfolioSimulator;
use crate::projection::AnnualRow;

/// Read-only input for one engine run.
///
/// Row values are final computed figures (growth, inflation, overrides
/// already applied); the engine uses them without further adjustment.
#[derive(Debug, Clone, Copy)]
pub struct EngineInput<'a> {
    pub profile: &'a UserProfile,
    pub rows: &'a [AnnualRow],
}

pub struct FireEngine<'a> {
    input: EngineInput<'a>,
    simulator: PortfolioSimulator,
}

impl<'a> FireEngine<'a> {
    pub fn new(input: EngineInput<'a>) -> Self {
        let simulator = PortfolioSimulator::new(input.profile);
        Self { input, simulator }
    }

    /// Run the complete calculation and assemble the result bundle.
    pub fn calculate(&mut self) -> Result<FireCalculationResult, PreconditionError> {
        let yearly_states = self.calculate_yearly_states()?;
        Ok(self.assemble_result(yearly_states))
    }

    fn calculate_yearly_states(&mut self) -> Result<Vec<YearlyState>, PreconditionError> {
        if self.input.rows.is_empty() {
            return Err(PreconditionError::EmptyProjection);
        }

        let profile = self.input.profile;
        self.simulator.reset_to_initial();

        let mut states = Vec::with_capacity(self.input.rows.len());
        let mut cumulative_debt = 0.0;

        for row in self.input.rows {
            let net_cash_flow = row.net_flow();
            let portfolio_result =
                self.simulator
                    .simulate_year(row.age, net_cash_flow, row.total_expense);
            let portfolio_value = portfolio_result.ending_value;

            let net_worth = if portfolio_value > 0.0 {
                cumulative_debt = 0.0;
                portfolio_value
            } else {
                if net_cash_flow < 0.0 {
                    cumulative_debt += net_cash_flow.abs();
                }
                -cumulative_debt
            };

            let safety_buffer = row.total_expense * profile.safety_buffer_months / 12.0;
            let fire_number = row.total_expense * 25.0;
            let fire_progress = if fire_number > 0.0 {
                portfolio_value / fire_number
            } else {
                0.0
            };

            states.push(YearlyState {
                age: row.age,
                year: row.year,
                total_income: row.total_income,
                total_expense: row.total_expense,
                net_cash_flow,
                portfolio_value,
                investment_return: portfolio_result.investment_return,
                net_worth,
                is_sustainable: net_worth >= safety_buffer,
                fire_number,
                fire_progress,
            });
        }

        Ok(states)
    }

    fn assemble_result(&self, yearly_states: Vec<YearlyState>) -> FireCalculationResult {
        let profile = self.input.profile;
        let is_fire_achievable =
            !yearly_states.is_empty() && yearly_states.iter().all(|s| s.is_sustainable);

        let current_age = yearly_states[0].age;
        let fire_index = (profile.expected_fire_age - current_age) as isize;
        let fire_state = if fire_index >= 0 {
            yearly_states.get(fire_index as usize)
        } else {
            None
        };

        let fire_net_worth = fire_state.map(|s| s.net_worth).unwrap_or(0.0);
        let min_net_worth_after_fire = if fire_index >= 0 && (fire_index as usize) < yearly_states.len() {
            yearly_states[fire_index as usize..]
                .iter()
                .map(|s| s.net_worth)
                .fold(f64::INFINITY, f64::min)
        } else {
            0.0
        };

        let final_net_worth = yearly_states.last().map(|s| s.net_worth).unwrap_or(0.0);

        let min_safety_buffer_ratio = yearly_states
            .iter()
            .filter_map(|s| {
                let buffer = s.total_expense * profile.safety_buffer_months / 12.0;
                (buffer > 0.0).then(|| s.net_worth / buffer)
            })
            .fold(f64::INFINITY, f64::min);
        let min_safety_buffer_ratio = if min_safety_buffer_ratio.is_finite() {
            min_safety_buffer_ratio
        } else {
            0.0
        };

        let traditional_fire_number = if yearly_states.len() >= 5 {
            let first_five_mean = yearly_states[..5]
                .iter()
                .map(|s| s.total_expense)
                .sum::<f64>()
                / 5.0;
            first_five_mean * 25.0
        } else {
            0.0
        };
        // A zero target (no expenses, or a projection under five years) is
        // trivially reached, since portfolio values never go negative
        let traditional_fire_achieved = yearly_states
            .iter()
            .any(|s| s.portfolio_value >= traditional_fire_number);

        let retirement_years = if fire_index >= 0 {
            yearly_states.len().saturating_sub(fire_index as usize)
        } else {
            0
        };

        FireCalculationResult {
            is_fire_achievable,
            fire_net_worth,
            min_net_worth_after_fire,
            final_net_worth,
            safety_buffer_months: profile.safety_buffer_months,
            min_safety_buffer_ratio,
            total_years_simulated: yearly_states.len(),
            retirement_years,
            yearly_results: yearly_states,
            traditional_fire_number,
            traditional_fire_achieved,
            fire_success_probability: None,
        }
    }
}
