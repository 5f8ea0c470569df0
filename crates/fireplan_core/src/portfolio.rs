//! Portfolio state and year-at-a-time simulation
//!
//! The simulator owns the evolving asset values for one calculation run.
//! Expected returns accrue before cash flows each year; volatility is
//! ignored here — the Monte Carlo engine perturbs the projection inputs
//! instead of per-asset returns.

use crate::model::{PortfolioConfiguration, UserProfile};
use crate::strategy::{CashFlowStrategy, LiquidityAwareStrategy};

/// Allocation drift beyond this fraction triggers a warning before the
/// automatic renormalization.
pub const ALLOCATION_DRIFT_TOLERANCE: f64 = 1e-4;

/// Rebalancing kicks in once any asset is off target by more than this
/// fraction of the portfolio.
pub const REBALANCE_THRESHOLD: f64 = 0.05;

/// Current asset values, aligned with the configuration's asset order.
///
/// Intermediate states may drift off the target allocation; only
/// [`PortfolioState::allocation`] enforces the exact-sum view.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub asset_values: Vec<f64>,
}

impl PortfolioState {
    pub fn new(asset_values: Vec<f64>) -> Self {
        Self { asset_values }
    }

    pub fn total_value(&self) -> f64 {
        self.asset_values.iter().sum()
    }

    /// Current allocation fractions, renormalized to sum to exactly 1.0:
    /// proportional rescale, then the residual is folded into the largest
    /// entry. A raw sum off by more than [`ALLOCATION_DRIFT_TOLERANCE`]
    /// is logged and autocorrected. A zero portfolio yields all zeros.
    pub fn allocation(&self) -> Vec<f64> {
        let total = self.total_value();
        if total == 0.0 {
            return vec![0.0; self.asset_values.len()];
        }

        let raw: Vec<f64> = self.asset_values.iter().map(|v| v / total).collect();
        let sum: f64 = raw.iter().sum();
        if (sum - 1.0).abs() > ALLOCATION_DRIFT_TOLERANCE {
            tracing::warn!(
                allocation_sum = sum,
                "portfolio allocation sum deviates from 1.0, renormalizing"
            );
        }
        if sum <= 0.0 {
            return raw;
        }

        let mut adjusted: Vec<f64> = raw.iter().map(|a| a / sum).collect();
        let residual = 1.0 - adjusted.iter().sum::<f64>();
        if residual != 0.0
            && let Some(largest) = adjusted
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
                .map(|(i, _)| i)
        {
            adjusted[largest] += residual;
        }
        adjusted
    }
}

/// Outcome of simulating one year of portfolio evolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearlyPortfolioResult {
    pub starting_value: f64,
    pub investment_return: f64,
    pub ending_value: f64,
}

/// Stateful year-by-year portfolio evolution for a single calculation run.
///
/// Not shared between concurrent scenario replays: every Monte Carlo
/// scenario constructs its own simulator from the same initial snapshot.
pub struct PortfolioSimulator {
    config: PortfolioConfiguration,
    strategy: LiquidityAwareStrategy,
    initial: PortfolioState,
    state: PortfolioState,
}

impl PortfolioSimulator {
    /// Partition the profile's current net worth across asset classes by
    /// their target allocation.
    pub fn new(profile: &UserProfile) -> Self {
        let config = profile.portfolio.clone();
        let initial = PortfolioState::new(
            config
                .target_allocation()
                .iter()
                .map(|w| profile.current_net_worth * w)
                .collect(),
        );
        Self {
            state: initial.clone(),
            initial,
            config,
            strategy: LiquidityAwareStrategy::default(),
        }
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    /// Restore the starting snapshot without reallocating.
    pub fn reset_to_initial(&mut self) {
        self.state.asset_values.clear();
        self.state
            .asset_values
            .extend_from_slice(&self.initial.asset_values);
    }

    /// Evolve the portfolio through one year: accrue expected returns,
    /// dispatch the net cash flow through the strategy, floor values at
    /// zero, then rebalance if drift exceeds the threshold.
    pub fn simulate_year(
        &mut self,
        _age: i32,
        net_cash_flow: f64,
        annual_expense: f64,
    ) -> YearlyPortfolioResult {
        let starting_value = self.state.total_value();
        let starting_allocation = self.state.allocation();

        let blended_return: f64 = starting_allocation
            .iter()
            .zip(&self.config.asset_classes)
            .map(|(alloc, asset)| alloc * asset.expected_return / 100.0)
            .sum();
        let investment_return = starting_value * blended_return;

        for (value, alloc) in self
            .state
            .asset_values
            .iter_mut()
            .zip(&starting_allocation)
        {
            *value += investment_return * alloc;
        }

        if net_cash_flow > 0.0 {
            let deposits =
                self.strategy
                    .handle_income(net_cash_flow, &self.state, &self.config, annual_expense);
            for (value, deposit) in self.state.asset_values.iter_mut().zip(&deposits) {
                *value += deposit;
            }
        } else if net_cash_flow < 0.0 {
            let withdrawals =
                self.strategy
                    .handle_expense(-net_cash_flow, &self.state, &self.config);
            for (value, withdrawal) in self.state.asset_values.iter_mut().zip(&withdrawals) {
                *value -= withdrawal;
            }
        }

        for value in &mut self.state.asset_values {
            *value = value.max(0.0);
        }

        if self.config.enable_rebalancing && self.should_rebalance() {
            self.rebalance();
        }

        YearlyPortfolioResult {
            starting_value,
            investment_return,
            ending_value: self.state.total_value(),
        }
    }

    fn should_rebalance(&self) -> bool {
        let current = self.state.allocation();
        let target = self.config.target_allocation();
        current
            .iter()
            .zip(&target)
            .any(|(c, t)| (c - t).abs() > REBALANCE_THRESHOLD)
    }

    /// Costless trades moving every asset to `total * target`.
    fn rebalance(&mut self) {
        let total = self.state.total_value();
        if total <= 0.0 {
            return;
        }
        for (value, weight) in self
            .state
            .asset_values
            .iter_mut()
            .zip(self.config.target_allocation())
        {
            *value = total * weight;
        }
    }
}
