//! Liquidity-aware cash-flow dispatch
//!
//! Income tops up a cash buffer held in the HIGH-liquidity tier before the
//! remainder is invested; expenses drain HIGH, then MEDIUM, then LOW, and
//! within a tier the lowest-expected-return asset goes first.

use crate::model::{LiquidityLevel, PortfolioConfiguration};
use crate::portfolio::PortfolioState;

/// Strategy seam: maps a year's net cash flow to per-asset deposits or
/// withdrawals. Amounts in the returned vector are aligned with the
/// configuration's asset order and are always non-negative.
pub trait CashFlowStrategy {
    fn handle_income(
        &self,
        income: f64,
        state: &PortfolioState,
        config: &PortfolioConfiguration,
        annual_expense: f64,
    ) -> Vec<f64>;

    fn handle_expense(
        &self,
        expense: f64,
        state: &PortfolioState,
        config: &PortfolioConfiguration,
    ) -> Vec<f64>;
}

const DEFAULT_CASH_BUFFER_MONTHS: f64 = 3.0;

/// The default (and currently only) strategy.
#[derive(Debug, Clone)]
pub struct LiquidityAwareStrategy {
    /// Months of annual expenses to keep in the HIGH-liquidity tier.
    pub cash_buffer_months: f64,
}

impl Default for LiquidityAwareStrategy {
    fn default() -> Self {
        Self {
            cash_buffer_months: DEFAULT_CASH_BUFFER_MONTHS,
        }
    }
}

impl LiquidityAwareStrategy {
    fn tier_indices(config: &PortfolioConfiguration, tier: LiquidityLevel) -> Vec<usize> {
        config
            .asset_classes
            .iter()
            .enumerate()
            .filter(|(_, a)| a.liquidity() == tier)
            .map(|(i, _)| i)
            .collect()
    }
}

impl CashFlowStrategy for LiquidityAwareStrategy {
    /// Buffer top-up first, then the remainder is spread across non-HIGH
    /// assets in proportion to their renormalized target weights.
    fn handle_income(
        &self,
        income: f64,
        state: &PortfolioState,
        config: &PortfolioConfiguration,
        annual_expense: f64,
    ) -> Vec<f64> {
        let n = config.asset_classes.len();
        let mut deposits = vec![0.0; n];
        if income <= 0.0 {
            return deposits;
        }

        let high = Self::tier_indices(config, LiquidityLevel::High);
        let mut remaining = income;

        if let Some(&buffer_idx) = high.first() {
            let required_buffer = annual_expense * self.cash_buffer_months / 12.0;
            let current_high: f64 = high.iter().map(|&i| state.asset_values[i]).sum();
            let shortfall = (required_buffer - current_high).max(0.0);
            let to_buffer = remaining.min(shortfall);
            deposits[buffer_idx] += to_buffer;
            remaining -= to_buffer;
        }

        if remaining <= 0.0 {
            return deposits;
        }

        let target = config.target_allocation();
        let non_high: Vec<usize> = (0..n).filter(|i| !high.contains(i)).collect();
        let weight_sum: f64 = non_high.iter().map(|&i| target[i]).sum();

        if weight_sum > 0.0 {
            for &i in &non_high {
                deposits[i] += remaining * target[i] / weight_sum;
            }
        } else if let Some(&buffer_idx) = high.first() {
            // All-HIGH portfolio: nothing else to invest into
            deposits[buffer_idx] += remaining;
        }

        deposits
    }

    /// Drain HIGH -> MEDIUM -> LOW; lowest expected return first within a
    /// tier. Any uncovered remainder is the caller's shortfall.
    fn handle_expense(
        &self,
        expense: f64,
        state: &PortfolioState,
        config: &PortfolioConfiguration,
    ) -> Vec<f64> {
        let n = config.asset_classes.len();
        let mut withdrawals = vec![0.0; n];
        let mut remaining = expense;

        for tier in [
            LiquidityLevel::High,
            LiquidityLevel::Medium,
            LiquidityLevel::Low,
        ] {
            if remaining <= 0.0 {
                break;
            }
            let mut indices = Self::tier_indices(config, tier);
            indices.sort_by(|&a, &b| {
                config.asset_classes[a]
                    .expected_return
                    .partial_cmp(&config.asset_classes[b].expected_return)
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            for i in indices {
                if remaining <= 0.0 {
                    break;
                }
                let take = remaining.min(state.asset_values[i].max(0.0));
                withdrawals[i] += take;
                remaining -= take;
            }
        }

        withdrawals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssetClass;
    use approx::assert_relative_eq;

    fn config() -> PortfolioConfiguration {
        PortfolioConfiguration {
            asset_classes: vec![
                AssetClass::new("Stocks", 70.0, 7.0),
                AssetClass::new("Bonds", 20.0, 3.0),
                AssetClass::new("Cash", 10.0, 1.0),
            ],
            enable_rebalancing: true,
        }
    }

    #[test]
    fn test_income_tops_up_buffer_before_investing() {
        let cfg = config();
        let state = PortfolioState::new(vec![0.0, 0.0, 0.0]);
        let strategy = LiquidityAwareStrategy::default();

        // Buffer requirement: 40_000 * 3 / 12 = 10_000
        let deposits = strategy.handle_income(50_000.0, &state, &cfg, 40_000.0);
        assert_relative_eq!(deposits[2], 10_000.0);
        // Remainder 40_000 split 70/20 renormalized to 7/9 and 2/9
        assert_relative_eq!(deposits[0], 40_000.0 * 70.0 / 90.0, epsilon = 1e-6);
        assert_relative_eq!(deposits[1], 40_000.0 * 20.0 / 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_full_buffer_skips_top_up() {
        let cfg = config();
        let state = PortfolioState::new(vec![0.0, 0.0, 15_000.0]);
        let strategy = LiquidityAwareStrategy::default();

        let deposits = strategy.handle_income(9_000.0, &state, &cfg, 40_000.0);
        assert_relative_eq!(deposits[2], 0.0);
        assert_relative_eq!(deposits[0] + deposits[1], 9_000.0);
    }

    #[test]
    fn test_small_income_goes_entirely_to_buffer() {
        let cfg = config();
        let state = PortfolioState::new(vec![0.0, 0.0, 0.0]);
        let strategy = LiquidityAwareStrategy::default();

        let deposits = strategy.handle_income(4_000.0, &state, &cfg, 40_000.0);
        assert_relative_eq!(deposits[2], 4_000.0);
        assert_relative_eq!(deposits[0], 0.0);
        assert_relative_eq!(deposits[1], 0.0);
    }

    #[test]
    fn test_expense_drains_tiers_in_liquidity_order() {
        let cfg = config();
        let state = PortfolioState::new(vec![50_000.0, 30_000.0, 5_000.0]);
        let strategy = LiquidityAwareStrategy::default();

        // Cash (HIGH) first, then stocks (MEDIUM), bonds (LOW) untouched
        let withdrawals = strategy.handle_expense(20_000.0, &state, &cfg);
        assert_relative_eq!(withdrawals[2], 5_000.0);
        assert_relative_eq!(withdrawals[0], 15_000.0);
        assert_relative_eq!(withdrawals[1], 0.0);
    }

    #[test]
    fn test_expense_prefers_lowest_return_within_tier() {
        let cfg = PortfolioConfiguration {
            asset_classes: vec![
                AssetClass::new("Growth Stocks", 50.0, 8.0)
                    .with_liquidity(LiquidityLevel::Medium),
                AssetClass::new("Value Stocks", 50.0, 5.0).with_liquidity(LiquidityLevel::Medium),
            ],
            enable_rebalancing: false,
        };
        let state = PortfolioState::new(vec![10_000.0, 10_000.0]);
        let strategy = LiquidityAwareStrategy::default();

        let withdrawals = strategy.handle_expense(12_000.0, &state, &cfg);
        assert_relative_eq!(withdrawals[1], 10_000.0);
        assert_relative_eq!(withdrawals[0], 2_000.0);
    }

    #[test]
    fn test_depletion_leaves_shortfall_uncovered() {
        let cfg = config();
        let state = PortfolioState::new(vec![1_000.0, 500.0, 200.0]);
        let strategy = LiquidityAwareStrategy::default();

        let withdrawals = strategy.handle_expense(5_000.0, &state, &cfg);
        let covered: f64 = withdrawals.iter().sum();
        assert_relative_eq!(covered, 1_700.0);
    }
}
