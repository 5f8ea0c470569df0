//! Integration tests for the planning core
//!
//! Tests are organized by topic:
//! - `projection` - Table accrual math, overrides, summaries
//! - `portfolio` - Allocation precision, return accrual, rebalancing
//! - `engine` - Yearly states, debt tracking, result aggregates
//! - `monte_carlo` - Variation, event scheduling, seeded determinism
//! - `advisor` - Age walks, bisection searches, consistency
//! - `planner` - Facade API, preconditions, config round-trips

mod advisor;
mod engine;

use crate::model::{
    AssetClass, IncomeExpenseItem, PortfolioConfiguration, UserProfile,
};

/// Fixed calendar year so ages derived from birth years are stable.
pub(crate) const TEST_YEAR: i32 = 2026;

/// Profile aged `current_age` in [`TEST_YEAR`] with a 70/20/10
/// stocks/bonds/cash portfolio at 7%/3%/1% expected returns.
pub(crate) fn test_profile(current_age: i32) -> UserProfile {
    UserProfile {
        birth_year: TEST_YEAR - current_age,
        expected_fire_age: 50,
        legal_retirement_age: 65,
        life_expectancy: 85,
        current_net_worth: 100_000.0,
        inflation_rate: 3.0,
        safety_buffer_months: 12.0,
        bridge_discount_rate: 0.0,
        portfolio: growth_portfolio(),
    }
}

pub(crate) fn growth_portfolio() -> PortfolioConfiguration {
    PortfolioConfiguration {
        asset_classes: vec![
            AssetClass::new("Stocks", 70.0, 7.0).with_volatility(15.0),
            AssetClass::new("Bonds", 20.0, 3.0).with_volatility(5.0),
            AssetClass::new("Cash", 10.0, 1.0).with_volatility(1.0),
        ],
        enable_rebalancing: true,
    }
}

pub(crate) fn salary(amount: f64, start_age: i32, end_age: i32) -> IncomeExpenseItem {
    IncomeExpenseItem::recurring("Salary", amount, start_age, end_age, true)
}

pub(crate) fn living_expenses(amount: f64, start_age: i32, end_age: i32) -> IncomeExpenseItem {
    IncomeExpenseItem::recurring("Living", amount, start_age, end_age, false)
}
