//! Tests for the deterministic FIRE engine

use approx::assert_relative_eq;

use crate::engine::{EngineInput, FireEngine};
use crate::error::PreconditionError;
use crate::projection::{AnnualRow, ProjectionTable};

use super::{TEST_YEAR, living_expenses, salary, test_profile};

fn rows_for(income: f64, expense: f64, profile: &crate::model::UserProfile) -> Vec<AnnualRow> {
    let current_age = profile.current_age(TEST_YEAR);
    let income_items = [salary(income, current_age, profile.expected_fire_age)];
    let expense_items = [living_expenses(expense, current_age, profile.life_expectancy)];
    ProjectionTable::build(profile, &income_items, &expense_items, TEST_YEAR).annual_summary()
}

#[test]
fn test_empty_projection_is_a_precondition_error() {
    let profile = test_profile(34);
    let mut engine = FireEngine::new(EngineInput {
        profile: &profile,
        rows: &[],
    });
    assert!(matches!(
        engine.calculate(),
        Err(PreconditionError::EmptyProjection)
    ));
}

#[test]
fn test_yearly_state_identities() {
    let profile = test_profile(34);
    let rows = rows_for(120_000.0, 40_000.0, &profile);
    let mut engine = FireEngine::new(EngineInput {
        profile: &profile,
        rows: &rows,
    });
    let result = engine.calculate().unwrap();

    assert_eq!(result.yearly_results.len(), rows.len());
    for state in &result.yearly_results {
        assert_relative_eq!(
            state.net_cash_flow,
            state.total_income - state.total_expense
        );
        if state.portfolio_value > 0.0 {
            assert_relative_eq!(state.net_worth, state.portfolio_value);
        } else {
            assert!(state.net_worth <= 0.0);
        }
        assert_relative_eq!(state.fire_number, state.total_expense * 25.0);
    }

    let all_sustainable = result.yearly_results.iter().all(|s| s.is_sustainable);
    assert_eq!(result.is_fire_achievable, all_sustainable);
}

#[test]
fn test_depletion_accumulates_debt_as_negative_net_worth() {
    let mut profile = test_profile(34);
    profile.current_net_worth = 0.0;
    profile.inflation_rate = 0.0;

    let current_age = profile.current_age(TEST_YEAR);
    let expense_items = [living_expenses(10_000.0, current_age, profile.life_expectancy)];
    let rows = ProjectionTable::build(&profile, &[], &expense_items, TEST_YEAR).annual_summary();

    let mut engine = FireEngine::new(EngineInput {
        profile: &profile,
        rows: &rows,
    });
    let result = engine.calculate().unwrap();

    // No income, no portfolio: every year adds 10k of unfunded shortfall
    assert!(!result.is_fire_achievable);
    assert_relative_eq!(result.yearly_results[0].net_worth, -10_000.0);
    assert_relative_eq!(result.yearly_results[1].net_worth, -20_000.0);
    assert_relative_eq!(result.final_net_worth, -10_000.0 * rows.len() as f64);
}

#[test]
fn test_aggregates_cover_post_fire_span() {
    let profile = test_profile(34);
    let rows = rows_for(120_000.0, 40_000.0, &profile);
    let mut engine = FireEngine::new(EngineInput {
        profile: &profile,
        rows: &rows,
    });
    let result = engine.calculate().unwrap();

    let fire_index = (profile.expected_fire_age - 34) as usize;
    let expected_min = result.yearly_results[fire_index..]
        .iter()
        .map(|s| s.net_worth)
        .fold(f64::INFINITY, f64::min);
    assert_relative_eq!(result.min_net_worth_after_fire, expected_min);
    assert_relative_eq!(
        result.fire_net_worth,
        result.yearly_results[fire_index].net_worth
    );
    assert_eq!(result.retirement_years, rows.len() - fire_index);
    assert_eq!(result.total_years_simulated, rows.len());
}

#[test]
fn test_traditional_fire_uses_first_five_year_mean() {
    let profile = test_profile(34);
    let rows = rows_for(120_000.0, 40_000.0, &profile);
    let mut engine = FireEngine::new(EngineInput {
        profile: &profile,
        rows: &rows,
    });
    let result = engine.calculate().unwrap();

    let mean: f64 = rows[..5].iter().map(|r| r.total_expense).sum::<f64>() / 5.0;
    assert_relative_eq!(result.traditional_fire_number, mean * 25.0);

    let expected = result
        .yearly_results
        .iter()
        .any(|s| s.portfolio_value >= result.traditional_fire_number);
    assert_eq!(result.traditional_fire_achieved, expected);
}

#[test]
fn test_zero_traditional_target_is_trivially_reached() {
    let profile = test_profile(34);

    // Income-only plan: a five-year mean of zero expenses gives a zero
    // target, and any non-negative portfolio value reaches it
    let rows: Vec<AnnualRow> = (0..6)
        .map(|i| AnnualRow {
            age: 34 + i,
            year: TEST_YEAR + i,
            total_income: 10_000.0,
            total_expense: 0.0,
        })
        .collect();
    let mut engine = FireEngine::new(EngineInput {
        profile: &profile,
        rows: &rows,
    });
    let result = engine.calculate().unwrap();
    assert_relative_eq!(result.traditional_fire_number, 0.0);
    assert!(result.traditional_fire_achieved);

    // Same for a projection too short to have a five-year mean at all
    let short_rows = &rows[..3];
    let mut engine = FireEngine::new(EngineInput {
        profile: &profile,
        rows: short_rows,
    });
    let result = engine.calculate().unwrap();
    assert_relative_eq!(result.traditional_fire_number, 0.0);
    assert!(result.traditional_fire_achieved);
}

#[test]
fn test_larger_safety_buffer_never_helps() {
    // A marginal plan: achievability must be monotonically non-increasing
    // in the required buffer size
    let mut previous = true;
    for months in [0.0, 6.0, 12.0, 24.0, 60.0] {
        let mut profile = test_profile(34);
        profile.current_net_worth = 20_000.0;
        profile.safety_buffer_months = months;

        let rows = rows_for(48_000.0, 40_000.0, &profile);
        let mut engine = FireEngine::new(EngineInput {
            profile: &profile,
            rows: &rows,
        });
        let achievable = engine.calculate().unwrap().is_fire_achievable;

        assert!(
            previous || !achievable,
            "plan became achievable when buffer grew to {months} months"
        );
        previous = achievable;
    }
}
