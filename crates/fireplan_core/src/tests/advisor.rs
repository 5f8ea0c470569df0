//! Tests for the advisor: early/delayed retirement walks, bisection
//! searches, and cross-scenario consistency

use crate::advisor::Advisor;
use crate::model::{
    IncomeExpenseItem, PortfolioConfiguration, RecommendationKind, UserProfile,
};
use crate::projection::ProjectionTable;

use super::{TEST_YEAR, living_expenses, salary, test_profile};

fn advise(
    profile: &UserProfile,
    income: &[IncomeExpenseItem],
    expense: &[IncomeExpenseItem],
) -> Vec<crate::model::Recommendation> {
    let table = ProjectionTable::build(profile, income, expense, TEST_YEAR);
    let advisor = Advisor::new(profile, &table, income, TEST_YEAR);
    advisor.recommendations().unwrap()
}

#[test]
fn test_comfortable_plan_yields_single_early_retirement() {
    // 120k salary against 40k expenses with a 100k head start retires
    // well before the planned age of 50
    let profile = test_profile(34);
    let income = [salary(120_000.0, 34, 50)];
    let expense = [living_expenses(40_000.0, 34, 85)];

    let recommendations = advise(&profile, &income, &expense);

    assert_eq!(recommendations.len(), 1);
    let rec = &recommendations[0];
    assert!(rec.is_achievable);
    match rec.kind {
        RecommendationKind::EarlyRetirement { age, years } => {
            assert!(age < 50, "expected an age below 50, got {age}");
            assert!(age >= 34);
            assert_eq!(years, 50 - age);
        }
        ref other => panic!("expected early_retirement, got {other:?}"),
    }
    assert!(rec.monte_carlo_success_rate.is_some());
}

#[test]
fn test_underfunded_plan_yields_three_alternatives() {
    // 30k income against 55k expenses cannot work at any retirement age:
    // delay is flagged infeasible while the income and expense levers
    // still find workable settings
    let profile = test_profile(34);
    let income = [salary(30_000.0, 34, 50)];
    let expense = [living_expenses(55_000.0, 34, 85)];

    let recommendations = advise(&profile, &income, &expense);
    assert_eq!(recommendations.len(), 3);

    match recommendations[0].kind {
        RecommendationKind::DelayedRetirementNotFeasible { age } => assert_eq!(age, 65),
        ref other => panic!("expected delayed_retirement_not_feasible, got {other:?}"),
    }
    assert!(!recommendations[0].is_achievable);

    match recommendations[1].kind {
        RecommendationKind::IncreaseIncome {
            percentage,
            fire_age,
            additional_annual_income,
        } => {
            assert!(percentage > 0.0 && percentage <= 400.0);
            assert_eq!(fire_age, 50);
            assert!(additional_annual_income > 0.0);
        }
        ref other => panic!("expected increase_income, got {other:?}"),
    }
    assert!(recommendations[1].is_achievable);

    match recommendations[2].kind {
        RecommendationKind::ReduceExpenses {
            percentage,
            fire_age,
            annual_savings,
        } => {
            assert!(percentage > 0.0 && percentage <= 80.0);
            assert_eq!(fire_age, 50);
            assert!(annual_savings > 0.0);
        }
        ref other => panic!("expected reduce_expenses, got {other:?}"),
    }
    assert!(recommendations[2].is_achievable);
}

#[test]
fn test_truncation_probes_do_not_mutate_the_base_table() {
    let profile = test_profile(34);
    let income = [salary(120_000.0, 34, 50)];
    let expense = [living_expenses(40_000.0, 34, 85)];

    let table = ProjectionTable::build(&profile, &income, &expense, TEST_YEAR);
    let snapshot = table.clone();
    let advisor = Advisor::new(&profile, &table, &income, TEST_YEAR);
    advisor.recommendations().unwrap();

    assert_eq!(table, snapshot);
}

/// The earliest age found when walking down from a sustainable plan must
/// match the required delay found when walking up from the same plan with
/// the target moved to an unsustainably early age, because both walks probe
/// identical income columns.
#[test]
fn test_early_and_delayed_walks_agree_on_the_threshold_age() {
    let base_profile = UserProfile {
        birth_year: TEST_YEAR - 29,
        expected_fire_age: 55,
        legal_retirement_age: 65,
        life_expectancy: 85,
        current_net_worth: 0.0,
        inflation_rate: 3.0,
        safety_buffer_months: 6.0,
        bridge_discount_rate: 0.0,
        portfolio: PortfolioConfiguration::default(),
    };
    let expense = [living_expenses(24_000.0, 29, 85)];

    // Plan 1: salary runs to the planned FIRE age of 55
    let income_late = [salary(120_000.0, 29, 55).with_growth_rate(2.0)];
    let recs_late = advise(&base_profile, &income_late, &expense);
    let early_age = recs_late
        .iter()
        .find_map(|r| match r.kind {
            RecommendationKind::EarlyRetirement { age, .. } => Some(age),
            _ => None,
        })
        .expect("sustainable plan should yield an early-retirement age");

    // Plan 2: same finances, but the target (and salary end) moved to 35
    let mut early_profile = base_profile.clone();
    early_profile.expected_fire_age = 35;
    let income_early = [salary(120_000.0, 29, 35).with_growth_rate(2.0)];
    let recs_early = advise(&early_profile, &income_early, &expense);
    let delayed_age = recs_early
        .iter()
        .find_map(|r| match r.kind {
            RecommendationKind::DelayedRetirement { age, .. } => Some(age),
            _ => None,
        })
        .expect("too-early plan should yield a delayed-retirement age");

    assert!(
        (early_age - delayed_age).abs() <= 1,
        "walks disagree: earliest {early_age} vs required delay {delayed_age}"
    );
}
