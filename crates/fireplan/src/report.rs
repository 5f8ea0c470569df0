//! Plain-text result rendering
//!
//! Prints the top-line verdict, a sampled yearly table, and the advisor's
//! recommendations. Recommendation type ids are printed as-is; translation
//! is a concern for richer front-ends.

use fireplan_core::model::{PlannerResults, Recommendation, RecommendationKind};

pub fn print_summary(results: &PlannerResults) {
    let fire = &results.fire_calculation;

    println!();
    println!("=== FIRE Plan Summary ===");
    println!(
        "Plan sustainable:        {}",
        if fire.is_fire_achievable { "yes" } else { "no" }
    );
    println!("Net worth at FIRE age:   {:>14.0}", fire.fire_net_worth);
    println!(
        "Minimum after FIRE age:  {:>14.0}",
        fire.min_net_worth_after_fire
    );
    println!("Final net worth:         {:>14.0}", fire.final_net_worth);
    println!(
        "Min safety-buffer ratio: {:>14.2}",
        fire.min_safety_buffer_ratio
    );
    println!(
        "Traditional FIRE number: {:>14.0} ({})",
        fire.traditional_fire_number,
        if fire.traditional_fire_achieved {
            "reached"
        } else {
            "not reached"
        }
    );
    if let Some(rate) = results.monte_carlo_success_rate {
        println!("Monte Carlo success:     {:>13.1}%", rate * 100.0);
    } else {
        println!("Monte Carlo success:     unavailable");
    }

    println!();
    println!("  age   year        income       expense     net worth  ok");
    let stride = (fire.yearly_results.len() / 12).max(1);
    for (i, state) in fire.yearly_results.iter().enumerate() {
        if i % stride != 0 && i != fire.yearly_results.len() - 1 {
            continue;
        }
        println!(
            "  {:>3}  {:>5}  {:>12.0}  {:>12.0}  {:>12.0}  {}",
            state.age,
            state.year,
            state.total_income,
            state.total_expense,
            state.net_worth,
            if state.is_sustainable { "+" } else { "-" }
        );
    }

    if !results.recommendations.is_empty() {
        println!();
        println!("=== Recommendations ===");
        for rec in &results.recommendations {
            println!("  {}", render_recommendation(rec));
        }
    }
}

fn render_recommendation(rec: &Recommendation) -> String {
    let mut line = match &rec.kind {
        RecommendationKind::EarlyRetirement { age, years } => {
            format!("early_retirement: retire at {age} ({years} year(s) earlier)")
        }
        RecommendationKind::DelayedRetirement { age, years } => {
            format!("delayed_retirement: retire at {age} ({years} year(s) later)")
        }
        RecommendationKind::DelayedRetirementNotFeasible { age } => {
            format!("delayed_retirement_not_feasible: even age {age} does not sustain the plan")
        }
        RecommendationKind::IncreaseIncome {
            percentage,
            fire_age,
            additional_annual_income,
        } => format!(
            "increase_income: +{percentage:.1}% ({additional_annual_income:.0}/year) to retire at {fire_age}"
        ),
        RecommendationKind::ReduceExpenses {
            percentage,
            fire_age,
            annual_savings,
        } => format!(
            "reduce_expenses: -{percentage:.1}% ({annual_savings:.0}/year) to retire at {fire_age}"
        ),
    };
    if let Some(rate) = rec.monte_carlo_success_rate {
        line.push_str(&format!(" [success rate {:.1}%]", rate * 100.0));
    }
    line
}
