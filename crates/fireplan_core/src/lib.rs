//! FIRE planning and simulation library
//!
//! This crate projects a household's lifetime cash flows and decides whether
//! a Financial-Independence / Retire-Early plan holds up. It provides:
//! - A year-by-year projection builder with per-item growth and inflation
//! - A liquidity-tiered portfolio simulator with optional rebalancing
//! - A deterministic FIRE engine with cumulative-debt tracking
//! - A Monte Carlo engine layering income/expense variation and a library
//!   of parameterized black-swan events
//! - An advisor that searches retirement age, income, and expense levers
//!   for the smallest change that flips sustainability
//!
//! The [`planner::Planner`] type ties the pieces together and owns all
//! mutable state; the engines only ever borrow their inputs.
//!
//! ```ignore
//! use fireplan_core::planner::Planner;
//!
//! let mut planner = Planner::new();
//! planner.set_user_profile(profile)?;
//! planner.add_income_item(salary)?;
//! planner.add_expense_item(living)?;
//! planner.generate_projection_table()?;
//! let results = planner.calculate_fire_results(None, None)?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod advisor;
pub mod engine;
pub mod error;
pub mod events;
pub mod monte_carlo;
pub mod planner;
pub mod portfolio;
pub mod projection;
pub mod stats;
pub mod strategy;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use config::PlannerConfigV1;
pub use error::{PlannerError, PreconditionError, ValidationError};
pub use planner::Planner;
