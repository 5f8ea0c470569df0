//! Error types for the planning core
//!
//! Validation errors are raised at the boundary (config import, profile and
//! item mutation) and are the only errors that abort a calculation. Anything
//! the simulation itself produces — depletion, negative net worth, a failed
//! plan — is a result, not an error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Invalid input rejected at a mutation or import boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error(
        "ages must follow progression: current_age({current}) <= expected_fire_age({fire}) \
         <= legal_retirement_age({retirement}) <= life_expectancy({life})"
    )]
    AgeProgression {
        current: i32,
        fire: i32,
        retirement: i32,
        life: i32,
    },
    #[error("birth_year {0} out of range (1950..={1})")]
    BirthYearOutOfRange(i32, i32),
    #[error("asset allocations sum to {0}%, expected 100%")]
    AllocationSum(f64),
    #[error("allocation percentage {0}% for '{1}' out of range 0..=100")]
    AllocationOutOfRange(f64, String),
    #[error("duplicate asset class name '{0}'")]
    DuplicateAssetName(String),
    #[error("portfolio has no asset classes")]
    EmptyPortfolio,
    #[error("item '{0}': interval_periods must be positive")]
    NonPositiveInterval(String),
    #[error("item '{0}': start_age {1} is before current age {2}")]
    StartBeforeCurrentAge(String, i32, i32),
    #[error("item '{0}': end_age {1} is before start_age {2}")]
    EndBeforeStart(String, i32, i32),
    #[error("item '{0}': recurring items require an end_age")]
    MissingEndAge(String),
    #[error("item '{0}': end_age {1} is past life expectancy {2}")]
    EndPastLifeExpectancy(String, i32, i32),
    #[error("confidence_level {0} out of range 0.5..=0.99")]
    ConfidenceLevelOutOfRange(f64),
    #[error("num_simulations must be positive")]
    NoSimulations,
    #[error("volatility must be a finite non-negative number, got {0}")]
    InvalidVolatility(f64),
    #[error("unsupported config version '{0}', expected '1.0'")]
    UnknownConfigVersion(String),
    #[error("unknown sensitivity parameter '{0}'")]
    UnknownSensitivityParameter(String),
}

/// An operation was called before its inputs were supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PreconditionError {
    #[error("no user profile set")]
    MissingProfile,
    #[error("no projection table generated")]
    MissingProjection,
    #[error("projection table has no rows")]
    EmptyProjection,
    #[error("at least one income and one expense item required")]
    MissingItems,
}

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
