//! Owning facade over the planning pipeline
//!
//! The planner holds profile, items, overrides, and settings, and exposes a
//! stage-agnostic API: call order is constrained only by data dependencies
//! (a projection needs a profile and items; a calculation needs a
//! projection). Each calculation consumes the current inputs and produces a
//! fresh result bundle; the engines only ever borrow.

use crate::advisor::Advisor;
use crate::config::{ConfigMetadata, PlannerConfigV1};
use crate::engine::{EngineInput, FireEngine};
use crate::error::{PreconditionError, Result};
use crate::model::{
    IncomeExpenseItem, Override, PlannerResults, SimulationSettings, UserProfile,
};
use crate::monte_carlo::{MonteCarloSimulator, ProgressCallback};
use crate::projection::ProjectionTable;

pub struct Planner {
    profile: Option<UserProfile>,
    income_items: Vec<IncomeExpenseItem>,
    expense_items: Vec<IncomeExpenseItem>,
    overrides: Vec<Override>,
    settings: SimulationSettings,
    projection: Option<ProjectionTable>,
    results: Option<PlannerResults>,
    monte_carlo_seed: Option<u64>,
    /// Unrecognized top-level config keys, carried so re-exports keep them.
    extra: serde_json::Map<String, serde_json::Value>,
    language: String,
    current_year: i32,
    created_at: jiff::Timestamp,
    updated_at: jiff::Timestamp,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new()
    }
}

impl Planner {
    pub fn new() -> Self {
        Self::with_current_year(jiff::Zoned::now().year() as i32)
    }

    /// Construct against a fixed calendar year; every age and projection
    /// derivation uses it, which keeps calculations reproducible.
    pub fn with_current_year(current_year: i32) -> Self {
        let now = jiff::Timestamp::now();
        Self {
            profile: None,
            income_items: Vec::new(),
            expense_items: Vec::new(),
            overrides: Vec::new(),
            settings: SimulationSettings::default(),
            projection: None,
            results: None,
            monte_carlo_seed: None,
            extra: serde_json::Map::new(),
            language: "en".to_string(),
            current_year,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a planner from an imported config, validating at the
    /// boundary.
    pub fn from_config(config: PlannerConfigV1) -> Result<Self> {
        Self::from_config_with_year(config, jiff::Zoned::now().year() as i32)
    }

    pub fn from_config_with_year(config: PlannerConfigV1, current_year: i32) -> Result<Self> {
        config.validate(current_year)?;
        let mut planner = Self::with_current_year(current_year);
        planner.language = config.metadata.language.clone();
        if let Some(created_at) = config.metadata.created_at {
            planner.created_at = created_at;
        }
        planner.profile = Some(config.profile);
        planner.income_items = config.income_items;
        planner.expense_items = config.expense_items;
        planner.overrides = config.overrides;
        planner.settings = config.simulation_settings;
        planner.extra = config.extra;
        planner.clean_invalid_overrides();
        Ok(planner)
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn profile(&self) -> Option<&UserProfile> {
        self.profile.as_ref()
    }

    pub fn income_items(&self) -> &[IncomeExpenseItem] {
        &self.income_items
    }

    pub fn expense_items(&self) -> &[IncomeExpenseItem] {
        &self.expense_items
    }

    pub fn overrides(&self) -> &[Override] {
        &self.overrides
    }

    pub fn simulation_settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn results(&self) -> Option<&PlannerResults> {
        self.results.as_ref()
    }

    /// Fix the Monte Carlo seed; `None` draws from OS entropy per run.
    pub fn set_monte_carlo_seed(&mut self, seed: Option<u64>) {
        self.monte_carlo_seed = seed;
    }

    /// Replace the profile. Invalidates the projection and any results, and
    /// drops overrides that fell outside the new age span.
    pub fn set_user_profile(&mut self, profile: UserProfile) -> Result<()> {
        profile.validate(self.current_year)?;
        self.profile = Some(profile);
        self.clean_invalid_overrides();
        self.invalidate_derived_state();
        Ok(())
    }

    pub fn set_simulation_settings(&mut self, settings: SimulationSettings) -> Result<()> {
        settings.validate()?;
        self.settings = settings;
        self.touch();
        Ok(())
    }

    /// Add an income stream and return its id.
    pub fn add_income_item(&mut self, item: IncomeExpenseItem) -> Result<String> {
        self.add_item(item, true)
    }

    /// Add an expense stream and return its id.
    pub fn add_expense_item(&mut self, item: IncomeExpenseItem) -> Result<String> {
        self.add_item(item, false)
    }

    fn add_item(&mut self, mut item: IncomeExpenseItem, is_income: bool) -> Result<String> {
        let profile = self.profile.as_ref().ok_or(PreconditionError::MissingProfile)?;
        item.is_income = is_income;
        item.validate(profile, self.current_year)?;
        if item.id.is_empty() {
            item.id = uuid::Uuid::new_v4().to_string();
        }
        let id = item.id.clone();
        if is_income {
            self.income_items.push(item);
        } else {
            self.expense_items.push(item);
        }
        self.invalidate_derived_state();
        Ok(id)
    }

    /// Remove an income stream by id, along with its overrides.
    pub fn remove_income_item(&mut self, item_id: &str) -> bool {
        let removed = Self::remove_item(&mut self.income_items, &mut self.overrides, item_id);
        if removed {
            self.invalidate_derived_state();
        }
        removed
    }

    /// Remove an expense stream by id, along with its overrides.
    pub fn remove_expense_item(&mut self, item_id: &str) -> bool {
        let removed = Self::remove_item(&mut self.expense_items, &mut self.overrides, item_id);
        if removed {
            self.invalidate_derived_state();
        }
        removed
    }

    fn remove_item(
        items: &mut Vec<IncomeExpenseItem>,
        overrides: &mut Vec<Override>,
        item_id: &str,
    ) -> bool {
        let before = items.len();
        items.retain(|item| item.id != item_id);
        if items.len() == before {
            return false;
        }
        overrides.retain(|o| o.item_id != item_id);
        true
    }

    /// Materialize the base projection table from the current inputs.
    pub fn generate_projection_table(&mut self) -> Result<&ProjectionTable> {
        if self.profile.is_none() {
            return Err(PreconditionError::MissingProfile.into());
        }
        if self.income_items.is_empty() || self.expense_items.is_empty() {
            return Err(PreconditionError::MissingItems.into());
        }
        self.clean_invalid_overrides();

        let profile = self.profile.as_ref().ok_or(PreconditionError::MissingProfile)?;
        let table = ProjectionTable::build(
            profile,
            &self.income_items,
            &self.expense_items,
            self.current_year,
        );
        self.touch();
        Ok(self.projection.insert(table))
    }

    /// The clean base table, without overrides.
    pub fn projection(&self) -> Option<&ProjectionTable> {
        self.projection.as_ref()
    }

    /// Copy of the table with overrides applied, for display and
    /// calculation.
    pub fn projection_with_overrides(&self) -> Option<ProjectionTable> {
        self.projection
            .as_ref()
            .map(|t| t.apply_overrides(&self.overrides))
    }

    /// Pin a cell; an existing override for the same `(age, item)` is
    /// replaced.
    pub fn add_override(&mut self, age: i32, item_id: &str, value: f64) -> Result<()> {
        if self.projection.is_none() {
            return Err(PreconditionError::MissingProjection.into());
        }
        self.overrides
            .retain(|o| !(o.age == age && o.item_id == item_id));
        self.overrides.push(Override {
            age,
            item_id: item_id.to_string(),
            value,
        });
        self.touch();
        Ok(())
    }

    pub fn remove_override(&mut self, age: i32, item_id: &str) -> bool {
        let before = self.overrides.len();
        self.overrides
            .retain(|o| !(o.age == age && o.item_id == item_id));
        let removed = self.overrides.len() < before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
        self.touch();
    }

    /// Run the full calculation: engine, Monte Carlo, advisor.
    ///
    /// The engine result is mandatory; a Monte Carlo or advisor failure
    /// degrades to an absent success rate or an empty recommendation list
    /// rather than failing the calculation.
    pub fn calculate_fire_results(
        &mut self,
        progress: Option<ProgressCallback<'_>>,
        num_simulations: Option<usize>,
    ) -> Result<PlannerResults> {
        let profile = self.profile.as_ref().ok_or(PreconditionError::MissingProfile)?;
        let projection = self
            .projection
            .as_ref()
            .ok_or(PreconditionError::MissingProjection)?;

        let table = projection.apply_overrides(&self.overrides);
        let rows = table.annual_summary();

        let mut engine = FireEngine::new(EngineInput {
            profile,
            rows: &rows,
        });
        let mut fire_calculation = engine.calculate()?;

        let mut settings = self.settings.clone();
        if let Some(n) = num_simulations {
            settings.num_simulations = n;
        }
        let simulator = MonteCarloSimulator::new(
            profile,
            &rows,
            settings,
            self.monte_carlo_seed,
            self.current_year,
        );
        let monte_carlo_success_rate = match progress {
            Some(callback) => simulator
                .run_simulation_with_progress(callback)
                .ok()
                .map(|r| r.success_rate),
            None => simulator.run_simulation().ok().map(|r| r.success_rate),
        };
        fire_calculation.fire_success_probability = monte_carlo_success_rate;

        let advisor = Advisor::new(profile, &table, &self.income_items, self.current_year);
        let recommendations = advisor.recommendations().unwrap_or_default();

        let results = PlannerResults {
            fire_calculation,
            monte_carlo_success_rate,
            recommendations,
            calculation_timestamp: jiff::Timestamp::now(),
        };
        self.results = Some(results.clone());
        self.touch();
        Ok(results)
    }

    /// Export the current inputs as a v1.0 config.
    pub fn export_config(&self, description: &str) -> Result<PlannerConfigV1> {
        let profile = self.profile.clone().ok_or(PreconditionError::MissingProfile)?;
        Ok(PlannerConfigV1 {
            version: crate::config::CONFIG_VERSION.to_string(),
            metadata: ConfigMetadata {
                created_at: Some(self.created_at),
                updated_at: Some(self.updated_at),
                language: self.language.clone(),
                description: description.to_string(),
            },
            profile,
            income_items: self.income_items.clone(),
            expense_items: self.expense_items.clone(),
            overrides: self.overrides.clone(),
            simulation_settings: self.settings.clone(),
            extra: self.extra.clone(),
        })
    }

    /// Drop overrides that reference a removed item or an age outside the
    /// projected span.
    fn clean_invalid_overrides(&mut self) {
        let Some(profile) = self.profile.as_ref() else {
            self.overrides.clear();
            return;
        };
        let current_age = profile.current_age(self.current_year);
        let life = profile.life_expectancy;
        let known = |id: &str| {
            self.income_items.iter().any(|i| i.id == id)
                || self.expense_items.iter().any(|i| i.id == id)
        };
        self.overrides
            .retain(|o| o.age >= current_age && o.age <= life && known(&o.item_id));
    }

    fn invalidate_derived_state(&mut self) {
        self.projection = None;
        self.results = None;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = jiff::Timestamp::now();
    }
}
