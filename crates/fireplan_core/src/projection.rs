//! Wide-format financial projection table
//!
//! The table holds one column per income/expense item over the age span
//! `current_age..=life_expectancy`. It is derived data: regenerated from
//! scratch whenever profile or items change, never edited in place.
//! Overrides are applied on a copy at read time so the base table stays
//! clean.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::model::{IncomeExpenseItem, ItemFrequency, Override, UserProfile};

/// One item's column: id, display name, and a value per age row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemColumn {
    pub id: String,
    pub name: String,
    pub values: Vec<f64>,
}

/// Which side of the ledger a column belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSide {
    Income,
    Expense,
}

/// One row of the narrow annual summary consumed by the engine.
///
/// Values are final computed figures: growth and inflation are already
/// applied, as are any overrides. The engine uses them directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualRow {
    pub age: i32,
    pub year: i32,
    pub total_income: f64,
    pub total_expense: f64,
}

impl AnnualRow {
    pub fn net_flow(&self) -> f64 {
        self.total_income - self.total_expense
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionTable {
    ages: Vec<i32>,
    years: Vec<i32>,
    income: Vec<ItemColumn>,
    expense: Vec<ItemColumn>,
    index: FxHashMap<String, (ColumnSide, usize)>,
}

impl ProjectionTable {
    /// Materialize the base table from validated inputs.
    ///
    /// Per item and age `a` with `k = a - start_age`:
    /// - one-time: the raw amount in the single row `a == start_age`;
    /// - recurring income: `annual_amount * (1 + growth/100)^k`;
    /// - recurring expense: `annual_amount * (1 + inflation/100)^k
    ///   * (1 + growth/100)^k`;
    /// - 0 everywhere else.
    pub fn build(
        profile: &UserProfile,
        income_items: &[IncomeExpenseItem],
        expense_items: &[IncomeExpenseItem],
        current_year: i32,
    ) -> Self {
        let current_age = profile.current_age(current_year);
        let ages: Vec<i32> = (current_age..=profile.life_expectancy).collect();
        let years: Vec<i32> = ages.iter().map(|a| current_year + (a - current_age)).collect();

        let income = income_items
            .iter()
            .map(|item| Self::build_column(item, &ages, None))
            .collect::<Vec<_>>();
        let expense = expense_items
            .iter()
            .map(|item| Self::build_column(item, &ages, Some(profile.inflation_rate)))
            .collect::<Vec<_>>();

        let mut index = FxHashMap::default();
        for (i, col) in income.iter().enumerate() {
            index.insert(col.id.clone(), (ColumnSide::Income, i));
        }
        for (i, col) in expense.iter().enumerate() {
            index.insert(col.id.clone(), (ColumnSide::Expense, i));
        }

        Self {
            ages,
            years,
            income,
            expense,
            index,
        }
    }

    fn build_column(
        item: &IncomeExpenseItem,
        ages: &[i32],
        inflation_rate: Option<f64>,
    ) -> ItemColumn {
        let growth = 1.0 + item.annual_growth_rate / 100.0;
        let inflation = 1.0 + inflation_rate.unwrap_or(0.0) / 100.0;

        let values = ages
            .iter()
            .map(|&age| match item.frequency {
                ItemFrequency::OneTime => {
                    if age == item.start_age {
                        item.after_tax_amount_per_period
                    } else {
                        0.0
                    }
                }
                ItemFrequency::Recurring => {
                    let end_age = item.end_age.unwrap_or(i32::MAX);
                    if age >= item.start_age && age <= end_age {
                        let k = age - item.start_age;
                        item.annual_amount() * growth.powi(k) * inflation.powi(k)
                    } else {
                        0.0
                    }
                }
            })
            .collect();

        ItemColumn {
            id: item.id.clone(),
            name: item.name.clone(),
            values,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ages.len()
    }

    pub fn ages(&self) -> &[i32] {
        &self.ages
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    pub fn income_columns(&self) -> &[ItemColumn] {
        &self.income
    }

    pub fn expense_columns(&self) -> &[ItemColumn] {
        &self.expense
    }

    fn age_index(&self, age: i32) -> Option<usize> {
        let first = *self.ages.first()?;
        if age < first || age > *self.ages.last()? {
            return None;
        }
        Some((age - first) as usize)
    }

    /// Read a single cell; `None` for an unknown item or out-of-range age.
    pub fn value(&self, age: i32, item_id: &str) -> Option<f64> {
        let &(side, col) = self.index.get(item_id)?;
        let row = self.age_index(age)?;
        let column = match side {
            ColumnSide::Income => &self.income[col],
            ColumnSide::Expense => &self.expense[col],
        };
        Some(column.values[row])
    }

    /// Pin a single cell. Returns false when the item or age is unknown.
    pub fn set_value(&mut self, age: i32, item_id: &str, value: f64) -> bool {
        let Some(&(side, col)) = self.index.get(item_id) else {
            return false;
        };
        let Some(row) = self.age_index(age) else {
            return false;
        };
        let column = match side {
            ColumnSide::Income => &mut self.income[col],
            ColumnSide::Expense => &mut self.expense[col],
        };
        column.values[row] = value;
        true
    }

    /// Copy of the table with overrides written into their cells. Overrides
    /// referencing unknown items or out-of-range ages are skipped.
    pub fn apply_overrides(&self, overrides: &[Override]) -> ProjectionTable {
        let mut table = self.clone();
        for o in overrides {
            table.set_value(o.age, &o.item_id, o.value);
        }
        table
    }

    /// Narrow-format summary: per-age row sums of each side.
    pub fn annual_summary(&self) -> Vec<AnnualRow> {
        (0..self.ages.len())
            .map(|row| AnnualRow {
                age: self.ages[row],
                year: self.years[row],
                total_income: self.income.iter().map(|c| c.values[row]).sum(),
                total_expense: self.expense.iter().map(|c| c.values[row]).sum(),
            })
            .collect()
    }
}
