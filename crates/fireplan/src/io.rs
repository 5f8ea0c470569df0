//! Config and result file I/O
//!
//! All file access for the planner lives here; the core stays free of I/O.
//! Result files contain the exported input config plus a `results` object,
//! so a saved run can be re-imported as a plain config.

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;

use fireplan_core::PlannerConfigV1;
use fireplan_core::model::PlannerResults;

/// Plan used when no config path is given on the command line.
pub const EXAMPLE_CONFIG: &str = include_str!("../data/example_config.json");

pub fn load_config(path: &Path) -> Result<PlannerConfigV1> {
    let json = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config {}", path.display()))?;
    PlannerConfigV1::from_json_str(&json)
        .wrap_err_with(|| format!("failed to parse config {}", path.display()))
}

/// The persisted result document: input config flattened at the top level,
/// calculation output under `results`.
#[derive(Debug, Serialize)]
pub struct ResultDocument {
    #[serde(flatten)]
    pub config: PlannerConfigV1,
    pub results: PlannerResults,
}

pub fn write_results(path: &Path, document: &ResultDocument) -> Result<()> {
    let json = serde_json::to_string_pretty(document)?;
    std::fs::write(path, json)
        .wrap_err_with(|| format!("failed to write results to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_example_parses_and_validates() {
        let config = PlannerConfigV1::from_json_str(EXAMPLE_CONFIG).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.income_items.len(), 2);
        assert_eq!(config.expense_items.len(), 3);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(&path, EXAMPLE_CONFIG).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.profile.birth_year, 1998);
    }

    #[test]
    fn test_missing_config_reports_path() {
        let err = load_config(Path::new("/no/such/plan.json")).unwrap_err();
        assert!(err.to_string().contains("/no/such/plan.json"));
    }
}
