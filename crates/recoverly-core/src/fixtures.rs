//! Demo case fixtures.
//!
//! The demo set ships inside the crate as JSON and is parsed on demand, so
//! every caller gets its own fresh copy; nothing is held in a global.

use std::collections::HashSet;
use std::path::Path;

use tracing::info;

use crate::case::Case;
use crate::error::FixtureError;

const DEMO_CASES_JSON: &str = include_str!("../data/cases.json");

/// The built-in demo cases, in fixture order.
pub fn demo_cases() -> Result<Vec<Case>, FixtureError> {
    parse_cases(DEMO_CASES_JSON)
}

/// Parse a JSON array of cases, rejecting duplicate ids.
pub fn parse_cases(json: &str) -> Result<Vec<Case>, FixtureError> {
    let cases: Vec<Case> = serde_json::from_str(json)?;
    let mut seen = HashSet::with_capacity(cases.len());
    for case in &cases {
        if !seen.insert(case.id.as_str()) {
            return Err(FixtureError::DuplicateId(case.id.clone()));
        }
    }
    Ok(cases)
}

/// Load cases from a JSON file on disk.
pub fn load_cases(path: &Path) -> Result<Vec<Case>, FixtureError> {
    if !path.exists() {
        return Err(FixtureError::NotFound(path.to_path_buf()));
    }
    let json = std::fs::read_to_string(path)?;
    let cases = parse_cases(&json)?;
    info!(count = cases.len(), path = %path.display(), "loaded case fixtures");
    Ok(cases)
}
