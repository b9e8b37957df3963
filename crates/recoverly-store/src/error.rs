use recoverly_core::{CaseStatus, EvidenceType, FixtureError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("case {id}: illegal transition {from} -> {to}")]
    IllegalTransition {
        id: String,
        from: CaseStatus,
        to: CaseStatus,
    },

    #[error("case {id}: missing evidence {}", join_types(.missing))]
    IncompleteEvidence {
        id: String,
        missing: Vec<EvidenceType>,
    },

    #[error("fixture error: {0}")]
    Fixture(#[from] FixtureError),

    #[error("config file not found: {0}")]
    ConfigNotFound(std::path::PathBuf),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("nothing to undo")]
    NothingToUndo,
}

fn join_types(types: &[EvidenceType]) -> String {
    types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
