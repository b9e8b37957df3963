use thiserror::Error;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("fixture file not found: {0}")]
    NotFound(std::path::PathBuf),

    #[error("fixture parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("duplicate case id: {0}")]
    DuplicateId(String),
}

/// An enum token (status, lane, carrier, ...) that did not match any variant.
#[derive(Debug, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseTokenError {
    pub kind: &'static str,
    pub value: String,
}
