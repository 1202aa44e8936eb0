use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("No head component found for {0}")]
    ComponentNotFound(String),

    /// A start marker without a terminator is markup corruption, not a
    /// runtime condition to recover from.
    #[error("Malformed head region for {0}: missing terminator")]
    MalformedRegion(String),

    #[error("No list found in head for path {0}")]
    ListNotFound(String),
}
