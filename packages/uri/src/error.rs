use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("Expected uri (no protocol or port), got: {0}")]
    ExpectedUri(String),

    #[error("Expected url (with protocol), got: {0}")]
    ExpectedUrl(String),

    #[error("Not a component reference: {0}")]
    NotAComponent(String),

    #[error("Invalid encoded uri: {0}")]
    InvalidEncoding(String),
}
