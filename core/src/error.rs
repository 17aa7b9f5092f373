use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors surfaced by indexing and query parsing. Nothing is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl SearchError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SearchError::InvalidArgument(msg.into())
    }
}
