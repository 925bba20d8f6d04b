use thiserror::Error;

/// Rejections raised while turning user input into query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("unknown sort field '{0}'")]
    UnknownSortField(String),
    #[error("unknown sort direction '{0}', expected 'asc' or 'desc'")]
    UnknownSortDirection(String),
    #[error("page size {0} is not supported (expected one of 5, 10, 25, 50)")]
    UnsupportedPageSize(u32),
    #[error("'{0}' is not a page size")]
    InvalidPageSize(String),
    #[error("'{0}' is not a valid filter id")]
    InvalidId(String),
}
