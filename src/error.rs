use thiserror::Error;

/// A listing page that could not be retrieved. The pipeline skips the page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid page target {target}: {source}")]
    Target {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {target} failed: {source}")]
    Transport {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{target} returned HTTP {status}")]
    Status {
        target: String,
        status: reqwest::StatusCode,
    },
}

/// A single listing entry that cannot become a record. The pipeline skips
/// the entry and keeps its siblings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ItemError {
    #[error("entry has no title")]
    MissingTitle,
    #[error("entry has no product link")]
    MissingLink,
    #[error("product link has no href")]
    MissingHref,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("failed to flush {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Terminal outcomes of one invocation other than success.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("No products found")]
    NoRecords,
    #[error("{0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<SinkError> for ServiceError {
    fn from(err: SinkError) -> Self {
        ServiceError::Internal(err.into())
    }
}
