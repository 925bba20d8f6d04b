use std::{fmt, time::Duration};

use thiserror::Error;

/// Why a single candidate endpoint was rejected during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    #[error("not an absolute http(s) url: {0}")]
    InvalidUrl(String),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected status {0}")]
    Status(u16),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt {
    pub url: String,
    pub failure: ProbeFailure,
}

/// No candidate endpoint answered the reachability probe. Fatal for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectivityError {
    pub attempts: Vec<ProbeAttempt>,
}

impl std::error::Error for ConnectivityError {}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.attempts.is_empty() {
            return f.write_str("unable to connect to API: no endpoints configured");
        }
        write!(f, "unable to connect to any API endpoint (")?;
        for (index, attempt) in self.attempts.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", attempt.url, attempt.failure)?;
        }
        f.write_str(")")
    }
}

/// A data or filter-option request failed. Recoverable: the previous page stays
/// on screen and the next parameter change retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("request to {url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("response from {url} could not be decoded: {message}")]
    Decode { url: String, message: String },
    #[error("response from {url} has no pagination metadata")]
    MissingPagination { url: String },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            FetchError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}
