//! Endpoint discovery and the session bound to the endpoint that answered.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde::Serialize;
use shared::protocol::{PageSizeOnlyQuery, PerformancePageResponse, PerformanceQuery};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::{
    error::{ConnectivityError, FetchError, ProbeAttempt, ProbeFailure},
    records::normalize_all,
    FetchedPage, PerformanceRecord, PerformanceSource,
};

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_PAGE_SIZE: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    pub probe_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Probes candidate endpoints in order and binds a session to the first one
/// that answers. Each candidate gets exactly one probe.
pub struct EndpointResolver {
    http: Client,
    options: ResolverOptions,
}

impl EndpointResolver {
    pub fn new(options: ResolverOptions) -> Self {
        Self {
            http: Client::new(),
            options,
        }
    }

    pub async fn resolve<S: AsRef<str>>(
        &self,
        candidates: &[S],
    ) -> Result<ApiSession, ConnectivityError> {
        let mut attempts = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let candidate = candidate.as_ref();
            info!(url = candidate, "attempting to connect to api");
            match self.probe(candidate).await {
                Ok(endpoint) => {
                    info!(url = %endpoint, "connected to api");
                    return Ok(ApiSession::new(
                        self.http.clone(),
                        endpoint,
                        self.options.request_timeout,
                    ));
                }
                Err(failure) => {
                    warn!(url = candidate, %failure, "failed to connect to api");
                    attempts.push(ProbeAttempt {
                        url: candidate.to_string(),
                        failure,
                    });
                }
            }
        }

        let err = ConnectivityError { attempts };
        error!(error = %err, "no api endpoint reachable");
        Err(err)
    }

    async fn probe(&self, candidate: &str) -> Result<Url, ProbeFailure> {
        let endpoint = parse_endpoint(candidate)?;
        let timeout = self.options.probe_timeout;

        let response = self
            .http
            .get(endpoint.clone())
            .header(ACCEPT, "application/json")
            .query(&PageSizeOnlyQuery {
                page_size: PROBE_PAGE_SIZE,
            })
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ProbeFailure::Timeout(timeout)
                } else {
                    ProbeFailure::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        debug!(url = candidate, status = status.as_u16(), "probe answered");
        if status.is_success() {
            Ok(endpoint)
        } else {
            Err(ProbeFailure::Status(status.as_u16()))
        }
    }
}

pub fn parse_endpoint(candidate: &str) -> Result<Url, ProbeFailure> {
    Url::parse(candidate.trim())
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .ok_or_else(|| ProbeFailure::InvalidUrl(candidate.to_string()))
}

/// The active endpoint for the rest of the session. Only the resolver builds
/// one from discovery; the endpoint cannot change afterwards.
#[derive(Debug, Clone)]
pub struct ApiSession {
    http: Client,
    endpoint: Url,
    request_timeout: Duration,
}

impl ApiSession {
    pub fn new(http: Client, endpoint: Url, request_timeout: Duration) -> Self {
        Self {
            http,
            endpoint,
            request_timeout,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn get_page<Q: Serialize + ?Sized + Sync>(
        &self,
        query: &Q,
    ) -> Result<PerformancePageResponse, FetchError> {
        let url = self.endpoint.as_str();
        let response = self
            .http
            .get(self.endpoint.clone())
            .header(ACCEPT, "application/json")
            .query(query)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| FetchError::from_reqwest(url, err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<PerformancePageResponse>()
            .await
            .map_err(|err| FetchError::Decode {
                url: url.to_string(),
                message: err.to_string(),
            })
    }
}

#[async_trait]
impl PerformanceSource for ApiSession {
    async fn fetch_page(&self, query: &PerformanceQuery) -> Result<FetchedPage, FetchError> {
        let body = self.get_page(query).await?;
        let pagination = body.pagination.ok_or_else(|| FetchError::MissingPagination {
            url: self.endpoint.to_string(),
        })?;
        Ok(FetchedPage {
            records: normalize_all(body.data),
            pagination,
        })
    }

    async fn fetch_sample(&self, sample_size: u32) -> Result<Vec<PerformanceRecord>, FetchError> {
        let body = self
            .get_page(&PageSizeOnlyQuery {
                page_size: sample_size,
            })
            .await?;
        Ok(normalize_all(body.data))
    }
}

#[cfg(test)]
#[path = "tests/endpoint_tests.rs"]
mod tests;
