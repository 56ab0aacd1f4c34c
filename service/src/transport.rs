//! Service transport abstractions.
//!
//! The [`ProofreadService`] trait enables dependency injection for testing,
//! allowing both the real HTTP transport ([`HttpService`]) and the mock
//! ([`MockService`](crate::test::MockService)) to be used interchangeably.

use crate::request::ProofreadRequest;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors surfaced by a proofreading transport.
///
/// The core reports every variant to its host as a single "service unavailable"
/// condition; the variants exist for logging.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request never produced a response
    #[error("Request to {endpoint} failed: {source}")]
    Request {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status
    #[error("Service at {endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The body was not a readable proofreading response
    #[error("Malformed service response: {message}")]
    MalformedBody { message: String },

    /// The service refused or could not be reached for another reason
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Abstraction over the proofreading backend.
///
/// Implementations return the raw XML body; parsing belongs to the core.
/// Nothing here retries, retry policy belongs to the host.
#[async_trait]
pub trait ProofreadService: Send + Sync {
    /// Send one request and wait for the response body.
    async fn check(&self, request: &ProofreadRequest) -> Result<String, ServiceError>;
}

/// Production transport posting form-encoded requests over HTTP.
#[derive(Clone)]
pub struct HttpService {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpService {
    /// Create a transport for `endpoint`.
    ///
    /// A zero timeout is raised to one millisecond.
    pub fn new(
        endpoint: impl Into<String>,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout.max(Duration::from_millis(1)))
            .build()
            .map_err(ServiceError::Client)?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ProofreadService for HttpService {
    async fn check(&self, request: &ProofreadRequest) -> Result<String, ServiceError> {
        debug!(
            endpoint = %self.endpoint,
            language = %request.language,
            text_len = request.text.len(),
            "sending proofreading request"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .form(&request.form())
            .send()
            .await
            .map_err(|source| ServiceError::Request {
                endpoint: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %self.endpoint, %status, "proofreading service rejected request");
            return Err(ServiceError::Status {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| ServiceError::Request {
            endpoint: self.endpoint.clone(),
            source,
        })
    }
}
