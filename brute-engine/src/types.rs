//! Core data types for the attack engine

use crate::error::{AttackError, AttackResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hard cap on concurrent workers regardless of the configured rate.
pub const MAX_WORKERS: usize = 10;

/// Immutable configuration for a single attack run.
///
/// Created once per invocation and never mutated afterwards. Line numbers are
/// 1-based and count non-blank wordlist entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackRequest {
    pub target_url: String,
    pub start_line: usize,
    pub end_line: Option<usize>,
    pub requests_per_second: u32,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    /// Total physical attempts per candidate. A value of 0 still yields one
    /// attempt; see `total_attempts`.
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl AttackRequest {
    /// Create a request with the default pacing and timeout settings.
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            start_line: 1,
            end_line: None,
            requests_per_second: 5,
            connect_timeout_secs: 30,
            read_timeout_secs: 60,
            write_timeout_secs: 30,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }

    /// Restrict the attack to an inclusive line range.
    pub fn with_range(mut self, start_line: usize, end_line: Option<usize>) -> Self {
        self.start_line = start_line;
        self.end_line = end_line;
        self
    }

    /// Set the target aggregate request rate.
    pub fn with_rate(mut self, requests_per_second: u32) -> Self {
        self.requests_per_second = requests_per_second;
        self
    }

    /// Set the retry policy.
    pub fn with_retry(mut self, max_retries: u32, retry_delay_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.retry_delay_ms = retry_delay_ms;
        self
    }

    /// Set the per-attempt connect/read/write timeouts in seconds.
    pub fn with_timeouts(mut self, connect: u64, read: u64, write: u64) -> Self {
        self.connect_timeout_secs = connect;
        self.read_timeout_secs = read;
        self.write_timeout_secs = write;
        self
    }

    /// Validate the configuration invariants.
    ///
    /// Fails fast before any worker or network call is created.
    pub fn validate(&self) -> AttackResult<()> {
        if !self.target_url.starts_with("http://") && !self.target_url.starts_with("https://") {
            return Err(AttackError::configuration(
                "target_url must start with http:// or https://",
            ));
        }
        if self.start_line < 1 {
            return Err(AttackError::configuration("start_line must be >= 1"));
        }
        if let Some(end) = self.end_line {
            if end < self.start_line {
                return Err(AttackError::configuration(format!(
                    "end_line ({}) must be >= start_line ({})",
                    end, self.start_line
                )));
            }
        }
        if self.requests_per_second == 0 {
            return Err(AttackError::configuration(
                "requests_per_second must be > 0",
            ));
        }
        if self.connect_timeout_secs == 0 || self.read_timeout_secs == 0 || self.write_timeout_secs == 0
        {
            return Err(AttackError::configuration("timeouts must be > 0"));
        }
        Ok(())
    }

    /// Number of workers for this configuration: `min(rate, MAX_WORKERS)`.
    pub fn worker_count(&self) -> usize {
        (self.requests_per_second as usize).clamp(1, MAX_WORKERS)
    }

    /// Total physical attempts per candidate.
    ///
    /// `max_retries` counts total attempts, matching the reference loop
    /// semantics; 0 is clamped so every candidate gets at least one try.
    pub fn total_attempts(&self) -> u32 {
        self.max_retries.max(1)
    }

    /// Linear backoff before the attempt following `attempt_number`.
    pub fn backoff_delay(&self, attempt_number: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(attempt_number as u64))
    }
}

/// Terminal result of all attempts for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptOutcome {
    pub line_number: usize,
    pub candidate: String,
    pub success: bool,
    pub status_code: Option<u16>,
    pub response: Option<String>,
    pub elapsed_ms: u64,
    pub attempts: u32,
    pub error_message: Option<String>,
    pub executed_at: chrono::DateTime<chrono::Utc>,
}

/// Lifecycle state of an orchestrator instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrchestratorState {
    Idle,
    Running,
    Cancelled,
    Completed,
    Failed(String),
}

impl OrchestratorState {
    pub fn is_running(&self) -> bool {
        matches!(self, OrchestratorState::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrchestratorState::Cancelled
                | OrchestratorState::Completed
                | OrchestratorState::Failed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_request_is_valid() {
        let request = AttackRequest::new("https://example.com/login");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        let request = AttackRequest::new("https://example.com/login").with_range(5, Some(3));
        assert!(matches!(
            request.validate(),
            Err(AttackError::Configuration { .. })
        ));
    }

    #[test]
    fn test_scheme_is_required() {
        let request = AttackRequest::new("ftp://example.com");
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        let request = AttackRequest::new("https://example.com").with_rate(0);
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_worker_count_is_capped() {
        let request = AttackRequest::new("https://example.com").with_rate(50);
        assert_eq!(request.worker_count(), MAX_WORKERS);

        let request = AttackRequest::new("https://example.com").with_rate(3);
        assert_eq!(request.worker_count(), 3);
    }

    #[test]
    fn test_total_attempts_clamps_zero() {
        let request = AttackRequest::new("https://example.com").with_retry(0, 100);
        assert_eq!(request.total_attempts(), 1);

        let request = AttackRequest::new("https://example.com").with_retry(3, 100);
        assert_eq!(request.total_attempts(), 3);
    }

    #[test]
    fn test_backoff_is_linear() {
        let request = AttackRequest::new("https://example.com").with_retry(3, 100);
        assert_eq!(request.backoff_delay(1), Duration::from_millis(100));
        assert_eq!(request.backoff_delay(2), Duration::from_millis(200));
    }
}
