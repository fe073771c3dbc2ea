//! Brute Engine - wordlist attack orchestration
//!
//! This crate coordinates credential attacks for authorized security testing:
//! a wordlist source feeds candidates through a bounded worker pool into an
//! HTTP request executor, with shared rate limiting, linear-backoff retries,
//! live statistics, and cooperative cancellation.

pub mod error;
pub mod executor;
pub mod orchestrator;
pub mod rate_limit;
pub mod sink;
pub mod stats;
pub mod types;
pub mod wordlist;

pub use error::{AttackError, AttackResult};
pub use executor::{HttpRequestExecutor, HttpResponse, RequestExecutor};
pub use orchestrator::AttackOrchestrator;
pub use rate_limit::RateLimiter;
pub use sink::{NoopSink, ResultSink};
pub use stats::AttackStats;
pub use types::{AttackRequest, AttemptOutcome, OrchestratorState, MAX_WORKERS};
pub use wordlist::{Candidate, FileWordlist, MemoryWordlist, WordlistSource};
