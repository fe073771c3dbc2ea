//! Live attack statistics
//!
//! Statistics are owned by a single aggregation task; workers never touch the
//! counters directly. Derived values (progress, success rate, average time)
//! are pure functions of the counters and are never cached.

use crate::types::AttemptOutcome;
use serde::{Deserialize, Serialize};

/// Aggregated counters for a running or finished attack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttackStats {
    /// Candidates in scope for this run.
    pub total_lines: usize,
    /// Candidates that reached a terminal outcome.
    pub processed_lines: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    /// Physical attempts issued, including retries.
    pub total_requests: u64,
    pub total_time_ms: u64,
    pub average_time_ms: u64,
}

impl AttackStats {
    /// Stats for a freshly started attack over `total_lines` candidates.
    pub fn for_total(total_lines: usize) -> Self {
        Self {
            total_lines,
            ..Self::default()
        }
    }

    /// Fold one terminal outcome into the counters.
    pub fn record(&mut self, outcome: &AttemptOutcome) {
        self.processed_lines += 1;
        if outcome.success {
            self.successful_requests += 1;
        } else {
            self.failed_requests += 1;
        }
        self.total_requests += u64::from(outcome.attempts);
        self.total_time_ms += outcome.elapsed_ms;
        self.average_time_ms = if self.processed_lines > 0 {
            self.total_time_ms / self.processed_lines as u64
        } else {
            0
        };
    }

    /// Fraction of the candidate range processed so far, in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.total_lines == 0 {
            0.0
        } else {
            self.processed_lines as f64 / self.total_lines as f64
        }
    }

    /// Successful candidates per attempt issued, in `[0, 1]`.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(success: bool, attempts: u32, elapsed_ms: u64) -> AttemptOutcome {
        AttemptOutcome {
            line_number: 1,
            candidate: "secret".to_string(),
            success,
            status_code: if success { Some(200) } else { None },
            response: None,
            elapsed_ms,
            attempts,
            error_message: None,
            executed_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_record_updates_counters() {
        let mut stats = AttackStats::for_total(4);
        stats.record(&outcome(true, 1, 100));
        stats.record(&outcome(false, 3, 500));

        assert_eq!(stats.processed_lines, 2);
        assert_eq!(stats.successful_requests, 1);
        assert_eq!(stats.failed_requests, 1);
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.total_time_ms, 600);
        assert_eq!(stats.average_time_ms, 300);
    }

    #[test]
    fn test_progress_is_a_fraction_of_total() {
        let mut stats = AttackStats::for_total(10);
        assert_eq!(stats.progress(), 0.0);
        for _ in 0..5 {
            stats.record(&outcome(false, 1, 10));
        }
        assert!((stats.progress() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_success_rate_counts_attempts() {
        let mut stats = AttackStats::for_total(2);
        stats.record(&outcome(true, 1, 10));
        stats.record(&outcome(false, 3, 10));
        // 1 success over 4 attempts issued.
        assert!((stats.success_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_stats_have_zero_rates() {
        let stats = AttackStats::default();
        assert_eq!(stats.progress(), 0.0);
        assert_eq!(stats.success_rate(), 0.0);
    }
}
