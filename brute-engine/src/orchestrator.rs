//! Attack orchestration
//!
//! The orchestrator turns a wordlist and a request executor into a
//! bounded-concurrency, rate-limited, retrying stream of attempts with live
//! statistics and cooperative cancellation. One feeder task streams candidates
//! into a bounded queue, `min(rate, MAX_WORKERS)` workers drain it, and a
//! single aggregation task folds outcomes into the statistics and notifies
//! the sink. Candidates enter the queue in ascending line order but outcomes
//! are emitted in completion order; consumers reconstruct ordering from the
//! line number when they need it.

use crate::error::{AttackError, AttackResult};
use crate::executor::RequestExecutor;
use crate::rate_limit::RateLimiter;
use crate::sink::ResultSink;
use crate::stats::AttackStats;
use crate::types::{AttackRequest, AttemptOutcome, OrchestratorState};
use crate::wordlist::{Candidate, WordlistSource};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Depth of the candidate queue between the feeder and the worker pool.
const QUEUE_DEPTH: usize = 256;

struct RunningJob {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Coordinates a single attack at a time over a wordlist and an executor.
///
/// The instance is owned by its caller; constructing one per attack session
/// and reusing it across runs are both supported. Only one attack may run at
/// a time: starting while running cancels the previous run first.
pub struct AttackOrchestrator {
    wordlist: Arc<dyn WordlistSource>,
    executor: Arc<dyn RequestExecutor>,
    state_tx: watch::Sender<OrchestratorState>,
    stats_tx: watch::Sender<AttackStats>,
    results: Arc<StdMutex<Vec<AttemptOutcome>>>,
    result_tx: broadcast::Sender<AttemptOutcome>,
    job: Mutex<Option<RunningJob>>,
}

impl AttackOrchestrator {
    pub fn new(wordlist: Arc<dyn WordlistSource>, executor: Arc<dyn RequestExecutor>) -> Self {
        let (state_tx, _) = watch::channel(OrchestratorState::Idle);
        let (stats_tx, _) = watch::channel(AttackStats::default());
        let (result_tx, _) = broadcast::channel(1024);
        Self {
            wordlist,
            executor,
            state_tx,
            stats_tx,
            results: Arc::new(StdMutex::new(Vec::new())),
            result_tx,
            job: Mutex::new(None),
        }
    }

    /// Start an attack.
    ///
    /// Validation failures are reported through `on_error` and the returned
    /// error before any task or network call is created, leaving the state
    /// untouched. Setup failures (unreadable wordlist, empty range) transition
    /// to `Failed`. On success the state becomes `Running` and the method
    /// returns immediately; progress flows through the sink and the
    /// subscription channels.
    pub async fn start(
        &self,
        request: AttackRequest,
        sink: Arc<dyn ResultSink>,
    ) -> AttackResult<()> {
        if let Err(e) = request.validate() {
            sink.on_error(&e);
            return Err(e);
        }

        // Hold the job slot for the whole setup so concurrent starts (and
        // stops) serialize: exactly one run owns the aggregator and the
        // terminal transition. The previous run is cancelled and drained
        // before the new one is installed.
        let mut job = self.job.lock().await;
        Self::cancel_job(&mut job).await;

        let attack_id = Uuid::new_v4();
        info!(%attack_id, target = %request.target_url, "starting attack");

        let total = match self.resolve_total(&request).await {
            Ok(total) => total,
            Err(e) => {
                error!(%attack_id, error = %e, "attack setup failed");
                self.state_tx
                    .send_replace(OrchestratorState::Failed(e.to_string()));
                sink.on_error(&e);
                return Err(e);
            }
        };
        debug!(%attack_id, total, "resolved candidate range");

        self.results.lock().expect("results lock").clear();
        self.stats_tx.send_replace(AttackStats::for_total(total));
        self.state_tx.send_replace(OrchestratorState::Running);

        let cancel = CancellationToken::new();
        let (queue_tx, queue_rx) = mpsc::channel::<Candidate>(QUEUE_DEPTH);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let (outcome_tx, outcome_rx) = mpsc::channel::<AttemptOutcome>(QUEUE_DEPTH);
        let limiter = Arc::new(RateLimiter::new(request.requests_per_second));

        let feeder = {
            let wordlist = Arc::clone(&self.wordlist);
            let cancel = cancel.clone();
            let (start_line, end_line) = (request.start_line, request.end_line);
            tokio::spawn(async move {
                tokio::select! {
                    _ = cancel.cancelled() => Ok(()),
                    res = wordlist.stream_lines(start_line, end_line, queue_tx) => res,
                }
            })
        };

        let mut workers = Vec::with_capacity(request.worker_count());
        for worker_id in 0..request.worker_count() {
            workers.push(tokio::spawn(worker_loop(
                worker_id,
                request.clone(),
                Arc::clone(&queue_rx),
                Arc::clone(&self.executor),
                Arc::clone(&limiter),
                cancel.clone(),
                outcome_tx.clone(),
            )));
        }
        drop(outcome_tx);

        let aggregator = tokio::spawn(aggregate(
            outcome_rx,
            AttackStats::for_total(total),
            self.stats_tx.clone(),
            Arc::clone(&self.results),
            self.result_tx.clone(),
            Arc::clone(&sink),
            cancel.clone(),
        ));

        let handle = {
            let state_tx = self.state_tx.clone();
            let cancel = cancel.clone();
            tokio::spawn(async move {
                let feed_result = match feeder.await {
                    Ok(res) => res,
                    Err(e) => Err(AttackError::Io {
                        reason: format!("candidate feed task panicked: {e}"),
                    }),
                };
                if feed_result.is_err() {
                    // A dead source aborts the whole run.
                    cancel.cancel();
                }
                for worker in workers {
                    let _ = worker.await;
                }
                let _ = aggregator.await;

                // Single terminal transition per run.
                match feed_result {
                    Err(e) => {
                        error!(%attack_id, error = %e, "attack failed");
                        state_tx.send_replace(OrchestratorState::Failed(e.to_string()));
                        sink.on_error(&e);
                    }
                    Ok(()) if cancel.is_cancelled() => {
                        info!(%attack_id, "attack cancelled");
                        state_tx.send_replace(OrchestratorState::Cancelled);
                        sink.on_cancelled();
                    }
                    Ok(()) => {
                        info!(%attack_id, "attack completed");
                        state_tx.send_replace(OrchestratorState::Completed);
                        sink.on_complete();
                    }
                }
            })
        };

        *job = Some(RunningJob { cancel, handle });
        Ok(())
    }

    /// Cancel all outstanding and future work and wait for the pool to drain.
    ///
    /// In-flight requests are abandoned best-effort; no outcome is emitted for
    /// a candidate interrupted mid-attempt. Idempotent: a no-op when nothing
    /// is running.
    pub async fn stop(&self) {
        let mut job = self.job.lock().await;
        Self::cancel_job(&mut job).await;
    }

    async fn cancel_job(job: &mut Option<RunningJob>) {
        if let Some(job) = job.take() {
            job.cancel.cancel();
            let _ = job.handle.await;
        }
    }

    /// Stop, clear statistics and accumulated results, return to `Idle`.
    pub async fn reset(&self) {
        self.stop().await;
        self.results.lock().expect("results lock").clear();
        self.stats_tx.send_replace(AttackStats::default());
        self.state_tx.send_replace(OrchestratorState::Idle);
        debug!("orchestrator reset");
    }

    /// Wait for the current attack to reach a terminal state.
    pub async fn wait(&self) {
        let mut rx = self.state_tx.subscribe();
        let _ = rx.wait_for(|s| s.is_terminal()).await;
    }

    pub fn state(&self) -> OrchestratorState {
        self.state_tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Snapshot of the current statistics.
    pub fn stats(&self) -> AttackStats {
        self.stats_tx.borrow().clone()
    }

    /// Watch the statistics as they change.
    pub fn subscribe_stats(&self) -> watch::Receiver<AttackStats> {
        self.stats_tx.subscribe()
    }

    /// Watch lifecycle state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<OrchestratorState> {
        self.state_tx.subscribe()
    }

    /// Receive outcomes as they complete, in completion order.
    pub fn subscribe_results(&self) -> broadcast::Receiver<AttemptOutcome> {
        self.result_tx.subscribe()
    }

    /// The most recent `limit` accumulated outcomes.
    pub fn recent_results(&self, limit: usize) -> Vec<AttemptOutcome> {
        let results = self.results.lock().expect("results lock");
        let skip = results.len().saturating_sub(limit);
        results.iter().skip(skip).cloned().collect()
    }

    /// Resolve the candidate count for the requested line range.
    async fn resolve_total(&self, request: &AttackRequest) -> AttackResult<usize> {
        let total = match request.end_line {
            Some(end) => end as i64 - request.start_line as i64 + 1,
            None => {
                let count = self.wordlist.count_lines().await?;
                count as i64 - request.start_line as i64 + 1
            }
        };
        if total <= 0 {
            return Err(AttackError::EmptyRange { resolved: total });
        }
        Ok(total as usize)
    }
}

async fn worker_loop(
    worker_id: usize,
    request: AttackRequest,
    queue: Arc<Mutex<mpsc::Receiver<Candidate>>>,
    executor: Arc<dyn RequestExecutor>,
    limiter: Arc<RateLimiter>,
    cancel: CancellationToken,
    outcome_tx: mpsc::Sender<AttemptOutcome>,
) {
    debug!(worker_id, "worker started");
    loop {
        let candidate = {
            let mut rx = queue.lock().await;
            tokio::select! {
                _ = cancel.cancelled() => None,
                candidate = rx.recv() => candidate,
            }
        };
        let Some(candidate) = candidate else { break };

        match attempt_candidate(&request, &candidate, &*executor, &limiter, &cancel).await {
            Some(outcome) => {
                if outcome_tx.send(outcome).await.is_err() {
                    break;
                }
            }
            // Cancelled mid-attempt: no outcome for this candidate.
            None => break,
        }
    }
    debug!(worker_id, "worker stopped");
}

/// Drive one candidate to a terminal outcome, or `None` if cancelled first.
async fn attempt_candidate(
    request: &AttackRequest,
    candidate: &Candidate,
    executor: &dyn RequestExecutor,
    limiter: &RateLimiter,
    cancel: &CancellationToken,
) -> Option<AttemptOutcome> {
    let total_attempts = request.total_attempts();
    let mut last_error = None;
    let mut first_token: Option<Instant> = None;

    for attempt in 1..=total_attempts {
        tokio::select! {
            _ = cancel.cancelled() => return None,
            _ = limiter.acquire() => {}
        }
        // Elapsed time covers the attempts and their backoff, not the
        // queueing for a rate token.
        let started = *first_token.get_or_insert_with(Instant::now);

        let result = tokio::select! {
            _ = cancel.cancelled() => return None,
            result = executor.attempt(&candidate.value) => result,
        };

        match result {
            Ok(response) => {
                return Some(AttemptOutcome {
                    line_number: candidate.line_number,
                    candidate: candidate.value.clone(),
                    success: response.is_success(),
                    status_code: Some(response.status_code),
                    response: Some(response.body),
                    elapsed_ms: started.elapsed().as_millis() as u64,
                    attempts: attempt,
                    error_message: None,
                    executed_at: chrono::Utc::now(),
                });
            }
            Err(e) => {
                warn!(
                    line = candidate.line_number,
                    attempt,
                    error = %e,
                    "attempt failed"
                );
                last_error = Some(e.to_string());
                if attempt < total_attempts {
                    tokio::select! {
                        _ = cancel.cancelled() => return None,
                        _ = tokio::time::sleep(request.backoff_delay(attempt)) => {}
                    }
                }
            }
        }
    }

    Some(AttemptOutcome {
        line_number: candidate.line_number,
        candidate: candidate.value.clone(),
        success: false,
        status_code: None,
        response: None,
        elapsed_ms: first_token.map_or(0, |s| s.elapsed().as_millis() as u64),
        attempts: total_attempts,
        error_message: last_error.or_else(|| Some("unknown error".to_string())),
        executed_at: chrono::Utc::now(),
    })
}

/// Single-writer aggregation task.
///
/// Serializes all counter updates and sink notifications. Stops delivering
/// results as soon as cancellation is observed, so no `on_result` follows
/// `on_cancelled`.
async fn aggregate(
    mut outcome_rx: mpsc::Receiver<AttemptOutcome>,
    mut stats: AttackStats,
    stats_tx: watch::Sender<AttackStats>,
    results: Arc<StdMutex<Vec<AttemptOutcome>>>,
    result_tx: broadcast::Sender<AttemptOutcome>,
    sink: Arc<dyn ResultSink>,
    cancel: CancellationToken,
) {
    loop {
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = outcome_rx.recv() => match outcome {
                Some(outcome) => outcome,
                None => break,
            },
        };

        stats.record(&outcome);
        results.lock().expect("results lock").push(outcome.clone());
        let _ = result_tx.send(outcome.clone());
        stats_tx.send_replace(stats.clone());
        sink.on_result(&outcome);
        sink.on_stats_changed(&stats);
    }
    // Freeze the final counters.
    stats_tx.send_replace(stats);
}
