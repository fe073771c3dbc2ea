use anyhow::Context;
use brute_engine::{
    AttackError, AttackOrchestrator, AttackRequest, AttackStats, AttemptOutcome, FileWordlist,
    HttpRequestExecutor, OrchestratorState, ResultSink,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Wordlist credential attack runner for authorized security testing
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Target endpoint URL (http:// or https://)
    #[arg(long)]
    target: String,

    /// Path to the wordlist file
    #[arg(long)]
    wordlist: PathBuf,

    /// First wordlist line to try (1-based)
    #[arg(long, default_value_t = 1)]
    start_line: usize,

    /// Last wordlist line to try (inclusive; defaults to end of file)
    #[arg(long)]
    end_line: Option<usize>,

    /// Target aggregate requests per second
    #[arg(long, default_value_t = 5)]
    rate: u32,

    /// Total attempts per candidate before giving up
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Base retry delay in milliseconds (linear backoff)
    #[arg(long, default_value_t = 1000)]
    retry_delay_ms: u64,

    /// Connect timeout in seconds
    #[arg(long, default_value_t = 30)]
    connect_timeout: u64,

    /// Read timeout in seconds
    #[arg(long, default_value_t = 60)]
    read_timeout: u64,

    /// Write timeout in seconds
    #[arg(long, default_value_t = 30)]
    write_timeout: u64,
}

/// Sink that reports progress through the log.
struct LogSink;

impl ResultSink for LogSink {
    fn on_result(&self, outcome: &AttemptOutcome) {
        if outcome.success {
            info!(
                line = outcome.line_number,
                candidate = %outcome.candidate,
                status = ?outcome.status_code,
                attempts = outcome.attempts,
                elapsed_ms = outcome.elapsed_ms,
                "HIT"
            );
        } else if let Some(ref message) = outcome.error_message {
            warn!(
                line = outcome.line_number,
                attempts = outcome.attempts,
                error = %message,
                "candidate exhausted"
            );
        }
    }

    fn on_stats_changed(&self, stats: &AttackStats) {
        if stats.processed_lines % 100 == 0 {
            info!(
                processed = stats.processed_lines,
                total = stats.total_lines,
                progress = %format!("{:.1}%", stats.progress() * 100.0),
                avg_ms = stats.average_time_ms,
                "progress"
            );
        }
    }

    fn on_complete(&self) {
        info!("attack completed");
    }

    fn on_cancelled(&self) {
        info!("attack cancelled");
    }

    fn on_error(&self, error: &AttackError) {
        error!(%error, "attack failed");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brute_engine=info,brute_cli=info,brute=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let request = AttackRequest::new(args.target)
        .with_range(args.start_line, args.end_line)
        .with_rate(args.rate)
        .with_retry(args.max_retries, args.retry_delay_ms)
        .with_timeouts(args.connect_timeout, args.read_timeout, args.write_timeout);

    let executor = HttpRequestExecutor::new(&request).context("building HTTP executor")?;
    let wordlist = FileWordlist::new(&args.wordlist);
    let orchestrator = Arc::new(AttackOrchestrator::new(
        Arc::new(wordlist),
        Arc::new(executor),
    ));

    orchestrator
        .start(request, Arc::new(LogSink))
        .await
        .context("starting attack")?;

    // Ctrl-C stops the attack cooperatively.
    {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received, stopping");
                orchestrator.stop().await;
            }
        });
    }

    orchestrator.wait().await;

    let stats = orchestrator.stats();
    info!(
        processed = stats.processed_lines,
        successful = stats.successful_requests,
        failed = stats.failed_requests,
        attempts = stats.total_requests,
        total_ms = stats.total_time_ms,
        avg_ms = stats.average_time_ms,
        success_rate = %format!("{:.2}%", stats.success_rate() * 100.0),
        "final statistics"
    );

    for outcome in orchestrator.recent_results(50) {
        if outcome.success {
            println!(
                "line {}: {} (status {})",
                outcome.line_number,
                outcome.candidate,
                outcome.status_code.unwrap_or_default()
            );
        }
    }

    match orchestrator.state() {
        OrchestratorState::Failed(reason) => anyhow::bail!("attack failed: {}", reason),
        _ => Ok(()),
    }
}
