//! Wordlist sources
//!
//! A wordlist source produces a lazy, line-numbered sequence of non-empty
//! trimmed candidate strings. Line numbers are 1-based and count non-blank
//! entries, so a requested range always resolves to the number of candidates
//! actually fed to the queue.

use crate::error::{AttackError, AttackResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// A single wordlist entry flowing through the candidate queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub line_number: usize,
    pub value: String,
}

/// Source of candidate values for an attack.
#[async_trait]
pub trait WordlistSource: Send + Sync {
    /// Total number of non-blank entries.
    async fn count_lines(&self) -> AttackResult<usize>;

    /// Stream entries within the inclusive `[start_line, end_line]` range
    /// into `tx`, in ascending line order.
    ///
    /// Returns Ok when the range is exhausted or the receiving side has been
    /// closed; returns an error on a mid-stream read failure. Not restartable
    /// mid-stream.
    async fn stream_lines(
        &self,
        start_line: usize,
        end_line: Option<usize>,
        tx: mpsc::Sender<Candidate>,
    ) -> AttackResult<()>;
}

/// Wordlist backed by a local file, read lazily line by line.
#[derive(Debug, Clone)]
pub struct FileWordlist {
    path: PathBuf,
}

impl FileWordlist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn open(&self) -> AttackResult<BufReader<File>> {
        let file = File::open(&self.path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AttackError::WordlistNotFound {
                    path: self.path.display().to_string(),
                }
            } else {
                AttackError::SourceUnavailable {
                    reason: format!("{}: {}", self.path.display(), e),
                }
            }
        })?;
        Ok(BufReader::new(file))
    }
}

#[async_trait]
impl WordlistSource for FileWordlist {
    async fn count_lines(&self) -> AttackResult<usize> {
        let mut reader = self.open().await?.lines();
        let mut count = 0;
        while let Some(line) = reader.next_line().await.map_err(|e| AttackError::Io {
            reason: format!("{}: {}", self.path.display(), e),
        })? {
            if !line.trim().is_empty() {
                count += 1;
            }
        }
        debug!(path = %self.path.display(), count, "counted wordlist entries");
        Ok(count)
    }

    async fn stream_lines(
        &self,
        start_line: usize,
        end_line: Option<usize>,
        tx: mpsc::Sender<Candidate>,
    ) -> AttackResult<()> {
        let mut reader = self.open().await?.lines();
        let mut line_number = 0;
        while let Some(line) = reader.next_line().await.map_err(|e| AttackError::Io {
            reason: format!("{}: {}", self.path.display(), e),
        })? {
            let value = line.trim();
            if value.is_empty() {
                continue;
            }
            line_number += 1;
            if line_number < start_line {
                continue;
            }
            if let Some(end) = end_line {
                if line_number > end {
                    break;
                }
            }
            let candidate = Candidate {
                line_number,
                value: value.to_string(),
            };
            // A closed receiver means the attack was stopped; not an error.
            if tx.send(candidate).await.is_err() {
                debug!(path = %self.path.display(), "candidate queue closed, stopping feed");
                break;
            }
        }
        Ok(())
    }
}

/// In-memory wordlist, mainly for tests and programmatic candidate sets.
#[derive(Debug, Clone, Default)]
pub struct MemoryWordlist {
    entries: Vec<String>,
}

impl MemoryWordlist {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    fn trimmed(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .map(|e| e.trim())
            .filter(|e| !e.is_empty())
    }
}

#[async_trait]
impl WordlistSource for MemoryWordlist {
    async fn count_lines(&self) -> AttackResult<usize> {
        Ok(self.trimmed().count())
    }

    async fn stream_lines(
        &self,
        start_line: usize,
        end_line: Option<usize>,
        tx: mpsc::Sender<Candidate>,
    ) -> AttackResult<()> {
        for (index, value) in self.trimmed().enumerate() {
            let line_number = index + 1;
            if line_number < start_line {
                continue;
            }
            if let Some(end) = end_line {
                if line_number > end {
                    break;
                }
            }
            let candidate = Candidate {
                line_number,
                value: value.to_string(),
            };
            if tx.send(candidate).await.is_err() {
                break;
            }
        }
        Ok(())
    }
}
