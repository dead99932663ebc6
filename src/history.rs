//! Append-only sinks for completed turns.

use crate::types::{Turn, TurnRecord};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("History serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

/// Receives every completed turn exactly once
#[async_trait]
pub trait TurnSink: Send + Sync {
    async fn append(&self, turn: &Turn) -> Result<(), HistoryError>;
}

async fn append_to_file(
    path: &Path,
    lock: &tokio::sync::Mutex<()>,
    content: &str,
) -> Result<(), HistoryError> {
    let _guard = lock.lock().await;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.flush().await?;
    file.sync_data().await?;
    Ok(())
}

/// Plain-text transcript: one `User:`/`AI:` block per turn
pub struct TranscriptLog {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl TranscriptLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format_block(turn: &Turn) -> String {
        format!("User: {}\nAI: {}\n\n", turn.user_text(), turn.ai_text())
    }
}

#[async_trait]
impl TurnSink for TranscriptLog {
    async fn append(&self, turn: &Turn) -> Result<(), HistoryError> {
        append_to_file(&self.path, &self.lock, &Self::format_block(turn)).await
    }
}

/// JSON-lines history, one `TurnRecord` per line.
///
/// Stands in for a `conversations` table: records are only ever appended and
/// `load` replays them in write order.
pub struct JsonlHistoryStore {
    path: PathBuf,
    lock: tokio::sync::Mutex<()>,
}

impl JsonlHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back every stored record, oldest first
    pub async fn load(&self) -> Result<Vec<TurnRecord>, HistoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(HistoryError::from))
            .collect()
    }
}

#[async_trait]
impl TurnSink for JsonlHistoryStore {
    async fn append(&self, turn: &Turn) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(&TurnRecord::from(turn))?;
        line.push('\n');
        append_to_file(&self.path, &self.lock, &line).await
    }
}

/// In-process sink, handy for observers and tests
#[derive(Default)]
pub struct MemorySink {
    turns: Mutex<Vec<Turn>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.turns.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.turns.lock().map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl TurnSink for MemorySink {
    async fn append(&self, turn: &Turn) -> Result<(), HistoryError> {
        self.turns
            .lock()
            .map_err(|e| HistoryError::Unavailable(e.to_string()))?
            .push(turn.clone());
        Ok(())
    }
}
