//! Finished-game results
//!
//! Engines run on the connection tasks and hand results to a [`ChannelSink`].
//! A single writer task drains the channel and appends one JSON line per game
//! to the results file. The same `(userId, sessionId, turn)` is written at most
//! once, including across restarts: existing lines are loaded before writing.
//! Records without a session id are never deduplicated.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use crate::core::{GameResult, ResultSink};
use crate::protocol::current_timestamp_ms;

/// One line of the results file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub user_id: String,
    pub session_id: String,
    pub turn: u32,
    pub score: u32,
    pub ts: u64,
}

type ResultKey = (String, String, u32);

impl ResultRecord {
    fn key(&self) -> Option<ResultKey> {
        if self.session_id.is_empty() {
            return None;
        }
        Some((self.user_id.clone(), self.session_id.clone(), self.turn))
    }
}

impl From<GameResult> for ResultRecord {
    fn from(r: GameResult) -> Self {
        Self {
            user_id: r.user_id.to_string(),
            session_id: r.session_id.to_string(),
            turn: r.turn,
            score: r.score,
            ts: current_timestamp_ms(),
        }
    }
}

/// Sink that forwards results to the writer task
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ResultRecord>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ResultRecord>) -> Self {
        Self { tx }
    }
}

impl ResultSink for ChannelSink {
    type Error = mpsc::error::SendError<ResultRecord>;

    fn record(&mut self, result: GameResult) -> Result<(), Self::Error> {
        self.tx.send(ResultRecord::from(result))
    }
}

/// Drain `rx` until every sender is gone
///
/// With no `path`, results are only logged.
pub async fn run_result_writer(
    path: Option<PathBuf>,
    mut rx: mpsc::UnboundedReceiver<ResultRecord>,
) -> anyhow::Result<()> {
    let Some(path) = path else {
        while let Some(rec) = rx.recv().await {
            tracing::info!(
                user = %rec.user_id,
                session = %rec.session_id,
                score = rec.score,
                "game result (not persisted)"
            );
        }
        return Ok(());
    };

    let mut seen = load_written_keys(&path).await?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    tracing::info!(path = %path.display(), existing = seen.len(), "writing results");

    append_records(&mut file, &mut seen, &mut rx).await;
    Ok(())
}

/// Append every new record from `rx` to `out`
///
/// A record that fails to serialize, write or flush is logged and un-marked,
/// so a later retry of the same turn can still land.
async fn append_records<W: AsyncWrite + Unpin>(
    out: &mut W,
    seen: &mut HashSet<ResultKey>,
    rx: &mut mpsc::UnboundedReceiver<ResultRecord>,
) {
    let mut buf: Vec<u8> = Vec::with_capacity(256);
    while let Some(rec) = rx.recv().await {
        let key = rec.key();
        if let Some(key) = &key {
            if !seen.insert(key.clone()) {
                tracing::debug!(
                    session = %rec.session_id,
                    turn = rec.turn,
                    "duplicate result dropped"
                );
                continue;
            }
        }

        buf.clear();
        let written = match serde_json::to_writer(&mut buf, &rec) {
            Ok(()) => {
                buf.push(b'\n');
                match out.write_all(&buf).await {
                    Ok(()) => out.flush().await,
                    Err(e) => Err(e),
                }
            }
            Err(e) => Err(e.into()),
        };

        if let Err(e) = written {
            tracing::warn!(session = %rec.session_id, "failed to write result: {}", e);
            if let Some(key) = &key {
                seen.remove(key);
            }
        }
    }
}

/// Keys already present in the results file
///
/// A missing file is empty; lines that don't parse are skipped.
async fn load_written_keys(path: &Path) -> anyhow::Result<HashSet<ResultKey>> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(t) => t,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashSet::new()),
        Err(e) => return Err(e.into()),
    };

    Ok(text
        .lines()
        .filter_map(|line| serde_json::from_str::<ResultRecord>(line).ok())
        .filter_map(|rec| rec.key())
        .collect())
}
