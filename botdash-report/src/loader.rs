//! Input loading: the bot snapshot (`bot_data.json`) and the trade log
//! (`trades.jsonl`).
//!
//! The trade log is read line by line. Blank lines are ignored and lines that
//! do not decode to a trade object are skipped with a warning, never fatal.

use std::fs;
use std::io::{self, BufRead, BufReader};
use std::str;
use std::path::{Path, PathBuf};

use botdash_core::domain::{BotSnapshot, TradeRecord};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A line of the trade log that could not be decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLine {
    /// 1-based line number.
    pub line: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct TradeLog {
    pub trades: Vec<TradeRecord>,
    pub skipped: Vec<SkippedLine>,
}

impl TradeLog {
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}

/// Read and decode the snapshot JSON.
pub fn load_snapshot(path: &Path) -> Result<BotSnapshot, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            LoadError::SnapshotNotFound(path.to_path_buf())
        } else {
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let snapshot = parse_snapshot(&content).map_err(|source| LoadError::Snapshot {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        balance = snapshot.current_balance(),
        positions = snapshot.open_positions().len(),
        "loaded snapshot"
    );
    Ok(snapshot)
}

pub fn parse_snapshot(content: &str) -> Result<BotSnapshot, serde_json::Error> {
    serde_json::from_str(content)
}

/// Read the trade log. A missing file is an empty log.
pub fn load_trades(path: &Path) -> Result<TradeLog, LoadError> {
    let file = match fs::File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(path = %path.display(), "trade log not found, treating as empty");
            return Ok(TradeLog::default());
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let mut log = TradeLog::default();
    for (idx, bytes) in BufReader::new(file).split(b'\n').enumerate() {
        let bytes = bytes.map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match str::from_utf8(&bytes) {
            Ok(line) => push_line(&mut log, idx + 1, line),
            Err(e) => skip_line(&mut log, idx + 1, format!("invalid UTF-8: {e}")),
        }
    }
    log_summary(&log, &path.display().to_string());
    Ok(log)
}

/// Decode JSON-lines content already in memory.
pub fn parse_trades_jsonl(content: &str) -> TradeLog {
    let mut log = TradeLog::default();
    for (idx, line) in content.lines().enumerate() {
        push_line(&mut log, idx + 1, line);
    }
    log_summary(&log, "<memory>");
    log
}

fn push_line(log: &mut TradeLog, line_no: usize, line: &str) {
    let line = line.trim();
    if line.is_empty() {
        return;
    }
    match serde_json::from_str::<TradeRecord>(line) {
        Ok(trade) => log.trades.push(trade),
        Err(e) => skip_line(log, line_no, e.to_string()),
    }
}

fn skip_line(log: &mut TradeLog, line_no: usize, reason: String) {
    warn!(line = line_no, error = %reason, "skipping malformed trade line");
    log.skipped.push(SkippedLine {
        line: line_no,
        reason,
    });
}

fn log_summary(log: &TradeLog, source: &str) {
    debug!(
        source,
        trades = log.trades.len(),
        skipped = log.skipped.len(),
        "parsed trade log"
    );
}
