//! File-backed snapshot and move-log source
//!
//! Reads a JSON document written by an external board reader:
//!
//! ```json
//! { "pieces": { "e2": "wp", "51": "wk", "e8": "bk" }, "moves": ["e4"] }
//! ```
//!
//! The file is read once per cycle by [`SnapshotProvider::snapshot`]; the move
//! list from that same read is handed to the next [`MoveLogProvider::move_log`]
//! call, so pieces and moves always come from one write. Clones share that
//! handoff. A missing file means the structure is gone; a file that does not
//! parse is assumed to be mid-write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::board::BoardSnapshot;
use crate::pipeline::{MoveLogProvider, SnapshotProvider, SourceError, SourceResult};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BoardDocument {
    pieces: BoardSnapshot,
    moves: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
    /// Moves from the last snapshot read, not yet handed out
    pending_moves: Arc<Mutex<Option<Vec<String>>>>,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending_moves: Arc::new(Mutex::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> SourceResult<BoardDocument> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::StructureMissing(format!("{} not found", self.path.display())));
            }
            Err(e) => return Err(SourceError::Other(e.into())),
        };
        serde_json::from_str(&contents).map_err(|e| SourceError::Inconsistent(format!("{}: {e}", self.path.display())))
    }

    async fn check_exists(&self) -> SourceResult<()> {
        match tokio::fs::metadata(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SourceError::StructureMissing(format!(
                "{} not found",
                self.path.display()
            ))),
            Err(e) => Err(SourceError::Other(e.into())),
        }
    }
}

#[async_trait]
impl SnapshotProvider for JsonFileSource {
    async fn snapshot(&mut self) -> SourceResult<BoardSnapshot> {
        let document = match self.read().await {
            Ok(document) => document,
            Err(e) => {
                self.pending_moves.lock().take();
                return Err(e);
            }
        };
        tracing::debug!("[SOURCE] Board state pieces found: {}", document.pieces.len());
        *self.pending_moves.lock() = Some(document.moves);
        Ok(document.pieces)
    }

    async fn refresh(&mut self) -> SourceResult<()> {
        self.check_exists().await
    }

    async fn reload(&mut self) -> SourceResult<()> {
        self.check_exists().await?;
        self.read().await.map(|_| ())
    }
}

#[async_trait]
impl MoveLogProvider for JsonFileSource {
    async fn move_log(&mut self) -> SourceResult<Vec<String>> {
        let pending = self.pending_moves.lock().take();
        match pending {
            Some(moves) => Ok(moves),
            None => Ok(self.read().await?.moves),
        }
    }
}
