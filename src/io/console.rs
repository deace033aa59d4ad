//! Presenter that reports suggestions through the log

use async_trait::async_trait;

use crate::board::Square;
use crate::core::ArrowColor;
use crate::pipeline::{BestMoveEvent, Presenter};

/// Logs each suggested move as an arrow and remembers it until cleared
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    shown: Option<(Square, Square)>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arrow currently on display
    pub fn shown(&self) -> Option<(Square, Square)> {
        self.shown
    }
}

#[async_trait]
impl Presenter for ConsolePresenter {
    async fn show_best_move(&mut self, event: &BestMoveEvent, color: &ArrowColor) -> anyhow::Result<()> {
        tracing::info!(
            "[ARROW] {} -> {} ({} / {}) {:?} move, eval {:+.2}",
            event.from,
            event.to,
            event.from.to_numeric(),
            event.to.to_numeric(),
            event.kind,
            event.evaluation
        );
        tracing::debug!("[ARROW] Colour {}", color.rgba());
        self.shown = Some((event.from, event.to));
        Ok(())
    }

    async fn clear(&mut self) -> anyhow::Result<()> {
        if let Some((from, to)) = self.shown.take() {
            tracing::info!("[ARROW] Cleared {from} -> {to}");
        }
        Ok(())
    }
}
