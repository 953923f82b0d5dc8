//! Undo/redo history over reversible commands.
//!
//! A transaction is the list of commands one user action produced. Undo and
//! redo replay a transaction's commands in recorded order, with recording
//! switched off so the replay itself never lands on a stack.

mod command;
pub mod snapshot;

pub use command::Command;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::CalcModel;

/// Commands applied and reverted together as one history entry.
pub type Transaction = Vec<Command>;

/// History limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Oldest transactions are dropped beyond this depth (0 = unlimited).
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 1000 }
    }
}

#[derive(Debug, Clone, Copy)]
enum Replay {
    Undo,
    Redo,
}

/// Linear undo/redo stacks.
#[derive(Debug, Clone, Default)]
pub struct ActionHistory {
    undo_stack: Vec<Transaction>,
    redo_stack: Vec<Transaction>,
    /// Recording is suspended while a transaction is being replayed
    replaying: bool,
    config: HistoryConfig,
}

impl ActionHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Whether new transactions are currently accepted.
    pub fn is_recording(&self) -> bool {
        !self.replaying
    }

    /// Record a transaction. Empty transactions and pushes made during
    /// replay are ignored. Any new transaction invalidates the redo stack.
    pub fn push(&mut self, transaction: Transaction) {
        if self.replaying || transaction.is_empty() {
            return;
        }
        self.undo_stack.push(transaction);
        self.redo_stack.clear();
        if self.config.max_entries > 0 && self.undo_stack.len() > self.config.max_entries {
            let excess = self.undo_stack.len() - self.config.max_entries;
            self.undo_stack.drain(..excess);
        }
    }

    /// Revert the last transaction. Returns it, or `None` if there was nothing to undo.
    pub fn undo<M: CalcModel + ?Sized>(&mut self, model: &mut M) -> Result<Option<&Transaction>> {
        self.replay(model, Replay::Undo)
    }

    /// Re-apply the last undone transaction.
    pub fn redo<M: CalcModel + ?Sized>(&mut self, model: &mut M) -> Result<Option<&Transaction>> {
        self.replay(model, Replay::Redo)
    }

    fn replay<M: CalcModel + ?Sized>(
        &mut self,
        model: &mut M,
        direction: Replay,
    ) -> Result<Option<&Transaction>> {
        let (from, to) = match direction {
            Replay::Undo => (&mut self.undo_stack, &mut self.redo_stack),
            Replay::Redo => (&mut self.redo_stack, &mut self.undo_stack),
        };
        let Some(transaction) = from.pop() else {
            return Ok(None);
        };
        log::debug!(
            "{direction:?}: replaying {} command(s)",
            transaction.len()
        );
        self.replaying = true;
        let outcome = transaction.iter().try_for_each(|command| match direction {
            Replay::Undo => command.undo(model),
            Replay::Redo => command.redo(model),
        });
        self.replaying = false;
        if let Err(e) = outcome {
            log::warn!("{direction:?} failed: {e}");
            from.push(transaction);
            return Err(e);
        }
        to.push(transaction);
        Ok(to.last())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// The transaction `undo` would revert next.
    pub fn last_transaction(&self) -> Option<&Transaction> {
        self.undo_stack.last()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::model::MemoryModel;

    fn set(row: u32, old: &str, new: &str) -> Command {
        Command::SetCellValue {
            sheet: 0,
            row,
            column: 1,
            old_value: old.into(),
            new_value: new.into(),
        }
    }

    #[test]
    fn test_empty_push_is_skipped() {
        let mut history = ActionHistory::default();
        let mut model = MemoryModel::new();
        history.push(Vec::new());
        assert!(!history.can_undo());
        assert!(history.undo(&mut model).unwrap().is_none());
    }

    #[test]
    fn test_push_clears_redo() {
        let mut history = ActionHistory::default();
        let mut model = MemoryModel::new();
        let tx = vec![set(1, "", "a")];
        tx[0].redo(&mut model).unwrap();
        history.push(tx);
        history.undo(&mut model).unwrap();
        assert!(history.can_redo());
        history.push(vec![set(2, "", "b")]);
        assert!(!history.can_redo());
    }

    #[test]
    fn test_max_entries_drops_oldest() {
        let mut history = ActionHistory::new(HistoryConfig { max_entries: 2 });
        for row in 1..=3 {
            history.push(vec![set(row, "", "x")]);
        }
        assert_eq!(history.undo_len(), 2);
        assert_eq!(history.last_transaction(), Some(&vec![set(3, "", "x")]));
    }

    #[test]
    fn test_failed_replay_restores_stack() {
        let mut history = ActionHistory::default();
        let mut model = MemoryModel::new();
        // sheet 5 does not exist: undo fails
        history.push(vec![Command::SetCellValue {
            sheet: 5,
            row: 1,
            column: 1,
            old_value: String::new(),
            new_value: "x".into(),
        }]);
        assert!(history.undo(&mut model).is_err());
        assert!(history.can_undo());
        assert!(!history.can_redo());
        assert!(history.is_recording());
    }
}
