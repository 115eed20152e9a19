//! Undo/Redo System
//!
//! Each action stores complete state_before and state_after snapshots of
//! the session so a whole pipeline stage undoes in one step.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, VaError};
use crate::session::model::SessionState;

/// Default maximum number of undo levels to keep.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// File name for the undo stack persistence.
const UNDO_STACK_FILE: &str = "undo_stack.json";

/// File name for the redo stack persistence.
const REDO_STACK_FILE: &str = "redo_stack.json";

/// File name for the action log persistence.
const ACTION_LOG_FILE: &str = "action_log.json";

/// A single undoable action with complete state snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoAction {
    /// Unique identifier for this action.
    pub id: String,

    /// Human-readable description, the label the undo block closed with.
    pub description: String,

    /// When the action was performed.
    pub timestamp: DateTime<Utc>,

    /// Complete session state before the action.
    pub state_before: serde_json::Value,

    /// Complete session state after the action.
    pub state_after: serde_json::Value,
}

impl UndoAction {
    /// Create a new undo action with a generated UUID.
    pub fn new(
        description: impl Into<String>,
        state_before: serde_json::Value,
        state_after: serde_json::Value,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: description.into(),
            timestamp: Utc::now(),
            state_before,
            state_after,
        }
    }
}

/// Manages undo/redo for a session.
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: Vec<UndoAction>,
    redo_stack: Vec<UndoAction>,
    max_undo_levels: usize,
    /// Complete history of all actions (for display).
    action_log: Vec<UndoAction>,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_LEVELS)
    }
}

fn read_stack(path: &Path) -> Result<Vec<UndoAction>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

impl UndoManager {
    /// Create a new undo manager with the specified maximum undo levels.
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_levels: max_levels,
            action_log: Vec::new(),
        }
    }

    /// Load undo manager state from the history directory.
    ///
    /// Missing files load as empty stacks.
    pub fn load(history_dir: &Path) -> Result<Self> {
        Ok(Self {
            undo_stack: read_stack(&history_dir.join(UNDO_STACK_FILE))?,
            redo_stack: read_stack(&history_dir.join(REDO_STACK_FILE))?,
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
            action_log: read_stack(&history_dir.join(ACTION_LOG_FILE))?,
        })
    }

    /// Save undo manager state to the history directory.
    pub fn save(&self, history_dir: &Path) -> Result<()> {
        fs::create_dir_all(history_dir)?;

        fs::write(
            history_dir.join(UNDO_STACK_FILE),
            serde_json::to_string_pretty(&self.undo_stack)?,
        )?;
        fs::write(
            history_dir.join(REDO_STACK_FILE),
            serde_json::to_string_pretty(&self.redo_stack)?,
        )?;
        fs::write(
            history_dir.join(ACTION_LOG_FILE),
            serde_json::to_string_pretty(&self.action_log)?,
        )?;

        Ok(())
    }

    /// Push a new action onto the undo stack.
    ///
    /// This clears the redo stack (since the history has diverged)
    /// and trims the undo stack if it exceeds max_undo_levels.
    pub fn push(&mut self, action: UndoAction) {
        self.redo_stack.clear();
        self.action_log.push(action.clone());
        self.undo_stack.push(action);
        self.trim_history();
    }

    /// Undo the last action, restoring the state it started from.
    pub fn undo(&mut self, state: &mut SessionState) -> Result<UndoAction> {
        let action = self.undo_stack.pop().ok_or(VaError::NothingToUndo)?;
        *state = serde_json::from_value(action.state_before.clone())?;
        self.redo_stack.push(action.clone());
        Ok(action)
    }

    /// Redo the last undone action, restoring the state it produced.
    pub fn redo(&mut self, state: &mut SessionState) -> Result<UndoAction> {
        let action = self.redo_stack.pop().ok_or(VaError::NothingToRedo)?;
        *state = serde_json::from_value(action.state_after.clone())?;
        self.undo_stack.push(action.clone());
        Ok(action)
    }

    /// Get the complete action history log.
    pub fn get_history(&self) -> &[UndoAction] {
        &self.action_log
    }

    /// Number of actions that can be undone.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of actions that can be redone.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop the oldest actions beyond max_undo_levels.
    pub fn trim_history(&mut self) {
        if self.undo_stack.len() > self.max_undo_levels {
            let excess = self.undo_stack.len() - self.max_undo_levels;
            self.undo_stack.drain(..excess);
        }
    }

    /// Peek at the action the next undo would revert.
    pub fn peek_undo(&self) -> Option<&UndoAction> {
        self.undo_stack.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::model::Track;
    use tempfile::tempdir;

    fn state_with_tracks(names: &[&str]) -> SessionState {
        SessionState {
            tracks: names.iter().map(|n| Track::new(*n)).collect(),
            ..Default::default()
        }
    }

    fn action(label: &str, before: &SessionState, after: &SessionState) -> UndoAction {
        UndoAction::new(
            label,
            serde_json::to_value(before).unwrap(),
            serde_json::to_value(after).unwrap(),
        )
    }

    #[test]
    fn test_undo_redo_restores_snapshots() {
        let before = state_with_tracks(&[]);
        let after = state_with_tracks(&["Alice", "Bob"]);
        let mut manager = UndoManager::default();
        manager.push(action("Import voice lines", &before, &after));

        let mut state = after.clone();
        let undone = manager.undo(&mut state).unwrap();
        assert_eq!(undone.description, "Import voice lines");
        assert_eq!(state, before);
        assert_eq!(manager.redo_count(), 1);

        manager.redo(&mut state).unwrap();
        assert_eq!(state, after);
        assert_eq!(manager.undo_count(), 1);
    }

    #[test]
    fn test_empty_stacks() {
        let mut manager = UndoManager::default();
        let mut state = SessionState::default();
        assert!(matches!(manager.undo(&mut state), Err(VaError::NothingToUndo)));
        assert!(matches!(manager.redo(&mut state), Err(VaError::NothingToRedo)));
    }

    #[test]
    fn test_push_clears_redo() {
        let a = state_with_tracks(&["A"]);
        let b = state_with_tracks(&["A", "B"]);
        let mut manager = UndoManager::default();
        manager.push(action("one", &a, &b));
        let mut state = b.clone();
        manager.undo(&mut state).unwrap();
        manager.push(action("two", &a, &b));
        assert_eq!(manager.redo_count(), 0);
        assert_eq!(manager.get_history().len(), 2);
    }

    #[test]
    fn test_trim_history() {
        let s = SessionState::default();
        let mut manager = UndoManager::new(2);
        for label in ["one", "two", "three"] {
            manager.push(action(label, &s, &s));
        }
        assert_eq!(manager.undo_count(), 2);
        assert_eq!(manager.peek_undo().unwrap().description, "three");
        assert_eq!(manager.get_history().len(), 3);
    }

    #[test]
    fn test_save_load() {
        let dir = tempdir().unwrap();
        let history_dir = dir.path().join("history");
        let a = state_with_tracks(&[]);
        let b = state_with_tracks(&["Alice"]);

        let mut manager = UndoManager::default();
        manager.push(action("Import voice lines", &a, &b));
        manager.save(&history_dir).unwrap();

        let loaded = UndoManager::load(&history_dir).unwrap();
        assert_eq!(loaded.undo_count(), 1);
        assert_eq!(loaded.redo_count(), 0);
        assert_eq!(loaded.get_history()[0].description, "Import voice lines");
    }
}
