//! Append-only activity log backing the undo subsystem.
//!
//! Entries are kept in memory and mirrored to a JSON file after every
//! mutation (atomic temp-file + rename). Insertion order is temporal order.
//! The only in-place mutation allowed is the single pending undo entry
//! transitioning to success or failed.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Pending,
    Success,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub action: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub status: ActionStatus,
    pub detail: String,
    pub timestamp: i64,
}

pub struct ActivityLog {
    path: PathBuf,
    entries: Vec<ActivityEntry>,
}

impl ActivityLog {
    /// Opens the log file, creating parent directories and loading any
    /// existing entries.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };

        tracing::info!(path = %path.display(), entries = entries.len(), "activity log opened");
        Ok(Self { path, entries })
    }

    pub fn log_action(
        &mut self,
        action: &str,
        params: serde_json::Value,
        status: ActionStatus,
        detail: &str,
    ) -> Result<(), MemoryError> {
        self.entries.push(ActivityEntry {
            action: action.to_string(),
            params,
            status,
            detail: detail.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        });
        tracing::debug!(action, ?status, "activity logged");
        self.persist()
    }

    /// Removes and returns the most recent entry that is not itself an undo
    /// record. Undo entries stay in the stored sequence; they are only
    /// skipped when looking for "the last action".
    pub fn pop_last_action(&mut self) -> Result<Option<ActivityEntry>, MemoryError> {
        let index = self
            .entries
            .iter()
            .rposition(|entry| entry.action != "undo");
        let Some(index) = index else {
            return Ok(None);
        };
        let entry = self.entries.remove(index);
        self.persist()?;
        Ok(Some(entry))
    }

    /// Transitions the single pending entry (an undo in flight) to a final
    /// status. Returns false when no pending entry exists.
    pub fn resolve_pending(
        &mut self,
        status: ActionStatus,
        detail: &str,
    ) -> Result<bool, MemoryError> {
        let pending = self
            .entries
            .iter_mut()
            .rev()
            .find(|entry| entry.status == ActionStatus::Pending);
        match pending {
            Some(entry) => {
                entry.status = status;
                entry.detail = detail.to_string();
                self.persist()?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Atomic write: temp file in the same directory, then rename.
    fn persist(&self) -> Result<(), MemoryError> {
        let temp = self.path.with_extension("tmp");
        let content = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// Cloneable handle to the activity log. The main loop is the only thread
/// that ever calls through it; the mutex exists so feature modules and the
/// router can share one log without threading `&mut` everywhere.
#[derive(Clone)]
pub struct SharedActivityLog {
    inner: Arc<Mutex<ActivityLog>>,
}

impl SharedActivityLog {
    pub fn new(log: ActivityLog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(log)),
        }
    }

    pub fn log_action(
        &self,
        action: &str,
        params: serde_json::Value,
        status: ActionStatus,
        detail: &str,
    ) -> Result<(), MemoryError> {
        self.inner.lock().log_action(action, params, status, detail)
    }

    pub fn pop_last_action(&self) -> Result<Option<ActivityEntry>, MemoryError> {
        self.inner.lock().pop_last_action()
    }

    pub fn resolve_pending(&self, status: ActionStatus, detail: &str) -> Result<bool, MemoryError> {
        self.inner.lock().resolve_pending(status, detail)
    }

    pub fn snapshot(&self) -> Vec<ActivityEntry> {
        self.inner.lock().entries().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open_temp() -> (tempfile::TempDir, ActivityLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = ActivityLog::open(dir.path().join("activity_log.json")).unwrap();
        (dir, log)
    }

    #[test]
    fn test_append_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activity_log.json");

        {
            let mut log = ActivityLog::open(&path).unwrap();
            log.log_action("open_app", json!({"app": "firefox"}), ActionStatus::Success, "ok")
                .unwrap();
            log.log_action("quit", json!({}), ActionStatus::Success, "exit")
                .unwrap();
        }

        let log = ActivityLog::open(&path).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].action, "open_app");
    }

    #[test]
    fn test_pop_skips_undo_entries() {
        let (_dir, mut log) = open_temp();
        log.log_action("open_app", json!({"app": "code"}), ActionStatus::Success, "ok")
            .unwrap();
        log.log_action("undo", json!({"original": "x"}), ActionStatus::Success, "noted")
            .unwrap();

        let popped = log.pop_last_action().unwrap().unwrap();
        assert_eq!(popped.action, "open_app");
        // The undo entry itself remains in the stored sequence.
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].action, "undo");
    }

    #[test]
    fn test_pop_on_empty_log() {
        let (_dir, mut log) = open_temp();
        assert!(log.pop_last_action().unwrap().is_none());

        log.log_action("undo", json!({}), ActionStatus::Success, "noted")
            .unwrap();
        // Only undo entries present: still nothing eligible.
        assert!(log.pop_last_action().unwrap().is_none());
    }

    #[test]
    fn test_resolve_pending_transition() {
        let (_dir, mut log) = open_temp();
        log.log_action("undo", json!({"original": "open_app"}), ActionStatus::Pending, "reversing")
            .unwrap();

        assert!(log.resolve_pending(ActionStatus::Success, "reversed").unwrap());
        assert_eq!(log.entries()[0].status, ActionStatus::Success);
        // No pending entry left to resolve.
        assert!(!log.resolve_pending(ActionStatus::Failed, "x").unwrap());
    }
}
