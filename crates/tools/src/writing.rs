//! Notes, reminders, and quick file summaries.

use crate::record;
use crate::traits::ActionHandler;
use async_trait::async_trait;
use std::path::PathBuf;
use veda_core::{ActionRequest, DispatchOutcome};
use veda_memory::SharedActivityLog;

pub struct WriteNote {
    pub notes_dir: PathBuf,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for WriteNote {
    fn name(&self) -> &str {
        "write_note"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let text = ActionRequest::param_str(params, "text");
        let outcome = if text.is_empty() {
            DispatchOutcome::fail("What should the note say?")
        } else if ActionRequest::param_str(params, "type") == "reminder" {
            let time = ActionRequest::param_str(params, "time");
            self.append_reminder(text, time).await
        } else {
            let title = params.get("title").and_then(|v| v.as_str());
            self.save_note(text, title).await
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

impl WriteNote {
    async fn save_note(&self, text: &str, title: Option<&str>) -> DispatchOutcome {
        let stem = title
            .map(|t| t.replace(' ', "_"))
            .unwrap_or_else(|| format!("note-{}", chrono::Local::now().format("%Y%m%d-%H%M%S")));
        if let Err(e) = tokio::fs::create_dir_all(&self.notes_dir).await {
            return DispatchOutcome::fail(format!("Couldn't save the note: {e}"));
        }
        let path = self.notes_dir.join(format!("{stem}.md"));
        match tokio::fs::write(&path, text).await {
            Ok(()) => DispatchOutcome::ok(format!("Note saved as {}.", path.display())),
            Err(e) => DispatchOutcome::fail(format!("Couldn't save the note: {e}")),
        }
    }

    async fn append_reminder(&self, text: &str, time: &str) -> DispatchOutcome {
        if let Err(e) = tokio::fs::create_dir_all(&self.notes_dir).await {
            return DispatchOutcome::fail(format!("Couldn't save the reminder: {e}"));
        }
        let path = self.notes_dir.join("reminders.txt");
        let line = if time.is_empty() {
            format!("{text}\n")
        } else {
            format!("{text} (at {time})\n")
        };
        let existing = tokio::fs::read_to_string(&path).await.unwrap_or_default();
        match tokio::fs::write(&path, existing + &line).await {
            Ok(()) => DispatchOutcome::ok("Reminder saved."),
            Err(e) => DispatchOutcome::fail(format!("Couldn't save the reminder: {e}")),
        }
    }
}

pub struct GetReminders {
    pub notes_dir: PathBuf,
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for GetReminders {
    fn name(&self) -> &str {
        "get_reminders"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let path = self.notes_dir.join("reminders.txt");
        let content = tokio::fs::read_to_string(&path).await.unwrap_or_default();
        let reminders: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        // Listing reminders is always a success, even when empty.
        let outcome = if reminders.is_empty() {
            DispatchOutcome::ok("You have no reminders.")
        } else {
            DispatchOutcome::ok(format!(
                "You have {} reminders: {}",
                reminders.len(),
                reminders.join("; ")
            ))
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

/// First `n` sentences of a text, used as a cheap summary.
pub fn leading_sentences(text: &str, n: usize) -> String {
    let mut out = String::new();
    let mut count = 0;
    for chunk in text.split_inclusive(['.', '!', '?']) {
        out.push_str(chunk);
        count += 1;
        if count >= n {
            break;
        }
    }
    out.trim().to_string()
}

pub struct Summarize {
    pub log: SharedActivityLog,
}

#[async_trait]
impl ActionHandler for Summarize {
    fn name(&self) -> &str {
        "summarize"
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        let file = ActionRequest::param_str(params, "file");
        let outcome = if file.is_empty() {
            DispatchOutcome::fail("Which file should I summarize?")
        } else {
            match tokio::fs::read_to_string(file).await {
                Ok(content) if content.trim().is_empty() => {
                    DispatchOutcome::fail(format!("{file} is empty."))
                }
                Ok(content) => {
                    DispatchOutcome::ok(format!("Here's the gist: {}", leading_sentences(&content, 3)))
                }
                Err(e) => DispatchOutcome::fail(format!("I couldn't read {file}: {e}")),
            }
        };
        record(&self.log, self.name(), params, &outcome);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use veda_memory::ActivityLog;

    fn test_log(dir: &std::path::Path) -> SharedActivityLog {
        SharedActivityLog::new(ActivityLog::open(dir.join("log.json")).unwrap())
    }

    #[test]
    fn test_leading_sentences_cuts_at_limit() {
        let text = "One. Two! Three? Four.";
        assert_eq!(leading_sentences(text, 2), "One. Two!");
        assert_eq!(leading_sentences(text, 10), text);
        assert_eq!(leading_sentences("no terminator", 2), "no terminator");
    }

    #[tokio::test]
    async fn test_note_and_reminder_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let notes_dir = dir.path().join("notes");
        let log = test_log(dir.path());

        let write = WriteNote {
            notes_dir: notes_dir.clone(),
            log: log.clone(),
        };
        let outcome = write
            .run(&json!({"type": "reminder", "text": "water plants", "time": "09:00"}))
            .await;
        assert!(outcome.success);

        let get = GetReminders {
            notes_dir,
            log,
        };
        let outcome = get.run(&json!({})).await;
        assert!(outcome.success);
        assert!(outcome.message.contains("water plants"));
    }

    #[tokio::test]
    async fn test_get_reminders_empty_is_success() {
        let dir = tempfile::tempdir().unwrap();
        let get = GetReminders {
            notes_dir: dir.path().join("notes"),
            log: test_log(dir.path()),
        };
        let outcome = get.run(&json!({})).await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "You have no reminders.");
    }
}
