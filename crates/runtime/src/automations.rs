//! Named multi-step routines and their time triggers.
//!
//! Routines are ordered action lists loaded from a YAML file, merged over a
//! small built-in set. Schedules fire a routine once per day at an HH:MM
//! mark; the main loop polls them so no second dispatcher thread exists.

use crate::error::RuntimeError;
use chrono::{DateTime, Local, NaiveDate};
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;
use veda_core::ActionRequest;

#[derive(Debug, Default)]
pub struct AutomationBook {
    routines: HashMap<String, Vec<ActionRequest>>,
}

impl AutomationBook {
    /// Built-in routines, available even without an automations file.
    pub fn builtin() -> Self {
        let mut routines = HashMap::new();
        routines.insert(
            "good morning".to_string(),
            vec![
                ActionRequest::new("wifi_toggle", json!({"state": true})),
                ActionRequest::new("set_brightness", json!({"direction": "up"})),
                ActionRequest::new("open_news", json!({})),
            ],
        );
        routines.insert(
            "good night".to_string(),
            vec![
                ActionRequest::new("set_brightness", json!({"direction": "down"})),
                ActionRequest::new("control_light", json!({"state": false})),
                ActionRequest::new("wifi_toggle", json!({"state": false})),
            ],
        );
        routines.insert(
            "start work".to_string(),
            vec![
                ActionRequest::new("open_app", json!({"app": "editor"})),
                ActionRequest::new("open_app", json!({"app": "browser"})),
                ActionRequest::new("set_volume", json!({"direction": "mute"})),
            ],
        );
        routines.insert(
            "backup files".to_string(),
            vec![
                ActionRequest::new("organize_downloads", json!({})),
                ActionRequest::new("compress_folder", json!({"folder": "Documents"})),
            ],
        );
        Self { routines }
    }

    /// Built-ins plus routines from `path`, file entries winning on name
    /// clashes. A missing file is not an error.
    pub fn load(path: &Path) -> Result<Self, RuntimeError> {
        let mut book = Self::builtin();
        if !path.exists() {
            return Ok(book);
        }
        let content = std::fs::read_to_string(path)?;
        let loaded: HashMap<String, Vec<ActionRequest>> = serde_yaml::from_str(&content)?;
        tracing::info!(path = %path.display(), routines = loaded.len(), "automations loaded");
        // Lookups lowercase the name, so keys must land lowercased too.
        book.routines
            .extend(loaded.into_iter().map(|(k, v)| (k.to_lowercase(), v)));
        Ok(book)
    }

    pub fn get(&self, name: &str) -> Option<&[ActionRequest]> {
        self.routines.get(&name.to_lowercase()).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routines.contains_key(&name.to_lowercase())
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// One daily time trigger for a routine.
#[derive(Debug, Clone)]
pub struct Schedule {
    pub routine: String,
    /// HH:MM, 24-hour.
    pub at: String,
    last_fired: Option<NaiveDate>,
}

impl Schedule {
    pub fn new(routine: impl Into<String>, at: impl Into<String>) -> Self {
        Self {
            routine: routine.into(),
            at: at.into(),
            last_fired: None,
        }
    }

    pub fn valid_time(at: &str) -> bool {
        chrono::NaiveTime::parse_from_str(at, "%H:%M").is_ok()
    }

    /// True when the clock reads the trigger minute and the routine has not
    /// fired yet today.
    pub fn due(&self, now: DateTime<Local>) -> bool {
        self.last_fired != Some(now.date_naive()) && now.format("%H:%M").to_string() == self.at
    }

    pub fn mark_fired(&mut self, now: DateTime<Local>) {
        self.last_fired = Some(now.date_naive());
    }
}
