//! Shared fixtures: spy handlers, collecting speech, scripted confirmations.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use veda_core::DispatchOutcome;
use veda_interfaces::SpeechOutput;
use veda_memory::{ActivityLog, SharedActivityLog};
use veda_policy::Confirmer;
use veda_tools::ActionHandler;

/// Handler that records every call and returns a fixed outcome.
pub struct SpyHandler {
    name: &'static str,
    outcome: DispatchOutcome,
    pub calls: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl SpyHandler {
    pub fn ok(name: &'static str, message: &str) -> (Arc<Self>, Arc<Mutex<Vec<serde_json::Value>>>) {
        Self::with_outcome(name, DispatchOutcome::ok(message))
    }

    pub fn failing(
        name: &'static str,
        message: &str,
    ) -> (Arc<Self>, Arc<Mutex<Vec<serde_json::Value>>>) {
        Self::with_outcome(name, DispatchOutcome::fail(message))
    }

    fn with_outcome(
        name: &'static str,
        outcome: DispatchOutcome,
    ) -> (Arc<Self>, Arc<Mutex<Vec<serde_json::Value>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let handler = Arc::new(Self {
            name,
            outcome,
            calls: calls.clone(),
        });
        (handler, calls)
    }
}

#[async_trait]
impl ActionHandler for SpyHandler {
    fn name(&self) -> &str {
        self.name
    }

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
        self.calls.lock().push(params.clone());
        self.outcome.clone()
    }
}

/// Speech sink that keeps everything spoken, with its priority flag.
#[derive(Default)]
pub struct CollectingSpeech {
    pub lines: Mutex<Vec<(String, bool)>>,
}

impl CollectingSpeech {
    pub fn spoke(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|(line, _)| line.contains(needle))
    }
}

#[async_trait]
impl SpeechOutput for CollectingSpeech {
    async fn speak(&self, text: &str, priority: bool) {
        self.lines.lock().push((text.to_string(), priority));
    }
}

/// Confirmer that plays back a fixed list of replies, then `None`.
pub struct ScriptedConfirmer {
    replies: Mutex<Vec<Option<String>>>,
}

impl ScriptedConfirmer {
    pub fn new(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
        }
    }

    pub fn silent() -> Self {
        Self::new(vec![])
    }
}

#[async_trait]
impl Confirmer for ScriptedConfirmer {
    async fn read_reply(&self, _prompt: &str) -> Option<String> {
        let mut replies = self.replies.lock();
        if replies.is_empty() {
            None
        } else {
            replies.remove(0)
        }
    }
}

pub fn temp_log(dir: &std::path::Path) -> SharedActivityLog {
    SharedActivityLog::new(ActivityLog::open(dir.join("activity_log.json")).unwrap())
}
