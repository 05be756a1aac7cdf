//! Conversation transcript and context anchors.
//!
//! Anchors remember the last app, search query, and URL so a follow-up like
//! "close it" can be resolved locally before the classifier sees the text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub content: String,
    pub timestamp: i64,
}

#[derive(Debug, Default)]
pub struct ContextManager {
    transcript: Vec<TranscriptEntry>,
    last_app: Option<String>,
    last_query: Option<String>,
    last_url: Option<String>,
    last_action: Option<serde_json::Value>,
}

const APP_VERBS: &[&str] = &["open", "close", "kill", "launch", "start", "quit"];
const QUERY_VERBS: &[&str] = &["search", "play", "look", "google", "find"];

impl ContextManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&mut self, text: &str) {
        self.push("user", text);
    }

    pub fn add_assistant(&mut self, text: &str) {
        self.push("assistant", text);
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    pub fn set_last_app(&mut self, app: &str) {
        if !app.is_empty() {
            self.last_app = Some(app.to_string());
        }
    }

    pub fn set_last_query(&mut self, query: &str) {
        if !query.is_empty() {
            self.last_query = Some(query.to_string());
        }
    }

    pub fn set_last_url(&mut self, url: &str) {
        if !url.is_empty() {
            self.last_url = Some(url.to_string());
        }
    }

    pub fn set_last_action(&mut self, action: serde_json::Value) {
        self.last_action = Some(action);
    }

    pub fn last_app(&self) -> Option<&str> {
        self.last_app.as_deref()
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    pub fn last_url(&self) -> Option<&str> {
        self.last_url.as_deref()
    }

    /// Substitutes "it"/"that" with the most plausible anchor based on the
    /// verb in the sentence. Returns the input unchanged when no anchor
    /// applies.
    pub fn resolve_pronouns(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        if !has_pronoun(&lower) {
            return text.to_string();
        }

        let anchor = if APP_VERBS.iter().any(|v| lower.contains(v)) {
            self.last_app.as_deref()
        } else if QUERY_VERBS.iter().any(|v| lower.contains(v)) {
            self.last_query.as_deref()
        } else if lower.contains("url") || lower.contains("page") || lower.contains("site") {
            self.last_url.as_deref()
        } else {
            self.last_app.as_deref().or(self.last_query.as_deref())
        };

        match anchor {
            Some(anchor) => replace_pronoun(text, anchor),
            None => text.to_string(),
        }
    }

    fn push(&mut self, role: &str, content: &str) {
        self.transcript.push(TranscriptEntry {
            role: role.to_string(),
            content: content.to_string(),
            timestamp: chrono::Utc::now().timestamp(),
        });
    }
}

fn has_pronoun(lower: &str) -> bool {
    lower
        .split_whitespace()
        .any(|word| matches!(word.trim_matches(|c: char| !c.is_alphanumeric()), "it" | "that" | "this"))
}

fn replace_pronoun(text: &str, anchor: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let core = word.trim_matches(|c: char| !c.is_alphanumeric());
            if matches!(core.to_lowercase().as_str(), "it" | "that" | "this") {
                word.replace(core, anchor)
            } else {
                word.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolves_app_pronoun() {
        let mut ctx = ContextManager::new();
        ctx.set_last_app("firefox");
        assert_eq!(ctx.resolve_pronouns("close it"), "close firefox");
    }

    #[test]
    fn test_resolves_query_pronoun() {
        let mut ctx = ContextManager::new();
        ctx.set_last_query("rust borrow checker");
        assert_eq!(
            ctx.resolve_pronouns("search that again"),
            "search rust borrow checker again"
        );
    }

    #[test]
    fn test_no_anchor_leaves_text_alone() {
        let ctx = ContextManager::new();
        assert_eq!(ctx.resolve_pronouns("close it"), "close it");
        assert_eq!(ctx.resolve_pronouns("open firefox"), "open firefox");
    }

    #[test]
    fn test_empty_anchor_values_ignored() {
        let mut ctx = ContextManager::new();
        ctx.set_last_app("");
        assert!(ctx.last_app().is_none());
    }

    #[test]
    fn test_transcript_roles() {
        let mut ctx = ContextManager::new();
        ctx.add_user("hello");
        ctx.add_assistant("hi there");
        assert_eq!(ctx.transcript().len(), 2);
        assert_eq!(ctx.transcript()[0].role, "user");
        assert_eq!(ctx.transcript()[1].role, "assistant");
    }
}
