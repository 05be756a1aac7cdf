use serde::{Deserialize, Serialize};

/// Where a command came from. Voice is checked before keyboard each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandSource {
    Voice,
    Keyboard,
}

/// One piece of raw user input, produced by the input multiplexer and
/// discarded after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    pub text: String,
    pub source: CommandSource,
    pub timestamp: i64,
}

impl Command {
    pub fn new(text: impl Into<String>, source: CommandSource) -> Self {
        Self {
            text: text.into(),
            source,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// A structured action the classifier extracted from free text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionRequest {
    pub name: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl ActionRequest {
    pub fn new(name: impl Into<String>, params: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            params,
            explanation: None,
        }
    }

    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        self.explanation = Some(explanation.into());
        self
    }

    /// String parameter lookup with a default, the common case for handlers.
    pub fn param_str<'a>(params: &'a serde_json::Value, key: &str) -> &'a str {
        params.get(key).and_then(|v| v.as_str()).unwrap_or("")
    }

    pub fn param_bool(params: &serde_json::Value, key: &str, default: bool) -> bool {
        params.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }
}

/// The result of routing one action. Failures are values, never panics or
/// errors; every router entry and feature module returns one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchOutcome {
    pub success: bool,
    pub message: String,
}

impl DispatchOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// What the classifier decided about a piece of resolved text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BrainReply {
    Conversation { reply: String },
    Action(ActionRequest),
}
