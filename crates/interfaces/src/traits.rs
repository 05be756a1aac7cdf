use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use veda_core::BrainReply;

#[derive(Debug, Error)]
pub enum BrainError {
    #[error("Provider error: {0}")]
    Provider(String),
}

/// Classifier collaborator: turns resolved text into a conversation reply or
/// a structured action request.
#[async_trait]
pub trait Brain: Send + Sync {
    async fn process(&self, text: &str) -> Result<BrainReply, BrainError>;
}

/// Speech-output collaborator. Priority output is for control-flow
/// announcements that must not be swallowed by a busy queue.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    async fn speak(&self, text: &str, priority: bool);
}

/// Voice-input collaborator. The implementation owns its producer thread;
/// the consumer side is non-blocking apart from the bounded `get_command`.
pub trait VoiceInput: Send + Sync {
    fn start(&self);
    fn stop(&self);
    fn has_command(&self) -> bool;
    fn get_command(&self, timeout: Duration) -> Option<String>;
}
