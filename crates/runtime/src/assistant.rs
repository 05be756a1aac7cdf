//! The main assistant loop: one command in, one outcome out, forever, until
//! quit. Crashes stay inside the cycle; a failed turn is spoken, logged, and
//! followed by a short backoff rather than a dead process.

use crate::mux::InputMultiplexer;
use crate::router::Router;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use veda_core::{BrainReply, Command};
use veda_interfaces::{Brain, SpeechOutput, VoiceInput};
use veda_memory::ActionStatus;

const ERROR_BACKOFF: Duration = Duration::from_secs(1);

pub struct Assistant {
    brain: Arc<dyn Brain>,
    voice: Arc<dyn VoiceInput>,
    speech: Arc<dyn SpeechOutput>,
    mux: InputMultiplexer,
    router: Router,
}

impl Assistant {
    pub fn new(
        brain: Arc<dyn Brain>,
        voice: Arc<dyn VoiceInput>,
        speech: Arc<dyn SpeechOutput>,
        mux: InputMultiplexer,
        router: Router,
    ) -> Self {
        Self {
            brain,
            voice,
            speech,
            mux,
            router,
        }
    }

    /// Runs until quit is requested. Never returns an error; every failure
    /// mode is handled inside the cycle.
    pub async fn run(&mut self) {
        loop {
            if self.router.emergency_stopped() {
                self.stopped_cycle().await;
                if self.router.exit_requested() {
                    break;
                }
                continue;
            }

            self.router.fire_due_schedules().await;

            let Some(command) = self.mux.next_command().await else {
                continue;
            };
            self.handle_command(command).await;

            if self.router.exit_requested() {
                break;
            }
        }
        self.voice.stop();
    }

    /// Stopped mode: voice is muted and only `reset` or `quit` mean anything.
    async fn stopped_cycle(&mut self) {
        self.voice.stop();
        let Some(command) = self.mux.next_command().await else {
            return;
        };
        match command.text.trim().to_lowercase().as_str() {
            "reset" => {
                self.router.reset_emergency();
                self.voice.start();
                self.speech
                    .speak("Systems back online. What do you need?", true)
                    .await;
            }
            "quit" | "exit" => {
                let outcome = self
                    .router
                    .dispatch(veda_core::ActionRequest::new("quit", json!({})))
                    .await;
                self.speech.speak(&outcome.message, false).await;
            }
            _ => {
                self.speech
                    .speak(
                        "Emergency stop is active. Say reset to resume or quit to exit.",
                        true,
                    )
                    .await;
            }
        }
    }

    async fn handle_command(&mut self, command: Command) {
        tracing::debug!(source = ?command.source, text = %command.text, "command received");
        self.router.context_mut().add_user(&command.text);
        let resolved = self.router.context().resolve_pronouns(&command.text);

        match self.brain.process(&resolved).await {
            Ok(BrainReply::Conversation { reply }) => {
                self.speech.speak(&reply, false).await;
                self.router.context_mut().add_assistant(&reply);
            }
            Ok(BrainReply::Action(request)) => {
                let outcome = self.router.dispatch(request).await;
                let spoken = if outcome.success {
                    outcome.message.clone()
                } else {
                    format!("I ran into a problem: {}", outcome.message)
                };
                self.speech.speak(&spoken, false).await;
                self.router.context_mut().add_assistant(&spoken);
            }
            Err(e) => {
                tracing::error!(error = %e, "command processing failed");
                if let Err(log_err) = self.router.log().log_action(
                    "error",
                    json!({ "input": resolved }),
                    ActionStatus::Failed,
                    &e.to_string(),
                ) {
                    tracing::error!(error = %log_err, "error entry not persisted");
                }
                self.speech
                    .speak("Something went wrong, but I'm still here.", false)
                    .await;
                tokio::time::sleep(ERROR_BACKOFF).await;
            }
        }
    }
}
