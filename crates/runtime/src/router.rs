//! Action router. Owns the registry, the security gate, the context anchors,
//! the emergency kill-switch, and the automation book; the assistant loop is
//! its only caller, so everything stays single-writer.
//!
//! Dispatch order per request: speak the explanation, intercept control
//! actions (these never touch the gate), then gate, then route to a built-in
//! or a registered handler. The outcome is always a value; nothing in here
//! panics or returns an error to the loop.

use crate::automations::{AutomationBook, Schedule};
use crate::undo::reversal_for;
use async_recursion::async_recursion;
use serde_json::json;
use std::sync::Arc;
use veda_core::{ActionRequest, DispatchOutcome, EmergencyController};
use veda_interfaces::SpeechOutput;
use veda_memory::{ActionStatus, ContextManager, SharedActivityLog};
use veda_policy::{Confirmer, SecurityGate};
use veda_tools::ActionRegistry;

pub struct Router {
    registry: ActionRegistry,
    gate: SecurityGate,
    confirmer: Arc<dyn Confirmer>,
    speech: Arc<dyn SpeechOutput>,
    log: SharedActivityLog,
    context: ContextManager,
    emergency: EmergencyController,
    automations: AutomationBook,
    schedules: Vec<Schedule>,
    exit_requested: bool,
}

impl Router {
    pub fn new(
        registry: ActionRegistry,
        gate: SecurityGate,
        confirmer: Arc<dyn Confirmer>,
        speech: Arc<dyn SpeechOutput>,
        log: SharedActivityLog,
        automations: AutomationBook,
    ) -> Self {
        Self {
            registry,
            gate,
            confirmer,
            speech,
            log,
            context: ContextManager::new(),
            emergency: EmergencyController::new(),
            automations,
            schedules: Vec::new(),
            exit_requested: false,
        }
    }

    pub fn context(&self) -> &ContextManager {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContextManager {
        &mut self.context
    }

    pub fn log(&self) -> &SharedActivityLog {
        &self.log
    }

    pub fn emergency_stopped(&self) -> bool {
        self.emergency.is_stopped()
    }

    pub fn reset_emergency(&mut self) {
        self.emergency.reset();
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Routes one action request to completion.
    #[async_recursion]
    pub async fn dispatch(&mut self, request: ActionRequest) -> DispatchOutcome {
        if let Some(explanation) = &request.explanation {
            self.speech.speak(explanation, false).await;
        }
        tracing::info!(action = %request.name, "dispatching");

        // Control actions bypass the gate: stopping or leaving must never
        // hang on a confirmation prompt.
        match request.name.as_str() {
            "emergency_stop" => return self.engage_emergency_stop(),
            "quit" => return self.request_exit(),
            "undo" => return self.handle_undo().await,
            _ => {}
        }

        if !self
            .gate
            .request_permission(&request.name, &request.params, self.confirmer.as_ref())
            .await
        {
            // Refusals are not activity: nothing happened, nothing to undo.
            return DispatchOutcome::fail("Action cancelled.");
        }

        match request.name.as_str() {
            "run_automation" => self.run_automation(&request.params).await,
            "multi_step" => self.run_multi_step(&request.params).await,
            "schedule_automation" => self.schedule_automation(&request.params),
            _ => self.execute(&request).await,
        }
    }

    /// Fires any schedule whose minute has arrived. Called by the loop at the
    /// top of each cycle; there is no separate timer thread. The fired
    /// routine goes through the full dispatch path, so the run_automation
    /// confirmation happens at fire time, not at scheduling time.
    pub async fn fire_due_schedules(&mut self) {
        let now = chrono::Local::now();
        let mut due = Vec::new();
        for schedule in &mut self.schedules {
            if schedule.due(now) {
                schedule.mark_fired(now);
                due.push(schedule.routine.clone());
            }
        }
        for routine in due {
            self.speech
                .speak(&format!("It's time for your \"{routine}\" routine."), false)
                .await;
            let outcome = self
                .dispatch(ActionRequest::new("run_automation", json!({ "name": routine })))
                .await;
            self.speech.speak(&outcome.message, false).await;
        }
    }

    fn engage_emergency_stop(&mut self) -> DispatchOutcome {
        self.emergency.trigger();
        self.note(
            "emergency_stop",
            json!({}),
            ActionStatus::Success,
            "All activity halted.",
        );
        DispatchOutcome::ok("Emergency stop engaged. Everything is on hold until you say reset.")
    }

    fn request_exit(&mut self) -> DispatchOutcome {
        self.exit_requested = true;
        self.note("quit", json!({}), ActionStatus::Success, "Session ended.");
        DispatchOutcome::ok("Goodbye!")
    }

    async fn handle_undo(&mut self) -> DispatchOutcome {
        let popped = match self.log.pop_last_action() {
            Ok(popped) => popped,
            Err(e) => {
                tracing::error!(error = %e, "activity log read failed");
                return DispatchOutcome::fail("I couldn't read the activity log.");
            }
        };
        let Some(entry) = popped else {
            return DispatchOutcome::fail("There's nothing to undo.");
        };

        match reversal_for(&entry.action, &entry.params) {
            Some(reverse) => {
                self.note(
                    "undo",
                    json!({ "original": entry.action }),
                    ActionStatus::Pending,
                    &format!("Reversing {}.", entry.action),
                );
                let reverse =
                    reverse.with_explanation(format!("Undoing {}", entry.action));
                let outcome = self.dispatch(reverse).await;

                let status = if outcome.success {
                    ActionStatus::Success
                } else {
                    ActionStatus::Failed
                };
                if let Err(e) = self.log.resolve_pending(status, &outcome.message) {
                    tracing::error!(error = %e, "pending undo entry not resolved");
                }

                if outcome.success {
                    DispatchOutcome::ok(format!(
                        "Undone! I reversed the last action: {}",
                        outcome.message
                    ))
                } else {
                    DispatchOutcome::fail(format!("I couldn't reverse it: {}", outcome.message))
                }
            }
            None => {
                self.note(
                    "undo",
                    json!({ "original": entry.action }),
                    ActionStatus::Success,
                    "Action noted but not automatically reversible.",
                );
                DispatchOutcome::ok(format!(
                    "The last action was \"{}\". This one can't be automatically undone, but I've noted it.",
                    entry.action
                ))
            }
        }
    }

    /// Runs a named routine. Permission was granted once for the routine, so
    /// its steps run directly without re-gating each one.
    async fn run_automation(&mut self, params: &serde_json::Value) -> DispatchOutcome {
        let name = ActionRequest::param_str(params, "name").to_string();
        let Some(steps) = self.automations.get(&name).map(|steps| steps.to_vec()) else {
            self.note("run_automation", params.clone(), ActionStatus::Failed, "Unknown routine.");
            return DispatchOutcome::fail(format!("I don't have a routine called \"{name}\"."));
        };

        let total = steps.len();
        let mut failures = 0usize;
        for step in steps {
            let outcome = self.execute(&step).await;
            self.speech.speak(&outcome.message, false).await;
            if !outcome.success {
                failures += 1;
            }
        }

        let detail = format!("{} of {total} steps succeeded.", total - failures);
        if failures == 0 {
            self.note("run_automation", params.clone(), ActionStatus::Success, &detail);
            DispatchOutcome::ok(format!("Routine \"{name}\" finished."))
        } else {
            self.note("run_automation", params.clone(), ActionStatus::Failed, &detail);
            DispatchOutcome::fail(format!(
                "Routine \"{name}\" finished, but {failures} of {total} steps failed."
            ))
        }
    }

    /// Runs an inline sequence of actions. Unlike a routine, each step goes
    /// through the full dispatch path, so dangerous steps are gated
    /// individually.
    async fn run_multi_step(&mut self, params: &serde_json::Value) -> DispatchOutcome {
        let Some(raw_steps) = params.get("steps").and_then(|v| v.as_array()).cloned() else {
            return DispatchOutcome::fail("That sequence has no steps.");
        };

        let mut steps = Vec::with_capacity(raw_steps.len());
        for raw in raw_steps {
            match serde_json::from_value::<ActionRequest>(raw) {
                Ok(step) => steps.push(step),
                Err(e) => {
                    return DispatchOutcome::fail(format!("I couldn't read that sequence: {e}"))
                }
            }
        }

        let total = steps.len();
        let mut failures = 0usize;
        for step in steps {
            let outcome = self.dispatch(step).await;
            self.speech.speak(&outcome.message, false).await;
            if !outcome.success {
                failures += 1;
            }
        }

        if failures == 0 {
            DispatchOutcome::ok(format!("Done, all {total} steps completed."))
        } else {
            DispatchOutcome::fail(format!("{failures} of {total} steps failed."))
        }
    }

    fn schedule_automation(&mut self, params: &serde_json::Value) -> DispatchOutcome {
        let name = ActionRequest::param_str(params, "name").to_string();
        let time = ActionRequest::param_str(params, "time").to_string();

        if !self.automations.contains(&name) {
            return DispatchOutcome::fail(format!("I don't have a routine called \"{name}\"."));
        }
        if !Schedule::valid_time(&time) {
            return DispatchOutcome::fail(format!(
                "\"{time}\" isn't a time I understand. Use 24-hour HH:MM."
            ));
        }

        self.schedules.push(Schedule::new(&name, &time));
        self.note("schedule_automation", params.clone(), ActionStatus::Success, "Schedule added.");
        DispatchOutcome::ok(format!("Scheduled \"{name}\" for {time} every day."))
    }

    /// Registry lookup and handler run. Handlers write their own activity
    /// entries; only the unknown-action case is logged here.
    async fn execute(&mut self, request: &ActionRequest) -> DispatchOutcome {
        let Some(handler) = self.registry.get(&request.name) else {
            self.note(&request.name, request.params.clone(), ActionStatus::Failed, "Unknown action.");
            return DispatchOutcome::fail(format!(
                "I don't know how to perform \"{}\" yet.",
                request.name
            ));
        };

        let outcome = handler.run(&request.params).await;
        if outcome.success {
            self.update_anchors(request);
        }
        outcome
    }

    fn update_anchors(&mut self, request: &ActionRequest) {
        match request.name.as_str() {
            "open_app" | "close_app" => {
                self.context
                    .set_last_app(ActionRequest::param_str(&request.params, "app"));
            }
            "search_google" | "play_youtube" | "search_wikipedia" => {
                self.context
                    .set_last_query(ActionRequest::param_str(&request.params, "query"));
            }
            "open_url" => {
                self.context
                    .set_last_url(ActionRequest::param_str(&request.params, "url"));
            }
            _ => {}
        }
        self.context.set_last_action(json!({
            "name": request.name,
            "params": request.params,
        }));
    }

    fn note(
        &self,
        action: &str,
        params: serde_json::Value,
        status: ActionStatus,
        detail: &str,
    ) {
        if let Err(e) = self.log.log_action(action, params, status, detail) {
            tracing::error!(action, error = %e, "activity entry not persisted");
        }
    }
}
