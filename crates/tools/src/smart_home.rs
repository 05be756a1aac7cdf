//! Smart home device control. No hub integration is wired up, so these
//! handlers acknowledge the request and note the intended device state.

use crate::record;
use crate::traits::ActionHandler;
use async_trait::async_trait;
use tracing::info;
use veda_core::{ActionRequest, DispatchOutcome};
use veda_memory::SharedActivityLog;

macro_rules! device_handler {
    ($name:ident, $action:literal, $device:literal) => {
        pub struct $name {
            pub log: SharedActivityLog,
        }

        #[async_trait]
        impl ActionHandler for $name {
            fn name(&self) -> &str {
                $action
            }

            async fn run(&self, params: &serde_json::Value) -> DispatchOutcome {
                let state = ActionRequest::param_bool(params, "state", true);
                let word = if state { "on" } else { "off" };
                let room = ActionRequest::param_str(params, "room");
                info!(device = $device, state = word, room, "smart home request");
                let outcome = if room.is_empty() {
                    DispatchOutcome::ok(format!(concat!("Turned the ", $device, " {}."), word))
                } else {
                    DispatchOutcome::ok(format!(
                        concat!("Turned the {} ", $device, " {}."),
                        room, word
                    ))
                };
                record(&self.log, self.name(), params, &outcome);
                outcome
            }
        }
    };
}

device_handler!(ControlLight, "control_light", "lights");
device_handler!(ControlFan, "control_fan", "fan");
device_handler!(ControlAc, "control_ac", "AC");

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use veda_memory::ActivityLog;

    #[tokio::test]
    async fn test_light_acknowledges_room_and_state() {
        let dir = tempfile::tempdir().unwrap();
        let log = SharedActivityLog::new(
            ActivityLog::open(dir.path().join("log.json")).unwrap(),
        );
        let handler = ControlLight { log: log.clone() };

        let outcome = handler
            .run(&json!({"state": false, "room": "bedroom"}))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Turned the bedroom lights off.");
        assert_eq!(log.snapshot().len(), 1);
    }
}
