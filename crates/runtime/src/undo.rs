//! Reversal rules for the undo subsystem.
//!
//! Only a small set of actions has a mechanical inverse. Everything else is
//! acknowledged but left alone; deleting a file or shutting down cannot be
//! talked back.

use serde_json::json;
use veda_core::ActionRequest;

/// The action that reverses `action`/`params`, or `None` when no mechanical
/// inverse exists.
pub fn reversal_for(action: &str, params: &serde_json::Value) -> Option<ActionRequest> {
    match action {
        "open_app" => Some(ActionRequest::new("close_app", params.clone())),
        "close_app" => Some(ActionRequest::new("open_app", params.clone())),
        "wifi_toggle" | "bluetooth_toggle" => {
            let state = ActionRequest::param_bool(params, "state", true);
            Some(ActionRequest::new(action, json!({ "state": !state })))
        }
        _ => None,
    }
}
