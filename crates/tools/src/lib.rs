pub mod files;
pub mod pc_control;
pub mod registry;
pub mod screen;
pub mod shell;
pub mod smart_home;
pub mod traits;
pub mod web;
pub mod writing;

pub use registry::ActionRegistry;
pub use traits::ActionHandler;

use veda_core::DispatchOutcome;
use veda_memory::{ActionStatus, SharedActivityLog};

/// Every feature module records its own outcome; the router only logs
/// control flows and the unknown-action fallback.
pub(crate) fn record(
    log: &SharedActivityLog,
    action: &str,
    params: &serde_json::Value,
    outcome: &DispatchOutcome,
) {
    let status = if outcome.success {
        ActionStatus::Success
    } else {
        ActionStatus::Failed
    };
    if let Err(e) = log.log_action(action, params.clone(), status, &outcome.message) {
        tracing::error!(action, error = %e, "failed to record activity entry");
    }
}
