mod common;

use common::{temp_log, CollectingSpeech, ScriptedConfirmer, SpyHandler};
use serde_json::json;
use std::sync::Arc;
use veda_core::ActionRequest;
use veda_memory::ActionStatus;
use veda_policy::{SecurityGate, SecurityPolicy};
use veda_runtime::{AutomationBook, Router};
use veda_tools::ActionRegistry;

fn build_router(registry: ActionRegistry, dir: &std::path::Path) -> Router {
    Router::new(
        registry,
        SecurityGate::new(SecurityPolicy::default()),
        Arc::new(ScriptedConfirmer::silent()),
        Arc::new(CollectingSpeech::default()),
        temp_log(dir),
        AutomationBook::builtin(),
    )
}

fn undo() -> ActionRequest {
    ActionRequest::new("undo", json!({}))
}

#[tokio::test]
async fn test_undo_on_empty_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = build_router(ActionRegistry::new(), dir.path());

    let outcome = router.dispatch(undo()).await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, "There's nothing to undo.");
    assert!(router.log().is_empty());
}

#[tokio::test]
async fn test_undo_reverses_open_app() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ActionRegistry::new();
    let (close, close_calls) = SpyHandler::ok("close_app", "Closed firefox.");
    registry.register(close);
    let mut router = build_router(registry, dir.path());

    router
        .log()
        .log_action("open_app", json!({"app": "firefox"}), ActionStatus::Success, "Opening firefox.")
        .unwrap();

    let outcome = router.dispatch(undo()).await;

    assert!(outcome.success);
    assert!(outcome.message.starts_with("Undone!"));
    assert_eq!(close_calls.lock()[0], json!({"app": "firefox"}));

    // The original entry is gone; the undo record is resolved to success.
    let entries = router.log().snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "undo");
    assert_eq!(entries[0].status, ActionStatus::Success);
    assert_eq!(entries[0].params["original"], json!("open_app"));
}

#[tokio::test]
async fn test_undo_failure_resolves_pending_to_failed() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ActionRegistry::new();
    let (close, _) = SpyHandler::failing("close_app", "firefox doesn't seem to be running.");
    registry.register(close);
    let mut router = build_router(registry, dir.path());

    router
        .log()
        .log_action("open_app", json!({"app": "firefox"}), ActionStatus::Success, "ok")
        .unwrap();

    let outcome = router.dispatch(undo()).await;

    assert!(!outcome.success);
    assert!(outcome.message.starts_with("I couldn't reverse it:"));

    let entries = router.log().snapshot();
    let entry = entries.iter().find(|e| e.action == "undo").unwrap();
    assert_eq!(entry.status, ActionStatus::Failed);
}

#[tokio::test]
async fn test_undo_toggle_inverts_state() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ActionRegistry::new();
    let (wifi, wifi_calls) = SpyHandler::ok("wifi_toggle", "Wi-Fi turned off.");
    registry.register(wifi);
    let mut router = build_router(registry, dir.path());

    router
        .log()
        .log_action("wifi_toggle", json!({"state": true}), ActionStatus::Success, "on")
        .unwrap();

    let outcome = router.dispatch(undo()).await;

    assert!(outcome.success);
    assert_eq!(wifi_calls.lock()[0], json!({"state": false}));
}

#[tokio::test]
async fn test_undo_non_reversible_is_noted() {
    let dir = tempfile::tempdir().unwrap();
    let mut router = build_router(ActionRegistry::new(), dir.path());

    router
        .log()
        .log_action("delete_file", json!({"path": "/tmp/x"}), ActionStatus::Success, "deleted")
        .unwrap();

    let outcome = router.dispatch(undo()).await;

    assert!(outcome.success);
    assert!(outcome.message.contains("delete_file"));
    assert!(outcome.message.contains("can't be automatically undone"));

    let entries = router.log().snapshot();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "undo");
    assert_eq!(entries[0].status, ActionStatus::Success);
    assert_eq!(entries[0].detail, "Action noted but not automatically reversible.");
}

#[tokio::test]
async fn test_symmetric_pair_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ActionRegistry::new();
    let (open, open_calls) = SpyHandler::ok("open_app", "Opening firefox.");
    let (close, close_calls) = SpyHandler::ok("close_app", "Closed firefox.");
    registry.register(open);
    registry.register(close);
    let mut router = build_router(registry, dir.path());

    router
        .log()
        .log_action("open_app", json!({"app": "firefox"}), ActionStatus::Success, "ok")
        .unwrap();

    router.dispatch(undo()).await;
    assert_eq!(close_calls.lock().len(), 1);

    // The reverse action's own entry (as a live handler would write it)
    // makes the second undo re-open the app.
    router
        .log()
        .log_action("close_app", json!({"app": "firefox"}), ActionStatus::Success, "ok")
        .unwrap();

    router.dispatch(undo()).await;
    assert_eq!(open_calls.lock().len(), 1);
    assert_eq!(open_calls.lock()[0], json!({"app": "firefox"}));
}

#[tokio::test]
async fn test_consecutive_undos_walk_backwards() {
    let dir = tempfile::tempdir().unwrap();
    let mut registry = ActionRegistry::new();
    let (close, close_calls) = SpyHandler::ok("close_app", "Closed.");
    registry.register(close);
    let mut router = build_router(registry, dir.path());

    router
        .log()
        .log_action("open_app", json!({"app": "editor"}), ActionStatus::Success, "ok")
        .unwrap();
    router
        .log()
        .log_action("open_app", json!({"app": "firefox"}), ActionStatus::Success, "ok")
        .unwrap();

    // Most recent first, and the undo records left behind are skipped.
    router.dispatch(undo()).await;
    router.dispatch(undo()).await;
    let calls = close_calls.lock();
    assert_eq!(calls[0], json!({"app": "firefox"}));
    assert_eq!(calls[1], json!({"app": "editor"}));

    drop(calls);
    let outcome = router.dispatch(undo()).await;
    assert_eq!(outcome.message, "There's nothing to undo.");
}
