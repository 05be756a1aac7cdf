//! Confirmation gate for dangerous actions.
//!
//! Two tiers: dangerous actions need a yes/no (the PIN also passes), and the
//! admin subset needs the exact PIN with no keyword bypass. One attempt only;
//! anything else is a refusal. Control actions never reach this gate.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One blocking question over the same input channel commands arrive on.
/// `None` means the channel closed or the user never answered.
#[async_trait]
pub trait Confirmer: Send + Sync {
    async fn read_reply(&self, prompt: &str) -> Option<String>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPolicy {
    pub pin: String,
    pub dangerous: HashSet<String>,
    pub admin: HashSet<String>,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        let dangerous = [
            "shutdown",
            "restart",
            "sleep",
            "delete_file",
            "compress_folder",
            "run_automation",
        ];
        let admin = ["shutdown", "restart", "sleep", "delete_file"];
        Self {
            pin: "1234".to_string(),
            dangerous: dangerous.iter().map(|s| s.to_string()).collect(),
            admin: admin.iter().map(|s| s.to_string()).collect(),
        }
    }
}

pub struct SecurityGate {
    policy: SecurityPolicy,
}

impl SecurityGate {
    pub fn new(policy: SecurityPolicy) -> Self {
        Self { policy }
    }

    pub fn is_dangerous(&self, action: &str) -> bool {
        self.policy.dangerous.contains(action)
    }

    pub fn is_admin(&self, action: &str) -> bool {
        self.policy.admin.contains(action)
    }

    /// Returns true when the action may proceed. Non-dangerous actions pass
    /// immediately; everything else blocks on the confirmer for one attempt.
    pub async fn request_permission(
        &self,
        action: &str,
        params: &serde_json::Value,
        confirmer: &dyn Confirmer,
    ) -> bool {
        if !self.is_dangerous(action) {
            return true;
        }

        let summary = params
            .as_object()
            .filter(|obj| !obj.is_empty())
            .map(|obj| serde_json::to_string(obj).unwrap_or_default())
            .unwrap_or_default();

        if self.is_admin(action) {
            let prompt = format!("'{action}' {summary} needs the security PIN: ");
            let reply = confirmer.read_reply(&prompt).await;
            let granted = reply.as_deref().map(str::trim) == Some(self.policy.pin.as_str());
            if !granted {
                tracing::warn!(action, "admin confirmation failed");
            }
            return granted;
        }

        let prompt = format!("Confirm '{action}' {summary} [yes/PIN]: ");
        let Some(reply) = confirmer.read_reply(&prompt).await else {
            tracing::warn!(action, "confirmation channel closed");
            return false;
        };
        let reply = reply.trim();
        let granted =
            reply.eq_ignore_ascii_case("yes") || reply.eq_ignore_ascii_case("y") || reply == self.policy.pin;
        if !granted {
            tracing::warn!(action, "confirmation declined");
        }
        granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    struct ScriptedConfirmer {
        replies: Mutex<Vec<Option<String>>>,
    }

    impl ScriptedConfirmer {
        fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies.into_iter().map(|r| r.map(str::to_string)).collect(),
                ),
            }
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

    fn gate() -> SecurityGate {
        SecurityGate::new(SecurityPolicy::default())
    }

    #[tokio::test]
    async fn test_safe_action_bypasses_confirmation() {
        let confirmer = ScriptedConfirmer::new(vec![]);
        assert!(gate().request_permission("open_app", &json!({}), &confirmer).await);
    }

    #[tokio::test]
    async fn test_dangerous_action_accepts_yes() {
        let confirmer = ScriptedConfirmer::new(vec![Some("yes")]);
        assert!(
            gate()
                .request_permission("run_automation", &json!({"name": "good morning"}), &confirmer)
                .await
        );
    }

    #[tokio::test]
    async fn test_dangerous_action_accepts_pin() {
        let confirmer = ScriptedConfirmer::new(vec![Some("1234")]);
        assert!(
            gate()
                .request_permission("compress_folder", &json!({}), &confirmer)
                .await
        );
    }

    #[tokio::test]
    async fn test_admin_action_rejects_yes_keyword() {
        let confirmer = ScriptedConfirmer::new(vec![Some("yes")]);
        assert!(!gate().request_permission("shutdown", &json!({}), &confirmer).await);
    }

    #[tokio::test]
    async fn test_admin_action_accepts_exact_pin() {
        let confirmer = ScriptedConfirmer::new(vec![Some("1234")]);
        assert!(gate().request_permission("delete_file", &json!({"path": "/tmp/x"}), &confirmer).await);
    }

    #[tokio::test]
    async fn test_single_attempt_only() {
        // First (wrong) reply is consumed; no retry happens.
        let confirmer = ScriptedConfirmer::new(vec![Some("4321"), Some("1234")]);
        assert!(!gate().request_permission("shutdown", &json!({}), &confirmer).await);
    }

    #[tokio::test]
    async fn test_closed_channel_is_refusal() {
        let confirmer = ScriptedConfirmer::new(vec![None]);
        assert!(!gate().request_permission("sleep", &json!({}), &confirmer).await);
    }
}
