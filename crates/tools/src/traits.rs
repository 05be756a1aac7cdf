use async_trait::async_trait;
use veda_core::DispatchOutcome;

/// One named operation behind the router. Handlers never return errors;
/// failures are encoded in the outcome value.
#[async_trait]
pub trait ActionHandler: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, params: &serde_json::Value) -> DispatchOutcome;
}
