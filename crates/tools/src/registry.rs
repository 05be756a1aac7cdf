use crate::traits::ActionHandler;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ActionRegistry {
    handlers: HashMap<String, Arc<dyn ActionHandler>>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, handler: Arc<dyn ActionHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionHandler>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use veda_core::DispatchOutcome;

    struct Dummy(&'static str);

    #[async_trait]
    impl ActionHandler for Dummy {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, _params: &serde_json::Value) -> DispatchOutcome {
            DispatchOutcome::ok("done")
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Dummy("open_app")));
        registry.register(Arc::new(Dummy("close_app")));

        assert!(registry.contains("open_app"));
        assert!(registry.get("close_app").is_some());
        assert!(registry.get("levitate").is_none());
        assert_eq!(registry.names(), vec!["close_app", "open_app"]);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = ActionRegistry::new();
        registry.register(Arc::new(Dummy("open_app")));
        registry.register(Arc::new(Dummy("open_app")));
        assert_eq!(registry.names().len(), 1);
    }
}
