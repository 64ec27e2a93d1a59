//! The `LLMAdapter` contract and registry (§6).

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use skillrt_core::{SkillError, Value};

/// `name`, `supportedModels`, `isAvailable`, `invoke`,
/// `invokeAsync` (§6). `invoke`/`invokeAsync` collapse to one async
/// method: a single async entry point both sync and streaming callers
/// funnel through.
#[async_trait]
pub trait LLMAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn supported_models(&self) -> &[String];
    fn is_available(&self) -> bool;
    async fn invoke(&self, prompt: &str, options: Option<&Value>) -> Result<String, SkillError>;
}

/// Registers adapters by name, with one designated default (§6).
#[derive(Default)]
pub struct LLMAdapterRegistry {
    adapters: RwLock<BTreeMap<String, Arc<dyn LLMAdapter>>>,
    default: RwLock<Option<String>>,
}

impl LLMAdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, adapter: Arc<dyn LLMAdapter>) {
        let name = adapter.name().to_string();
        self.adapters.write().unwrap().insert(name.clone(), adapter);
        let mut default = self.default.write().unwrap();
        if default.is_none() {
            *default = Some(name);
        }
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn LLMAdapter>> {
        self.adapters.read().unwrap().get(name).cloned()
    }

    pub fn get_default(&self) -> Option<Arc<dyn LLMAdapter>> {
        let name = self.default.read().unwrap().clone()?;
        self.find(&name)
    }

    pub fn set_default(&self, name: &str) -> bool {
        if !self.adapters.read().unwrap().contains_key(name) {
            return false;
        }
        *self.default.write().unwrap() = Some(name.to_string());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubAdapter {
        name: String,
    }

    #[async_trait]
    impl LLMAdapter for StubAdapter {
        fn name(&self) -> &str {
            &self.name
        }
        fn supported_models(&self) -> &[String] {
            &[]
        }
        fn is_available(&self) -> bool {
            true
        }
        async fn invoke(&self, prompt: &str, _options: Option<&Value>) -> Result<String, SkillError> {
            Ok(prompt.to_string())
        }
    }

    #[test]
    fn first_registered_adapter_becomes_default() {
        let registry = LLMAdapterRegistry::new();
        registry.register(Arc::new(StubAdapter { name: "a".into() }));
        registry.register(Arc::new(StubAdapter { name: "b".into() }));
        assert_eq!(registry.get_default().unwrap().name(), "a");
    }

    #[test]
    fn set_default_rejects_unknown_name() {
        let registry = LLMAdapterRegistry::new();
        registry.register(Arc::new(StubAdapter { name: "a".into() }));
        assert!(!registry.set_default("missing"));
        assert!(registry.set_default("a"));
    }
}
