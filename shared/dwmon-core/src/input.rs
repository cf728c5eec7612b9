//! Input plugins and their registry

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::accumulator::Accumulator;
use crate::error::{CoreError, Result};

/// Contract every input plugin implements
#[async_trait]
pub trait Input: Send + Sync {
    /// One-line description shown by the agent
    fn description(&self) -> &'static str;

    /// Commented example configuration
    fn sample_config(&self) -> &'static str;

    /// Run one collection pass.
    ///
    /// Per-source failures go to `acc.add_error`; an `Err` means the pass
    /// could not run at all.
    async fn gather(&self, acc: Arc<dyn Accumulator>) -> anyhow::Result<()>;
}

/// Builds an input from its configuration section
pub type InputFactory = fn(serde_json::Value) -> anyhow::Result<Box<dyn Input>>;

/// Name → factory table the agent resolves configured inputs against
#[derive(Default)]
pub struct InputRegistry {
    factories: BTreeMap<&'static str, InputFactory>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &'static str, factory: InputFactory) {
        if self.factories.insert(name, factory).is_some() {
            tracing::warn!(input = name, "Input registered twice, keeping latest");
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate the named input from its configuration
    pub fn create(&self, name: &str, config: serde_json::Value) -> Result<Box<dyn Input>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| CoreError::UnknownInput(name.to_string()))?;

        factory(config).map_err(|e| CoreError::Config(format!("input '{}': {:#}", name, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopInput;

    #[async_trait]
    impl Input for NoopInput {
        fn description(&self) -> &'static str {
            "does nothing"
        }

        fn sample_config(&self) -> &'static str {
            ""
        }

        async fn gather(&self, _acc: Arc<dyn Accumulator>) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn noop_factory(config: serde_json::Value) -> anyhow::Result<Box<dyn Input>> {
        if config.get("fail").is_some() {
            anyhow::bail!("refusing config");
        }
        Ok(Box::new(NoopInput))
    }

    #[test]
    fn test_create_registered_input() {
        let mut registry = InputRegistry::new();
        registry.add("noop", noop_factory);

        assert!(registry.contains("noop"));
        assert_eq!(registry.names(), vec!["noop"]);
        let input = registry.create("noop", serde_json::json!({})).unwrap();
        assert_eq!(input.description(), "does nothing");
    }

    #[test]
    fn test_unknown_input() {
        let registry = InputRegistry::new();
        let err = registry.create("missing", serde_json::Value::Null).err().unwrap();
        assert!(matches!(err, CoreError::UnknownInput(name) if name == "missing"));
    }

    #[test]
    fn test_factory_error_is_config_error() {
        let mut registry = InputRegistry::new();
        registry.add("noop", noop_factory);
        let err = registry
            .create("noop", serde_json::json!({"fail": true}))
            .err()
            .unwrap();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(err.to_string().contains("refusing config"));
    }

    #[test]
    fn test_created_input_gathers_into_accumulator() {
        use crate::accumulator::MemoryAccumulator;

        let mut registry = InputRegistry::new();
        registry.add("noop", noop_factory);
        let input = registry.create("noop", serde_json::Value::Null).unwrap();

        let acc = Arc::new(MemoryAccumulator::new());
        tokio_test::block_on(input.gather(acc.clone())).unwrap();
        assert!(acc.records().is_empty());
        assert!(acc.errors().is_empty());
    }
}
