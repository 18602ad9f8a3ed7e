//! Tool registry for managing available tools

use crate::Tool;
use crate::tool::ToolDefinition;
use agent_core::{Error, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Registry for managing tools
///
/// Tools are kept ordered by name so listings are stable between runs.
#[derive(Default)]
pub struct ToolRegistry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl ToolRegistry {
    /// Create a new tool registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same name
    pub fn register(&self, tool: Arc<dyn Tool>) {
        let mut tools = self.tools.write().unwrap_or_else(PoisonError::into_inner);
        if tools.insert(tool.name().to_string(), tool).is_some() {
            tracing::debug!("Replaced previously registered tool");
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.get(name).cloned()
    }

    /// List all registered tools
    pub fn list_tools(&self) -> Vec<Arc<dyn Tool>> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.values().cloned().collect()
    }

    /// Names of all registered tools, sorted
    pub fn names(&self) -> Vec<String> {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.keys().cloned().collect()
    }

    /// Definitions of all registered tools, ready to send to an LLM
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.list_tools().iter().map(|t| t.definition()).collect()
    }

    /// Look up a tool by name and execute it
    pub async fn execute(&self, name: &str, params: Value) -> Result<Value> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        tracing::debug!(tool = name, "Executing tool");
        tool.execute(params).await
    }

    /// Get the number of registered tools
    pub fn len(&self) -> usize {
        let tools = self.tools.read().unwrap_or_else(PoisonError::into_inner);
        tools.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        async fn execute(&self, params: Value) -> Result<Value> {
            Ok(json!({ "tool": self.0, "params": params }))
        }

        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echo the parameters back"
        }

        fn input_schema(&self) -> Value {
            json!({ "type": "object" })
        }
    }

    #[test]
    fn test_register_and_list_sorted() {
        let registry = ToolRegistry::new();
        assert!(registry.is_empty());

        registry.register(Arc::new(EchoTool("zeta")));
        registry.register(Arc::new(EchoTool("alpha")));
        registry.register(Arc::new(EchoTool("alpha")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names(), vec!["alpha", "zeta"]);
        assert_eq!(registry.definitions()[0].name, "alpha");
    }

    #[tokio::test]
    async fn test_execute_by_name() {
        let registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool("echo")));

        let out = registry.execute("echo", json!({"symbol": "ACME"})).await.unwrap();
        assert_eq!(out["params"]["symbol"], "ACME");

        let err = registry.execute("missing", json!({})).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTool(name) if name == "missing"));
    }
}
