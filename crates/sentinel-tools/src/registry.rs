//! Tool registry: id-keyed map of invocable tools.
use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("TOOL/UNKNOWN: {0}")]
    NotRegistered(String),

    #[error("TOOL/PARAMS: {0}")]
    InvalidParams(String),

    #[error("TOOL/EXEC: {0}")]
    ExecutionFailed(String),
}

type ToolHandler = Box<dyn Fn(&Value) -> Result<String, ToolError> + Send + Sync>;

/// One invocable tool: a name, a JSON-schema parameter description, and
/// the handler itself.
pub struct Tool {
    name: String,
    description: String,
    parameters: Value,
    handler: ToolHandler,
}

impl Tool {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
        handler: impl Fn(&Value) -> Result<String, ToolError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
            handler: Box::new(handler),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoke(&self, params: &Value) -> Result<String, ToolError> {
        (self.handler)(params)
    }
}

/// Serializable description of a registered tool.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    /// JSON schema of the accepted parameters.
    pub parameters: Value,
}

/// Name → tool map. Shared read-only across concurrent runs once built.
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Registry preloaded with the built-in fiscal tools.
    pub fn with_builtin_tools() -> Self {
        let mut registry = Self::new();
        for tool in crate::builtin::builtin_tools() {
            registry.register(tool);
        }
        registry
    }

    /// Register a tool, replacing any previous tool with the same name.
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn invoke(&self, name: &str, params: &Value) -> Result<String, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotRegistered(name.to_string()))?;
        tool.invoke(params)
    }

    /// Descriptions of every registered tool, sorted by name.
    pub fn describe(&self) -> Vec<ToolDescription> {
        let mut described: Vec<ToolDescription> = self
            .tools
            .values()
            .map(|t| ToolDescription {
                name: t.name.clone(),
                description: t.description.clone(),
                parameters: t.parameters.clone(),
            })
            .collect();
        described.sort_by(|a, b| a.name.cmp(&b.name));
        described
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::with_builtin_tools()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_register_and_invoke() {
        let mut registry = ToolRegistry::new();
        registry.register(Tool::new(
            "echo",
            "Echo the input back",
            json!({ "type": "object", "properties": { "text": { "type": "string" } } }),
            |params| {
                let text = params
                    .get("text")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| ToolError::InvalidParams("missing 'text'".to_string()))?;
                Ok(text.to_string())
            },
        ));

        assert!(registry.contains("echo"));
        let result = registry.invoke("echo", &json!({ "text": "hola" })).unwrap();
        assert_eq!(result, "hola");
    }

    #[test]
    fn test_unknown_tool_fails() {
        let registry = ToolRegistry::new();
        let err = registry.invoke("missing", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::NotRegistered(_)));
    }

    #[test]
    fn test_invalid_params_reported() {
        let registry = ToolRegistry::with_builtin_tools();
        let err = registry.invoke("consultar_cfdi", &json!({})).unwrap_err();
        assert!(matches!(err, ToolError::InvalidParams(_)));
    }

    #[test]
    fn test_describe_lists_builtins() {
        let registry = ToolRegistry::with_builtin_tools();
        let names: Vec<String> = registry.describe().into_iter().map(|d| d.name).collect();
        assert!(names.contains(&"consultar_cfdi".to_string()));
        assert!(names.contains(&"validar_rfc".to_string()));
        assert!(names.contains(&"calcular_impuestos".to_string()));
    }
}
