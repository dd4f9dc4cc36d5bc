//! Tool System
//!
//! Extensible tool framework for agent capabilities.
//! Tools are registered once at startup and invoked by the execution loop
//! when the model asks for them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// Tool call request from the LLM
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Call ID used to pair the call with its result
    pub id: String,

    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// For providers that do not assign call IDs themselves
    pub fn with_generated_id(name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self::new(format!("call_{}", uuid::Uuid::new_v4().simple()), name, arguments)
    }

    /// String argument lookup
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(Value::as_str)
    }
}

/// Result from tool execution
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Call ID (if provided in request)
    pub id: Option<String>,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (success message or error)
    pub output: String,

    /// Structured data (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Text handed back to the model for this result
    pub fn to_model_content(&self) -> String {
        if !self.success {
            return format!("Error: {}", self.output);
        }
        match &self.data {
            Some(data) => data.to_string(),
            None => self.output.clone(),
        }
    }
}

/// Parameter definition for tool schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameter name
    pub name: String,

    /// JSON Schema type (string, number, boolean, object, array)
    #[serde(rename = "type")]
    pub param_type: String,

    /// Human-readable description
    pub description: String,

    /// Whether this parameter is required
    #[serde(default)]
    pub required: bool,

    /// Default value if not provided
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Enum of allowed values
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
}

impl ParameterSchema {
    pub fn required(name: impl Into<String>, param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
            default: None,
            enum_values: None,
        }
    }

    pub fn optional(name: impl Into<String>, param_type: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, param_type, description)
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn with_enum(mut self, values: Vec<Value>) -> Self {
        self.enum_values = Some(values);
        self
    }
}

/// Tool definition schema (for LLM function calling)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Unique tool identifier
    pub name: String,

    /// Human-readable description (shown to LLM)
    pub description: String,

    /// Parameter definitions
    pub parameters: Vec<ParameterSchema>,

    /// Category for grouping
    #[serde(default)]
    pub category: Option<String>,

    /// Whether tool has side effects
    #[serde(default)]
    pub has_side_effects: bool,
}

impl ToolSchema {
    /// Render the parameters as a JSON Schema object.
    ///
    /// Defaults are folded into the description since not every provider
    /// accepts the `default` keyword.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let description = match &param.default {
                Some(default) => format!("{} (default: {default})", param.description),
                None => param.description.clone(),
            };
            let mut prop = json!({
                "type": param.param_type,
                "description": description,
            });
            if let Some(values) = &param.enum_values {
                prop["enum"] = Value::Array(values.clone());
            }
            properties.insert(param.name.clone(), prop);

            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

/// Tool trait - implement to add new capabilities
///
/// Returning `Err` from `execute` is fatal for the agent invocation; return
/// `ToolResult::failure` for errors the model should see and react to.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool's schema for LLM function calling
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution (optional)
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Registry for available tools, keyed by the name the model sees
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names())
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under `name`, replacing any previous entry
    pub fn register(&mut self, name: impl Into<String>, tool: Arc<dyn Tool>) {
        let name = name.into();
        if self.tools.insert(name.clone(), tool).is_some() {
            tracing::debug!(tool = %name, "Replaced registered tool");
        }
    }

    /// Register a tool under its schema name
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) {
        let name = tool.schema().name;
        self.register(name, Arc::new(tool));
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Subset of this registry matching `names`.
    ///
    /// Unknown names are left out of the result; they are logged so a
    /// misspelled name is at least visible with `RUST_LOG=warn`.
    pub fn get_many<S: AsRef<str>>(&self, names: &[S]) -> Self {
        let mut subset = Self::new();
        for name in names {
            let name = name.as_ref();
            match self.get(name) {
                Some(tool) => subset.register(name, tool),
                None => tracing::warn!(tool = %name, "Ignoring unknown tool name"),
            }
        }
        subset
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        // Validate first
        tool.validate(call)?;

        // Answer under the name the model called, which may be an alias
        let mut result = tool.execute(call).await?;
        result.name.clone_from(&call.name);
        Ok(result.with_id(call.id.clone()))
    }

    /// Tool schemas as advertised to the model, named by registry key
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|(name, tool)| {
                let mut schema = tool.schema();
                schema.name.clone_from(name);
                schema
            })
            .collect()
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Whether a tool is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool {
        tag: &'static str,
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".into(),
                description: "Echo the input back".into(),
                parameters: vec![ParameterSchema::required("text", "string", "Text to echo")],
                category: None,
                has_side_effects: false,
            }
        }

        async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
            let text = call.str_arg("text").unwrap_or_default();
            Ok(ToolResult::success("echo", format!("{}:{text}", self.tag)))
        }
    }

    fn call(name: &str, args: Value) -> ToolCall {
        let Value::Object(arguments) = args else {
            panic!("arguments must be an object");
        };
        ToolCall::new("call_1", name, arguments)
    }

    #[test]
    fn test_tool_registry() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(EchoTool { tag: "a" });

        assert_eq!(registry.len(), 1);
        assert!(registry.get("echo").is_some());
        assert!(registry.get("unknown").is_none());
    }

    #[tokio::test]
    async fn test_register_overwrites() {
        let mut registry = ToolRegistry::new();
        registry.register("echo", Arc::new(EchoTool { tag: "first" }));
        registry.register("echo", Arc::new(EchoTool { tag: "second" }));
        assert_eq!(registry.len(), 1);

        let result = registry.execute(&call("echo", json!({"text": "hi"}))).await.unwrap();
        assert_eq!(result.output, "second:hi");
        assert_eq!(result.id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_get_many_omits_unknown_names() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(EchoTool { tag: "a" });

        let subset = registry.get_many(&["echo", "doesnotexist"]);
        assert_eq!(subset.names(), vec!["echo"]);
    }

    #[test]
    fn test_schemas_use_registry_key() {
        let mut registry = ToolRegistry::new();
        registry.register("shout", Arc::new(EchoTool { tag: "a" }));
        let schemas = registry.schemas();
        assert_eq!(schemas[0].name, "shout");
    }

    #[tokio::test]
    async fn test_aliased_tool_answers_under_called_name() {
        let mut registry = ToolRegistry::new();
        registry.register("shout", Arc::new(EchoTool { tag: "a" }));

        let result = registry.execute(&call("shout", json!({"text": "hi"}))).await.unwrap();
        assert_eq!(result.name, "shout");
        assert_eq!(result.output, "a:hi");

        let message = crate::message::Message::tool(&result, "call_1");
        assert_eq!(message.name.as_deref(), Some("shout"));
        assert_eq!(message.tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_validation_rejects_missing_argument() {
        let mut registry = ToolRegistry::new();
        registry.register_tool(EchoTool { tag: "a" });

        let err = registry.execute(&call("echo", json!({}))).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));

        let err = registry.execute(&call("nope", json!({}))).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(_)));
    }

    #[test]
    fn test_json_schema_rendering() {
        let schema = ToolSchema {
            name: "datetime".into(),
            description: "Current time".into(),
            parameters: vec![
                ParameterSchema::optional("format", "string", "Output format")
                    .with_default(json!("human"))
                    .with_enum(vec![json!("iso"), json!("human")]),
                ParameterSchema::required("zone", "string", "Zone"),
            ],
            category: None,
            has_side_effects: false,
        };

        let rendered = schema.to_json_schema();
        assert_eq!(rendered["type"], "object");
        assert_eq!(rendered["required"], json!(["zone"]));
        assert_eq!(rendered["properties"]["format"]["enum"], json!(["iso", "human"]));
        assert!(
            rendered["properties"]["format"]["description"]
                .as_str()
                .unwrap()
                .contains("default")
        );
    }

    #[test]
    fn test_model_content() {
        let ok = ToolResult::success("t", "plain").with_data(json!({"a": 1}));
        assert_eq!(ok.to_model_content(), r#"{"a":1}"#);
        let failed = ToolResult::failure("t", "boom");
        assert_eq!(failed.to_model_content(), "Error: boom");
    }
}
