use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result types that tools can return.
///
/// Every provider understands both variants; JSON results are sent to the
/// model as their serialized text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ToolResult {
    /// Plain text response
    Text(String),

    /// Structured JSON data - use for complex responses
    Json(Value),
}

impl ToolResult {
    /// Create a JSON result from any serializable type
    pub fn json<T: Serialize>(value: T) -> Result<Self, serde_json::Error> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Create a text result from a string
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    /// Get the text content, serializing JSON results
    pub fn as_text(&self) -> String {
        match self {
            ToolResult::Text(s) => s.clone(),
            ToolResult::Json(v) => v.to_string(),
        }
    }

    /// Get a reference to the text content if this is a Text variant
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ToolResult::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<String> for ToolResult {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for ToolResult {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// Errors that can occur during tool execution
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("{0}")]
    Custom(String),
}

impl From<String> for ToolError {
    fn from(s: String) -> Self {
        Self::Custom(s)
    }
}

impl From<&str> for ToolError {
    fn from(s: &str) -> Self {
        Self::Custom(s.to_string())
    }
}

/// Trait for implementing tools that can be called by the chat agent.
///
/// Tools define an input type with `#[derive(Deserialize, JsonSchema)]` so the
/// JSON schema handed to the model is generated from the Rust type.
///
/// ```rust
/// use bometa_core::{Tool, ToolResult, ToolError};
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct EchoInput {
///     /// Text to send back
///     text: String,
/// }
///
/// struct EchoTool;
///
/// impl Tool for EchoTool {
///     type Input = EchoInput;
///
///     fn name(&self) -> &str { "echo" }
///     fn description(&self) -> &str { "Echo the input text" }
///
///     fn execute(&self, input: Self::Input) -> impl std::future::Future<Output = Result<ToolResult, ToolError>> + Send {
///         async move { Ok(input.text.into()) }
///     }
/// }
/// ```
pub trait Tool: Send + Sync {
    /// The input type for this tool. Must implement `Deserialize` and `JsonSchema`.
    type Input: DeserializeOwned + JsonSchema;

    /// The name of the tool (e.g., "create_issue")
    fn name(&self) -> &str;

    /// A description of what the tool does
    fn description(&self) -> &str;

    /// Execute the tool with typed input
    fn execute(
        &self,
        input: Self::Input,
    ) -> impl std::future::Future<Output = Result<ToolResult, ToolError>> + Send;

    /// Get the JSON schema for this tool's input.
    fn input_schema(&self) -> Value {
        schemars::schema_for!(Self::Input).to_value()
    }
}

/// Object-safe trait for dynamic tool dispatch (used internally by the agent).
///
/// Implement `Tool` instead and use `box_tool()` to convert.
pub trait DynTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> Value;
    fn execute_raw(
        &self,
        input: Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<ToolResult, ToolError>> + Send + '_>,
    >;
}

/// Convert a `Tool` into a type-erased `Box<dyn DynTool>` for storage in collections.
pub fn box_tool<T: Tool + 'static>(tool: T) -> Box<dyn DynTool> {
    Box::new(ToolWrapper(tool))
}

/// Internal wrapper that implements DynTool for any Tool
struct ToolWrapper<T>(T);

impl<T: Tool + 'static> DynTool for ToolWrapper<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn description(&self) -> &str {
        self.0.description()
    }

    fn input_schema(&self) -> Value {
        self.0.input_schema()
    }

    fn execute_raw(
        &self,
        input: Value,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<ToolResult, ToolError>> + Send + '_>,
    > {
        Box::pin(async move {
            let typed_input: T::Input = serde_json::from_value(input)
                .map_err(|e| ToolError::Custom(format!("Failed to deserialize input: {}", e)))?;

            self.0.execute(typed_input).await
        })
    }
}
