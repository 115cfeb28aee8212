use super::spec::ToolSpec;
use super::tool::{Tool, ToolError};
use anyhow::Result;

/// Type-erased tool interface for storing heterogeneous tools in collections
#[async_trait::async_trait]
pub trait DynTool: Send + Sync + 'static {
    /// Get the static metadata for this tool
    fn spec(&self) -> ToolSpec;

    /// Invoke the tool with JSON-encoded arguments and get the JSON-encoded output
    async fn invoke(&self, arguments: &str) -> Result<String>;
}

/// Automatic implementation of DynTool for any type that implements Tool
#[async_trait::async_trait]
impl<T: Tool> DynTool for T {
    fn spec(&self) -> ToolSpec {
        Tool::spec(self)
    }

    async fn invoke(&self, arguments: &str) -> Result<String> {
        // Models send an empty string for tools without parameters
        let arguments = if arguments.trim().is_empty() {
            "{}"
        } else {
            arguments
        };

        let input: T::Input = serde_json::from_str(arguments)
            .map_err(|e| ToolError::ParseError(format!("Failed to parse parameters: {e}")))?;

        let output = self.execute(input).await?;

        serde_json::to_string(&output)
            .map_err(|e| anyhow::anyhow!("Failed to serialize output: {}", e))
    }
}
