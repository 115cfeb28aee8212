use super::spec::ToolSpec;
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Errors raised while turning a raw tool call into a typed invocation
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Failed to parse tool parameters: {0}")]
    ParseError(String),
}

/// Core trait for tools, defining the execution interface
#[async_trait::async_trait]
pub trait Tool: Send + Sync + 'static {
    /// Input type for this tool, must be deserializable from JSON
    type Input: DeserializeOwned + Send;

    /// Output type for this tool, serialized to JSON for the service
    type Output: Serialize + Send;

    /// Get the metadata for this tool
    fn spec(&self) -> ToolSpec;

    /// Execute the tool with the given input
    async fn execute(&self, input: Self::Input) -> Result<Self::Output>;
}
