use crate::tools::core::{ToolError, ToolRegistry};
use crate::types::{ToolCallRequest, ToolOutput};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, warn, Instrument};

/// Why a single tool call could not produce an output
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Tool '{tool}' failed: {cause}")]
    ToolRaised { tool: String, cause: String },
}

/// Result of executing one batch of tool calls, in request order
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub outputs: Vec<ToolOutput>,
    /// Call id and error of every request that produced no output
    pub failures: Vec<(String, ExecutionError)>,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}

/// Runs tool calls against the registry, isolating each call's failure
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// Execute one tool call. Errors and panics raised by the tool are
    /// returned as `ExecutionError`, never propagated.
    pub async fn execute(&self, request: &ToolCallRequest) -> Result<ToolOutput, ExecutionError> {
        let span = tracing::info_span!("tool_call", tool = %request.name, call_id = %request.id);
        self.invoke_tool(request).instrument(span).await
    }

    async fn invoke_tool(&self, request: &ToolCallRequest) -> Result<ToolOutput, ExecutionError> {
        let tool = self
            .registry
            .resolve(&request.name)
            .ok_or_else(|| ExecutionError::UnknownTool(request.name.clone()))?;

        debug!("Executing tool with arguments: {}", request.arguments);

        let result = AssertUnwindSafe(tool.invoke(&request.arguments))
            .catch_unwind()
            .await
            .map_err(|payload| ExecutionError::ToolRaised {
                tool: request.name.clone(),
                cause: format!("panicked: {}", panic_message(payload)),
            })?;

        match result {
            Ok(output) => Ok(ToolOutput {
                tool_call_id: request.id.clone(),
                output,
            }),
            Err(e) => match e.downcast_ref::<ToolError>() {
                Some(ToolError::ParseError(reason)) => Err(ExecutionError::InvalidArguments {
                    tool: request.name.clone(),
                    reason: reason.clone(),
                }),
                None => Err(ExecutionError::ToolRaised {
                    tool: request.name.clone(),
                    cause: format!("{e:#}"),
                }),
            },
        }
    }

    /// Execute a batch sequentially. Failed calls are logged and left out of
    /// the outputs; the order of the remaining outputs follows the requests.
    pub async fn execute_batch(&self, requests: &[ToolCallRequest]) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();

        for request in requests {
            match self.execute(request).await {
                Ok(output) => outcome.outputs.push(output),
                Err(e) => {
                    warn!("Error executing tool call {}: {}", request.id, e);
                    outcome.failures.push((request.id.clone(), e));
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::mocks::{FailingTool, PanickingTool};
    use std::collections::HashSet;

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::with_default_tools().unwrap();
        registry.register(FailingTool).unwrap();
        registry.register(PanickingTool).unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn test_execute_success_keeps_call_id() {
        let request = ToolCallRequest::new("call_1", "fetch_weather", r#"{"location":"London"}"#);
        let output = executor().execute(&request).await.unwrap();

        assert_eq!(output.tool_call_id, "call_1");
        assert_eq!(output.output, r#"{"weather":"Cloudy, 18°C"}"#);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let request = ToolCallRequest::new("call_1", "get_stock_price", "{}");
        let error = executor().execute(&request).await.unwrap_err();
        assert!(matches!(error, ExecutionError::UnknownTool(name) if name == "get_stock_price"));
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let request = ToolCallRequest::new("call_1", "fetch_weather", r#"{"city":"London"}"#);
        let error = executor().execute(&request).await.unwrap_err();
        assert!(matches!(error, ExecutionError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_tool_error_is_captured() {
        let request = ToolCallRequest::new("call_1", "always_fails", "{}");
        let error = executor().execute(&request).await.unwrap_err();
        match error {
            ExecutionError::ToolRaised { tool, cause } => {
                assert_eq!(tool, "always_fails");
                assert!(cause.contains("backend unavailable"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_tool_panic_is_captured() {
        let request = ToolCallRequest::new("call_1", "always_panics", "{}");
        let error = executor().execute(&request).await.unwrap_err();
        assert!(
            matches!(error, ExecutionError::ToolRaised { ref cause, .. } if cause.contains("boom"))
        );
    }

    #[tokio::test]
    async fn test_batch_partial_failure_keeps_order() {
        let requests = vec![
            ToolCallRequest::new("call_1", "fetch_weather", r#"{"location":"Tokyo"}"#),
            ToolCallRequest::new("call_2", "get_stock_price", "{}"),
            ToolCallRequest::new("call_3", "convert_temperature", r#"{"temperature":"22°C"}"#),
            ToolCallRequest::new("call_4", "always_fails", "{}"),
        ];

        let outcome = executor().execute_batch(&requests).await;

        let ids: Vec<&str> = outcome
            .outputs
            .iter()
            .map(|output| output.tool_call_id.as_str())
            .collect();
        assert_eq!(ids, vec!["call_1", "call_3"]);
        assert_eq!(outcome.failures.len(), 2);
        assert_eq!(outcome.failures[0].0, "call_2");
        assert_eq!(outcome.failures[1].0, "call_4");

        // Output ids are a duplicate-free subset of the request ids
        let request_ids: HashSet<&str> = requests.iter().map(|r| r.id.as_str()).collect();
        let unique: HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(unique.is_subset(&request_ids));
    }
}
