//! Client side of the remote agent session service
//!
//! The orchestration core only talks to the service through the
//! [`AgentService`] trait. [`HttpAgentService`] implements it against the
//! Assistants-style REST API; tests substitute an in-memory mock.


mod utils;

pub mod http;

pub use http::{ApiKeyAuth, AuthProvider, BearerTokenAuth, HttpAgentService};

use crate::types::{AgentDefinition, Message, MessageRole, Run, ToolOutput};
use anyhow::Result;
use async_trait::async_trait;

/// Operations the orchestration needs from the agent session service
#[async_trait]
pub trait AgentService: Send + Sync {
    /// Creates an agent and returns its identifier
    async fn create_agent(&self, definition: &AgentDefinition) -> Result<String>;

    async fn delete_agent(&self, agent_id: &str) -> Result<()>;

    /// Creates an empty thread and returns its identifier
    async fn create_thread(&self) -> Result<String>;

    /// Appends a message to a thread and returns its identifier
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<String>;

    /// Lists the messages of a thread, newest first
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Starts an agent on a thread and returns the run identifier
    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<String>;

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run>;

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<()>;

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<()>;
}
