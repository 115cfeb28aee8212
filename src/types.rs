use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states reported by the agent session service for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Incomplete,
}

impl RunStatus {
    /// Terminal runs are never mutated again by the service
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed
                | RunStatus::Failed
                | RunStatus::Cancelled
                | RunStatus::Expired
                | RunStatus::Incomplete
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::Incomplete => "incomplete",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One execution of an agent against a thread
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub id: String,
    pub thread_id: String,
    pub agent_id: String,
    pub status: RunStatus,
    /// Present while the run waits for caller-supplied data
    pub required_action: Option<RequiredAction>,
    /// Error message reported by the service for failed runs
    pub last_error: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// What a run in `RequiresAction` is waiting for
#[derive(Debug, Clone, PartialEq)]
pub enum RequiredAction {
    SubmitToolOutputs { tool_calls: Vec<ToolCallRequest> },
    /// An action type this client does not know how to satisfy
    Unsupported(String),
}

/// A pending function invocation demanded by a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    /// JSON-encoded arguments exactly as produced by the model
    pub arguments: String,
}

impl ToolCallRequest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// Result of executing one `ToolCallRequest`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    #[serde(rename = "assistant", alias = "agent")]
    Agent,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => f.write_str("user"),
            MessageRole::Agent => f.write_str("assistant"),
            MessageRole::System => f.write_str("system"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MessageContent {
    Text(String),
    Structured(Vec<ContentBlock>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Text { text: String },
    ImageFile { file_id: String },
    /// Content types we only carry through, never interpret
    Other { kind: String },
}

/// One transcript entry of a thread
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: MessageContent,
    pub created_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Plain text view of the message. Text blocks are joined by newlines,
    /// non-text blocks are skipped.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Structured(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.text())
    }
}

/// Function-tool declaration sent to the service when creating an agent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Everything needed to create an agent on the service
#[derive(Debug, Clone)]
pub struct AgentDefinition {
    pub model: String,
    pub name: String,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
}

/// Transport and service errors of the agent session service
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(RunStatus::Expired.is_terminal());
        assert!(RunStatus::Incomplete.is_terminal());

        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::InProgress.is_terminal());
        assert!(!RunStatus::RequiresAction.is_terminal());
        assert!(!RunStatus::Cancelling.is_terminal());
    }

    #[test]
    fn test_status_wire_names() {
        let status: RunStatus = serde_json::from_str("\"requires_action\"").unwrap();
        assert_eq!(status, RunStatus::RequiresAction);
        assert_eq!(RunStatus::InProgress.to_string(), "in_progress");
    }

    #[test]
    fn test_message_text_joins_text_blocks() {
        let message = Message {
            id: "msg_1".to_string(),
            role: MessageRole::Agent,
            content: MessageContent::Structured(vec![
                ContentBlock::Text {
                    text: "It is sunny.".to_string(),
                },
                ContentBlock::ImageFile {
                    file_id: "file_1".to_string(),
                },
                ContentBlock::Text {
                    text: "25°C right now.".to_string(),
                },
            ]),
            created_at: None,
        };

        assert_eq!(message.text(), "It is sunny.\n25°C right now.");
        assert_eq!(
            message.to_string(),
            "assistant: It is sunny.\n25°C right now."
        );
    }

    #[test]
    fn test_role_accepts_agent_alias() {
        let role: MessageRole = serde_json::from_str("\"agent\"").unwrap();
        assert_eq!(role, MessageRole::Agent);
        let role: MessageRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(role, MessageRole::Agent);
    }
}
