use super::utils::{check_response_error, parse_json};
use super::AgentService;
use crate::types::*;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use url::Url;

/// Page size used when listing thread messages
const MESSAGE_PAGE_LIMIT: u32 = 100;

/// Trait for providing authentication headers
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn get_auth_headers(&self) -> Result<Vec<(String, String)>>;
}

/// Key-based authentication, sent in the `api-key` header
pub struct ApiKeyAuth {
    api_key: String,
}

impl ApiKeyAuth {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

#[async_trait]
impl AuthProvider for ApiKeyAuth {
    async fn get_auth_headers(&self) -> Result<Vec<(String, String)>> {
        Ok(vec![("api-key".to_string(), self.api_key.clone())])
    }
}

/// Token-based authentication with a pre-acquired bearer token
pub struct BearerTokenAuth {
    token: String,
}

impl BearerTokenAuth {
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

#[async_trait]
impl AuthProvider for BearerTokenAuth {
    async fn get_auth_headers(&self) -> Result<Vec<(String, String)>> {
        Ok(vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.token),
        )])
    }
}

#[derive(Debug, Deserialize)]
struct IdResponse {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateAgentRequest<'a> {
    model: &'a str,
    name: &'a str,
    instructions: &'a str,
    tools: Vec<FunctionToolDeclaration<'a>>,
}

#[derive(Debug, Serialize)]
struct FunctionToolDeclaration<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: &'a ToolDefinition,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: MessageRole,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Serialize)]
struct SubmitToolOutputsRequest<'a> {
    tool_outputs: &'a [ToolOutput],
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    id: String,
    thread_id: String,
    assistant_id: String,
    status: RunStatus,
    #[serde(default)]
    required_action: Option<RequiredActionResponse>,
    #[serde(default)]
    last_error: Option<RunErrorResponse>,
    #[serde(default)]
    created_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RequiredActionResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    submit_tool_outputs: Option<SubmitToolOutputsResponse>,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputsResponse {
    #[serde(default)]
    tool_calls: Vec<ToolCallResponse>,
}

#[derive(Debug, Deserialize)]
struct ToolCallResponse {
    id: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    function: Option<FunctionCallResponse>,
}

#[derive(Debug, Deserialize)]
struct FunctionCallResponse {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct RunErrorResponse {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageListResponse {
    data: Vec<MessageResponse>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    last_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    id: String,
    role: MessageRole,
    #[serde(default)]
    content: Vec<ContentResponse>,
    #[serde(default)]
    created_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextResponse>,
    #[serde(default)]
    image_file: Option<ImageFileResponse>,
}

#[derive(Debug, Deserialize)]
struct TextResponse {
    value: String,
}

#[derive(Debug, Deserialize)]
struct ImageFileResponse {
    file_id: String,
}

fn timestamp(seconds: Option<i64>) -> Option<DateTime<Utc>> {
    seconds.and_then(|secs| DateTime::from_timestamp(secs, 0))
}

impl From<RunResponse> for Run {
    fn from(response: RunResponse) -> Self {
        let required_action = response.required_action.map(|action| {
            match (action.kind.as_str(), action.submit_tool_outputs) {
                ("submit_tool_outputs", Some(submit)) => RequiredAction::SubmitToolOutputs {
                    tool_calls: submit
                        .tool_calls
                        .into_iter()
                        .filter_map(|call| {
                            let is_function =
                                call.kind.as_deref().map_or(true, |kind| kind == "function");
                            match call.function {
                                Some(function) if is_function => Some(ToolCallRequest {
                                    id: call.id,
                                    name: function.name,
                                    arguments: function.arguments,
                                }),
                                _ => {
                                    warn!("Skipping non-function tool call {}", call.id);
                                    None
                                }
                            }
                        })
                        .collect(),
                },
                ("submit_tool_outputs", None) => RequiredAction::SubmitToolOutputs {
                    tool_calls: Vec::new(),
                },
                (kind, _) => RequiredAction::Unsupported(kind.to_string()),
            }
        });

        let last_error = response.last_error.map(|error| {
            match (error.code, error.message) {
                (Some(code), Some(message)) => format!("{code}: {message}"),
                (None, Some(message)) => message,
                (Some(code), None) => code,
                (None, None) => "unspecified error".to_string(),
            }
        });

        Run {
            id: response.id,
            thread_id: response.thread_id,
            agent_id: response.assistant_id,
            status: response.status,
            required_action,
            last_error,
            created_at: timestamp(response.created_at),
        }
    }
}

impl From<MessageResponse> for Message {
    fn from(response: MessageResponse) -> Self {
        let blocks = response
            .content
            .into_iter()
            .map(|content| match (content.kind.as_str(), content.text, content.image_file) {
                ("text", Some(text), _) => ContentBlock::Text { text: text.value },
                ("image_file", _, Some(image)) => ContentBlock::ImageFile {
                    file_id: image.file_id,
                },
                (kind, _, _) => ContentBlock::Other {
                    kind: kind.to_string(),
                },
            })
            .collect();

        Message {
            id: response.id,
            role: response.role,
            content: MessageContent::Structured(blocks),
            created_at: timestamp(response.created_at),
        }
    }
}

/// REST client for the Assistants-style agent session service
pub struct HttpAgentService {
    client: Client,
    base_url: Url,
    api_version: Option<String>,
    auth_provider: Box<dyn AuthProvider>,
}

impl HttpAgentService {
    pub fn new(
        base_url: &str,
        api_version: Option<String>,
        auth_provider: Box<dyn AuthProvider>,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid service endpoint: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Service endpoint cannot be used as a base URL: {base_url}");
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            api_version,
            auth_provider,
        })
    }

    /// Build the URL for a path below the endpoint, e.g. `["threads", id, "runs"]`
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        if let Some(version) = &self.api_version {
            url.query_pairs_mut().append_pair("api-version", version);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let mut request = request;
        for (name, value) in self.auth_provider.get_auth_headers().await? {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        check_response_error(response).await
    }

    async fn post_for_id<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> Result<String> {
        let response = self
            .send(self.client.post(self.url(segments)).json(body))
            .await?;
        let created: IdResponse = parse_json(response).await?;
        Ok(created.id)
    }
}

#[async_trait]
impl AgentService for HttpAgentService {
    async fn create_agent(&self, definition: &AgentDefinition) -> Result<String> {
        let request = CreateAgentRequest {
            model: &definition.model,
            name: &definition.name,
            instructions: &definition.instructions,
            tools: definition
                .tools
                .iter()
                .map(|function| FunctionToolDeclaration {
                    kind: "function",
                    function,
                })
                .collect(),
        };

        let id = self.post_for_id(&["assistants"], &request).await?;
        debug!("Created agent '{}' with ID {}", definition.name, id);
        Ok(id)
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<()> {
        self.send(self.client.delete(self.url(&["assistants", agent_id])))
            .await?;
        debug!("Deleted agent {}", agent_id);
        Ok(())
    }

    async fn create_thread(&self) -> Result<String> {
        self.post_for_id(&["threads"], &serde_json::json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<String> {
        let request = CreateMessageRequest { role, content };
        self.post_for_id(&["threads", thread_id, "messages"], &request)
            .await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let mut messages = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut url = self.url(&["threads", thread_id, "messages"]);
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("order", "desc")
                    .append_pair("limit", &MESSAGE_PAGE_LIMIT.to_string());
                if let Some(cursor) = &after {
                    query.append_pair("after", cursor);
                }
            }

            let response = self.send(self.client.get(url)).await?;
            let page: MessageListResponse = parse_json(response).await?;
            trace!("Fetched {} messages for thread {}", page.data.len(), thread_id);

            let page_was_empty = page.data.is_empty();
            messages.extend(page.data.into_iter().map(Message::from));

            match page.last_id {
                Some(last_id) if page.has_more && !page_was_empty => after = Some(last_id),
                _ => break,
            }
        }

        Ok(messages)
    }

    async fn create_run(&self, thread_id: &str, agent_id: &str) -> Result<String> {
        let request = CreateRunRequest {
            assistant_id: agent_id,
        };
        self.post_for_id(&["threads", thread_id, "runs"], &request)
            .await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<Run> {
        let response = self
            .send(self.client.get(self.url(&["threads", thread_id, "runs", run_id])))
            .await?;
        let run: RunResponse = parse_json(response).await?;
        Ok(run.into())
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<()> {
        let request = SubmitToolOutputsRequest {
            tool_outputs: outputs,
        };
        self.send(
            self.client
                .post(self.url(&["threads", thread_id, "runs", run_id, "submit_tool_outputs"]))
                .json(&request),
        )
        .await?;
        Ok(())
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<()> {
        self.send(
            self.client
                .post(self.url(&["threads", thread_id, "runs", run_id, "cancel"])),
        )
        .await?;
        Ok(())
    }
}
