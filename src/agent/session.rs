use super::handoff::{HandoffCoordinator, HandoffOutcome};
use super::poller::{PollerConfig, RunPoller};
use crate::service::AgentService;
use crate::tools::{ToolExecutor, ToolRegistry};
use crate::types::{AgentDefinition, Message, MessageRole, Run};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

const WEATHER_AGENT_NAME: &str = "weather-assistant";
const CONVERSION_AGENT_NAME: &str = "conversion-assistant";
const WEATHER_INSTRUCTIONS: &str = include_str!("../../resources/weather_agent.md");
const CONVERSION_INSTRUCTIONS: &str = include_str!("../../resources/conversion_agent.md");

/// Settings for one orchestration session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Model deployment used by both agents
    pub model: String,
    pub poller: PollerConfig,
    /// Upper bound for each single run; the run is cancelled once exceeded
    pub run_timeout: Option<Duration>,
}

/// Everything a finished conversation produced
#[derive(Debug, Clone)]
pub struct Conversation {
    pub thread_id: String,
    pub weather_run: Run,
    pub handoff: Option<HandoffOutcome>,
    /// All thread messages, oldest first
    pub transcript: Vec<Message>,
}

/// The two agents of a session together with the components driving them.
/// Agents are created in `open` and deleted in `close`.
pub struct Session {
    service: Arc<dyn AgentService>,
    poller: RunPoller,
    config: SessionConfig,
    weather_agent_id: String,
    conversion_agent_id: String,
    closed: bool,
}

impl Session {
    /// Create both agents. If the second one cannot be created, the first is
    /// deleted again before the error is returned.
    pub async fn open(
        service: Arc<dyn AgentService>,
        registry: Arc<ToolRegistry>,
        config: SessionConfig,
    ) -> Result<Self> {
        let tools = registry.definitions();

        let weather_agent_id = service
            .create_agent(&AgentDefinition {
                model: config.model.clone(),
                name: WEATHER_AGENT_NAME.to_string(),
                instructions: WEATHER_INSTRUCTIONS.to_string(),
                tools: tools.clone(),
            })
            .await
            .context("Failed to create weather agent")?;
        info!("Created weather agent, ID: {}", weather_agent_id);

        let conversion_agent_id = match service
            .create_agent(&AgentDefinition {
                model: config.model.clone(),
                name: CONVERSION_AGENT_NAME.to_string(),
                instructions: CONVERSION_INSTRUCTIONS.to_string(),
                tools,
            })
            .await
        {
            Ok(id) => id,
            Err(e) => {
                if let Err(cleanup) = service.delete_agent(&weather_agent_id).await {
                    warn!("Failed to delete agent {}: {:#}", weather_agent_id, cleanup);
                }
                return Err(e.context("Failed to create conversion agent"));
            }
        };
        info!("Created conversion agent, ID: {}", conversion_agent_id);

        let executor = ToolExecutor::new(registry);
        let poller = RunPoller::new(service.clone(), executor, config.poller.clone());

        Ok(Self {
            service,
            poller,
            config,
            weather_agent_id,
            conversion_agent_id,
            closed: false,
        })
    }

    pub fn weather_agent_id(&self) -> &str {
        &self.weather_agent_id
    }

    pub fn conversion_agent_id(&self) -> &str {
        &self.conversion_agent_id
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.run_timeout.map(|timeout| Instant::now() + timeout)
    }

    /// Ask the weather agent, hand over to the conversion agent if the
    /// answer contains a Celsius value, and read back the whole thread.
    pub async fn converse(&self, prompt: &str) -> Result<Conversation> {
        let thread_id = self.service.create_thread().await?;
        info!("Created thread, ID: {}", thread_id);

        let message_id = self
            .service
            .create_message(&thread_id, MessageRole::User, prompt)
            .await?;
        info!("Created initial user message, ID: {}", message_id);

        let run_id = self
            .service
            .create_run(&thread_id, &self.weather_agent_id)
            .await?;
        info!("Started weather agent run, ID: {}", run_id);

        let weather_run = self
            .poller
            .drive(&thread_id, &run_id, self.deadline())
            .await
            .with_context(|| format!("Weather agent run failed (thread {thread_id})"))?;
        info!("Weather agent run completed with status: {}", weather_run.status);

        let messages = self.service.list_messages(&thread_id).await?;
        let handoff = HandoffCoordinator::new(self.conversion_agent_id.clone())
            .maybe_handoff(
                self.service.as_ref(),
                &self.poller,
                &thread_id,
                &messages,
                self.deadline(),
            )
            .await
            .with_context(|| format!("Handoff to conversion agent failed (thread {thread_id})"))?;

        let mut transcript = self.service.list_messages(&thread_id).await?;
        transcript.reverse();

        Ok(Conversation {
            thread_id,
            weather_run,
            handoff,
            transcript,
        })
    }

    /// Delete both agents. Every deletion is attempted; the first failure is
    /// returned afterwards.
    pub async fn close(mut self) -> Result<()> {
        self.closed = true;
        info!("Cleaning up resources...");

        let mut first_error = None;
        for agent_id in [&self.weather_agent_id, &self.conversion_agent_id] {
            if let Err(e) = self.service.delete_agent(agent_id).await {
                warn!("Failed to delete agent {}: {:#}", agent_id, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e.context("Failed to delete session agents")),
            None => {
                info!("Agents deleted successfully");
                Ok(())
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.closed {
            warn!(
                "Session dropped without close, agents {} and {} are left on the service",
                self.weather_agent_id, self.conversion_agent_id
            );
        }
    }
}

/// Open a session, run one conversation and always release the agents,
/// whether the conversation succeeded or not.
pub async fn run_session(
    service: Arc<dyn AgentService>,
    registry: Arc<ToolRegistry>,
    config: SessionConfig,
    prompt: &str,
) -> Result<Conversation> {
    let session = Session::open(service, registry, config).await?;
    let result = session.converse(prompt).await;

    match session.close().await {
        Ok(()) => result,
        Err(close_error) => match result {
            Err(e) => Err(e),
            Ok(_) => Err(close_error),
        },
    }
}
