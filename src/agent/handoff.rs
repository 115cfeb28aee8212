use super::poller::RunPoller;
use crate::service::AgentService;
use crate::types::{Message, MessageRole, Run};
use anyhow::Result;
use tokio::time::Instant;
use tracing::{debug, info};

/// Unit marker of a temperature that still needs converting
pub const CELSIUS_MARKER: &str = "°C";

/// User message posted to the thread when the conversion agent takes over
pub const CONVERSION_REQUEST: &str = "Could you help convert this Celsius temperature to Fahrenheit so we can see both? Please explain the conversion.";

/// Decision to hand the thread over to a second agent
#[derive(Debug, Clone, PartialEq)]
pub struct SecondRunRequest {
    pub agent_id: String,
    pub message: String,
}

/// Result of a handoff that actually took place
#[derive(Debug, Clone)]
pub struct HandoffOutcome {
    pub request: SecondRunRequest,
    pub message_id: String,
    /// The second run, in a terminal state
    pub run: Run,
}

/// One-hop handoff from the first agent to a fixed target agent, triggered
/// by a marker anywhere in the transcript
#[derive(Debug, Clone)]
pub struct HandoffCoordinator {
    target_agent_id: String,
    marker: String,
    message: String,
}

impl HandoffCoordinator {
    pub fn new(target_agent_id: impl Into<String>) -> Self {
        Self {
            target_agent_id: target_agent_id.into(),
            marker: CELSIUS_MARKER.to_string(),
            message: CONVERSION_REQUEST.to_string(),
        }
    }

    pub fn with_marker(mut self, marker: impl Into<String>) -> Self {
        self.marker = marker.into();
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// True if any message collected so far contains the marker
    pub fn is_triggered(&self, transcript: &[Message]) -> bool {
        transcript
            .iter()
            .any(|message| message.text().contains(&self.marker))
    }

    /// Decide whether the target agent should run, without side effects
    pub fn evaluate(&self, transcript: &[Message]) -> Option<SecondRunRequest> {
        self.is_triggered(transcript).then(|| SecondRunRequest {
            agent_id: self.target_agent_id.clone(),
            message: self.message.clone(),
        })
    }

    /// Post the follow-up message and drive the target agent's run when the
    /// transcript calls for it. Returns `None` if nothing was triggered.
    pub async fn maybe_handoff(
        &self,
        service: &dyn AgentService,
        poller: &RunPoller,
        thread_id: &str,
        transcript: &[Message],
        deadline: Option<Instant>,
    ) -> Result<Option<HandoffOutcome>> {
        let Some(request) = self.evaluate(transcript) else {
            debug!("No '{}' in transcript, no handoff", self.marker);
            return Ok(None);
        };

        let message_id = service
            .create_message(thread_id, MessageRole::User, &request.message)
            .await?;
        info!("Created conversion request message, ID: {}", message_id);

        let run_id = service.create_run(thread_id, &request.agent_id).await?;
        info!("Started handoff run, ID: {}", run_id);

        let run = poller.drive(thread_id, &run_id, deadline).await?;
        info!("Handoff run completed with status: {}", run.status);

        Ok(Some(HandoffOutcome {
            request,
            message_id,
            run,
        }))
    }
}
