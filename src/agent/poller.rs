use crate::service::AgentService;
use crate::tools::ToolExecutor;
use crate::types::{RequiredAction, Run, RunStatus, ToolCallRequest};
use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info, warn};

/// Tuning knobs for driving a run to completion
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Fixed delay between two status fetches
    pub poll_interval: Duration,
    /// Consecutive `requires_action` polls without a submission before the
    /// run is given up and cancelled
    pub max_unresolved_polls: u32,
    /// Polls granted to the service to confirm a cancellation
    pub max_polls_after_cancel: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_unresolved_polls: 3,
            max_polls_after_cancel: 30,
        }
    }
}

/// Inconsistent required actions that make a run impossible to continue
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StructuralRunError {
    #[error("Run requested tool outputs without any tool calls")]
    EmptyRequiredAction,

    #[error("Run requires action but did not say which")]
    MissingRequiredAction,

    #[error("Unsupported required action: {0}")]
    UnsupportedRequiredAction(String),

    #[error("Required action still unresolved after {0} polls")]
    UnresolvableRequiredAction(u32),
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("Run {run_id} did not reach a terminal state within {polls} polls after cancellation")]
    CancellationStalled { run_id: String, polls: u32 },
}

/// What happened when a `requires_action` poll was handled
enum ActionStep {
    Submitted,
    /// Nothing could be submitted this round
    Unresolved,
    Structural(StructuralRunError),
}

/// Drives one remote run at a time from creation to a terminal state
#[derive(Clone)]
pub struct RunPoller {
    service: Arc<dyn AgentService>,
    executor: ToolExecutor,
    config: PollerConfig,
}

impl RunPoller {
    pub fn new(service: Arc<dyn AgentService>, executor: ToolExecutor, config: PollerConfig) -> Self {
        Self {
            service,
            executor,
            config,
        }
    }

    /// Poll the run until it is terminal, executing and submitting tool calls
    /// whenever the run asks for them.
    ///
    /// Structural failures and a passed `deadline` cancel the run; the
    /// returned run is always in a terminal state. Service errors are not
    /// retried and propagate to the caller.
    pub async fn drive(&self, thread_id: &str, run_id: &str, deadline: Option<Instant>) -> Result<Run> {
        let mut run = self.service.get_run(thread_id, run_id).await?;
        let mut consumed: HashSet<String> = HashSet::new();
        let mut unresolved_polls = 0u32;
        let mut polls_since_cancel: Option<u32> = None;

        while !run.status.is_terminal() {
            if polls_since_cancel.is_none() && deadline.is_some_and(|d| Instant::now() >= d) {
                warn!("Deadline passed for run {}, cancelling", run_id);
                self.service.cancel_run(thread_id, run_id).await?;
                polls_since_cancel = Some(0);
            }

            if let Some(polls) = polls_since_cancel {
                if polls >= self.config.max_polls_after_cancel {
                    return Err(RunError::CancellationStalled {
                        run_id: run_id.to_string(),
                        polls,
                    }
                    .into());
                }
            }

            sleep(self.config.poll_interval).await;
            run = self.service.get_run(thread_id, run_id).await?;

            if let Some(polls) = polls_since_cancel.as_mut() {
                *polls += 1;
            } else if run.status == RunStatus::RequiresAction {
                let step = self
                    .resolve_required_action(thread_id, run_id, run.required_action.as_ref(), &mut consumed)
                    .await?;

                let structural = match step {
                    ActionStep::Submitted => {
                        unresolved_polls = 0;
                        None
                    }
                    ActionStep::Unresolved => {
                        unresolved_polls += 1;
                        (unresolved_polls >= self.config.max_unresolved_polls).then_some(
                            StructuralRunError::UnresolvableRequiredAction(unresolved_polls),
                        )
                    }
                    ActionStep::Structural(e) => Some(e),
                };

                if let Some(e) = structural {
                    error!("Cancelling run {}: {}", run_id, e);
                    self.service.cancel_run(thread_id, run_id).await?;
                    polls_since_cancel = Some(0);
                }
            } else {
                unresolved_polls = 0;
            }

            info!("Current run status: {}", run.status);
        }

        if let Some(last_error) = &run.last_error {
            warn!("Run {} ended as {}: {}", run_id, run.status, last_error);
        }
        Ok(run)
    }

    async fn resolve_required_action(
        &self,
        thread_id: &str,
        run_id: &str,
        action: Option<&RequiredAction>,
        consumed: &mut HashSet<String>,
    ) -> Result<ActionStep> {
        let tool_calls = match action {
            None => return Ok(ActionStep::Structural(StructuralRunError::MissingRequiredAction)),
            Some(RequiredAction::Unsupported(kind)) => {
                return Ok(ActionStep::Structural(
                    StructuralRunError::UnsupportedRequiredAction(kind.clone()),
                ))
            }
            Some(RequiredAction::SubmitToolOutputs { tool_calls }) if tool_calls.is_empty() => {
                return Ok(ActionStep::Structural(StructuralRunError::EmptyRequiredAction))
            }
            Some(RequiredAction::SubmitToolOutputs { tool_calls }) => tool_calls,
        };

        // Each call is executed at most once, even if the service keeps
        // reporting it on later polls
        let pending: Vec<ToolCallRequest> = tool_calls
            .iter()
            .filter(|call| !consumed.contains(&call.id))
            .cloned()
            .collect();
        if pending.is_empty() {
            debug!("All {} tool calls were already handled", tool_calls.len());
            return Ok(ActionStep::Unresolved);
        }
        consumed.extend(pending.iter().map(|call| call.id.clone()));

        debug!("Executing {} tool calls for run {}", pending.len(), run_id);
        let outcome = self.executor.execute_batch(&pending).await;

        if outcome.outputs.is_empty() {
            warn!(
                "All {} tool calls failed, nothing to submit for run {}",
                outcome.failures.len(),
                run_id
            );
            return Ok(ActionStep::Unresolved);
        }

        self.service
            .submit_tool_outputs(thread_id, run_id, &outcome.outputs)
            .await?;
        info!(
            "Submitted {} tool outputs to run {} ({} failed)",
            outcome.outputs.len(),
            run_id,
            outcome.failures.len()
        );
        Ok(ActionStep::Submitted)
    }
}
