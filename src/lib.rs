//! Two cooperating agents on one conversation thread
//!
//! This crate implements:
//! - A client for the remote agent session service (agents, threads, messages, runs)
//! - A registry and executor for locally implemented function tools
//! - A polling state machine that drives runs and answers their tool calls
//! - A one-hop handoff from a weather agent to a temperature conversion agent


pub mod agent;
pub mod config;
pub mod service;
pub mod tools;
pub mod types;

pub use agent::{
    run_session, Conversation, HandoffCoordinator, PollerConfig, RunPoller, Session,
    SessionConfig,
};
pub use service::{AgentService, HttpAgentService};
pub use tools::{ToolExecutor, ToolRegistry};
pub use types::*;
