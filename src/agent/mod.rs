//! Orchestration of agent runs on a shared thread
//!
//! - [`RunPoller`] drives a single run to a terminal state and answers its
//!   tool-call requests
//! - [`HandoffCoordinator`] decides whether a second agent takes over
//! - [`Session`] owns the two agents of a conversation and releases them


pub mod handoff;
pub mod poller;
pub mod session;

pub use handoff::{HandoffCoordinator, HandoffOutcome, SecondRunRequest};
pub use poller::{PollerConfig, RunError, RunPoller, StructuralRunError};
pub use session::{run_session, Conversation, Session, SessionConfig};
