mod cli;
mod logging;

use agent_handoff::config::ServiceConfig;
use agent_handoff::{run_session, HttpAgentService, PollerConfig, SessionConfig, ToolRegistry};
use anyhow::{Context, Result};
use cli::Args;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let args = Args::parse();
    logging::setup_logging(args.verbose);

    let mut config = ServiceConfig::from_env()?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(model) = args.model {
        config.model = model;
    }

    let service = HttpAgentService::new(
        &config.endpoint,
        config.api_version.clone(),
        config.auth_provider(),
    )
    .context("Failed to set up service client")?;
    let registry = ToolRegistry::with_default_tools()?;

    let session_config = SessionConfig {
        model: config.model.clone(),
        poller: PollerConfig {
            poll_interval: Duration::from_millis(args.poll_interval_ms),
            max_unresolved_polls: args.max_unresolved,
            ..PollerConfig::default()
        },
        run_timeout: args.timeout_secs.map(Duration::from_secs),
    };

    let conversation = run_session(
        Arc::new(service),
        Arc::new(registry),
        session_config,
        &args.prompt,
    )
    .await?;

    println!("\nFull conversation:");
    for message in &conversation.transcript {
        println!("{message}");
    }

    Ok(())
}
