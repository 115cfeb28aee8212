use std::io;

/// Log to stderr so stdout only carries the transcript
pub fn setup_logging(verbose_level: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        // Use RUST_LOG if set
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        // Map verbosity count to filters
        let filter_str = match verbose_level {
            0 => "warn,agent_handoff=info",
            1 => "info,agent_handoff=debug",
            _ => "debug,agent_handoff=trace",
        };
        tracing_subscriber::EnvFilter::new(filter_str)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(verbose_level > 0)
        .with_line_number(verbose_level > 0)
        .with_level(true)
        .with_writer(io::stderr)
        .init();
}
