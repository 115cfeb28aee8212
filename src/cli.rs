use clap::Parser;

pub const DEFAULT_PROMPT: &str = "Can you tell me what the weather is like in New York today? I'd like to know the temperature in both Celsius and Fahrenheit, please.";

/// Define the application arguments
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Question for the weather agent
    #[arg(short, long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// Delay between two run status polls, in milliseconds
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    pub poll_interval_ms: u64,

    /// Polls without submittable tool outputs before a run is cancelled
    #[arg(long, default_value_t = 3)]
    pub max_unresolved: u32,

    /// Cancel a run that has not finished after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Model deployment name (overrides MODEL_DEPLOYMENT_NAME)
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Service endpoint (overrides AGENTS_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn parse() -> Self {
        <Args as Parser>::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_default_args_parsing() {
        let args = Args::try_parse_from(["test"]).expect("Failed to parse default args");

        assert_eq!(args.prompt, DEFAULT_PROMPT);
        assert_eq!(args.poll_interval_ms, 1000);
        assert_eq!(args.max_unresolved, 3);
        assert_eq!(args.timeout_secs, None);
        assert_eq!(args.model, None);
        assert_eq!(args.endpoint, None);
        assert_eq!(args.verbose, 0);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "test",
            "--prompt",
            "Weather in Tokyo?",
            "--poll-interval-ms",
            "250",
            "--timeout-secs",
            "60",
            "-m",
            "gpt-4o-mini",
        ])
        .expect("Failed to parse override args");

        assert_eq!(args.prompt, "Weather in Tokyo?");
        assert_eq!(args.poll_interval_ms, 250);
        assert_eq!(args.timeout_secs, Some(60));
        assert_eq!(args.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        assert!(Args::try_parse_from(["test", "--poll-interval-ms", "0"]).is_err());
        let args = Args::try_parse_from(["test", "--poll-interval-ms", "1"]).unwrap();
        assert_eq!(args.poll_interval_ms, 1);
    }

    #[test]
    fn test_verbose_flag_counting() {
        let args = Args::try_parse_from(["test", "-vv"]).expect("Failed to parse verbose args");
        assert_eq!(args.verbose, 2);
    }
}
