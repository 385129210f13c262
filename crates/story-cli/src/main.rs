mod cli;

use tracing_subscriber::{EnvFilter, fmt};

/// Log filter variable; defaults to `warn`.
const LOG_ENV: &str = "STORY_LOG";

fn main() {
    init_logging();
    if let Err(e) = cli::run() {
        eprintln!("{e:#}"); // pretty anyhow chain
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    if let Err(e) = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
    {
        eprintln!("tracing init failed: {e}");
    }
}
