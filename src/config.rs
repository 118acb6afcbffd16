use clap::Parser;
use std::time::Duration;
use tracing::Level;

use crate::codec::DEFAULT_MAX_FRAME_SIZE;

const PORT: u16 = 6379;

/// Server settings, taken from the command line or the environment.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Config {
    /// The address to bind to
    #[arg(long, env = "TINYDIS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// The port to listen on
    #[arg(short, long, env = "TINYDIS_PORT", default_value_t = PORT)]
    pub port: u16,

    /// Largest number of buffered bytes a single request may take
    #[arg(long, env = "MAX_FRAME_SIZE", default_value_t = DEFAULT_MAX_FRAME_SIZE)]
    pub max_frame_size: usize,

    /// Seconds open connections are given to finish once shutdown starts
    #[arg(long = "shutdown-timeout", env = "TINYDIS_SHUTDOWN_TIMEOUT", default_value_t = 1)]
    pub shutdown_timeout_secs: u64,

    #[arg(long, env = "TINYDIS_LOG_LEVEL", default_value_t = Level::INFO)]
    pub log_level: Level,
}

impl Config {
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }
}
