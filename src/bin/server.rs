use clap::Parser;
use tinydis::config::Config;
use tinydis::{server, Error};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::parse();

    let _ = tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .try_init()
        .map_err(|e| eprintln!("Failed to initialize global tracing: {}", e));

    server::run(config).await
}
