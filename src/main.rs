use clap::Parser;
use deckmill::config::Config;
use deckmill::logging::init_logging;
use deckmill::mcp::run_server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    init_logging(config.log_level.as_deref())?;
    run_server(&config).await
}
