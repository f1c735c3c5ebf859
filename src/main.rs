mod auth;
mod cli;
mod config;
mod error;
mod output;
mod page;
mod providers;
#[cfg(test)]
mod test_logging;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting jobtime");
    cli.execute().await?;

    Ok(())
}
