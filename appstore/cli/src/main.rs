mod cli;
mod commands;
mod context;

use anyhow::Result;
use clap::Parser;

use self::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logging();
    cli.run().await
}
