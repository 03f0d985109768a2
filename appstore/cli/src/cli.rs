use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::{DownloadCommand, LoginCommand, LookupCommand, PurchaseCommand, SearchCommand};
use crate::context::Context;

/**
    App Store license and package tool.
*/
#[derive(Parser)]
#[command(name = "appstore")]
pub struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

/**
    Options shared by every command.
*/
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /**
        Session file holding the machine identifier, cookies and sign-in token.
    */
    #[arg(long, global = true, env = "APPSTORE_SESSION", default_value = "appstore-session.json")]
    pub session: PathBuf,

    /**
        YAML file with endpoint overrides.
    */
    #[arg(long, global = true, env = "APPSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /**
        Log more detail. `RUST_LOG` takes precedence when set.
    */
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and store the session.
    Login(LoginCommand),
    /// Search the catalog by keyword.
    Search(SearchCommand),
    /// Look up a package by bundle identifier.
    Lookup(LookupCommand),
    /// Acquire a free package for the signed-in account.
    Purchase(PurchaseCommand),
    /// Acquire a license, download the package and write the patched archive.
    Download(DownloadCommand),
}

impl Cli {
    pub fn init_logging(&self) {
        let default = match self.global.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    pub async fn run(self) -> Result<()> {
        let mut context = Context::load(&self.global)?;

        let result = match self.command {
            Command::Login(cmd) => cmd.run(&mut context).await,
            Command::Search(cmd) => cmd.run(&mut context).await,
            Command::Lookup(cmd) => cmd.run(&mut context).await,
            Command::Purchase(cmd) => cmd.run(&mut context).await,
            Command::Download(cmd) => cmd.run(&mut context).await,
        };

        // Cookies and identity changes are kept even when the command failed.
        context.save()?;
        result
    }
}
