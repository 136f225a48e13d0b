//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod serve;
pub mod watch;

/// Cucina - Live Kitchen Dashboard
#[derive(Parser)]
#[command(name = "cucina")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the kitchen simulation and its dashboard server
    Serve(serve::ServeArgs),

    /// Attach the reconnecting watch client to a running server
    Watch(watch::WatchArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Serve(args) => serve::execute(args).await,
            Commands::Watch(args) => watch::execute(args).await,
        }
    }
}
