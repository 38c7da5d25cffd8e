//! CLI definition and command handling

pub mod commands;

use clap::{Parser, Subcommand};

use commands::{CrawlCommand, InitCommand};

/// Spindle - Coordinator CLI for Scrapyd-managed crawl projects
#[derive(Debug, Parser)]
#[command(name = "spindle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Suppress output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate, deploy, and schedule every project in the manifest
    Init(InitCommand),

    /// Trigger a crawl run for one registered project
    Crawl(CrawlCommand),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Init(ref cmd) => cmd.execute(&self),
            Commands::Crawl(ref cmd) => cmd.execute(&self),
        }
    }
}
