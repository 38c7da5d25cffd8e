//! Crawl command: trigger a run for one registered project

use clap::Args;
use console::style;
use tracing::{error, info};

use spindle_core::error::{ScrapydError, SpindleError};
use spindle_core::Context;
use spindle_projects::Project;
use spindle_scrapyd::ScrapydClient;

use crate::cli::Cli;

/// Trigger a crawl run for one registered project
#[derive(Debug, Args)]
pub struct CrawlCommand {
    /// Name of the manifest project to crawl
    pub project: String,
}

impl CrawlCommand {
    /// Execute the crawl command. Any failure is fatal to the process.
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_env()?;
        let client = ScrapydClient::new(&ctx.scrapyd_url)?;
        if !client.is_up() {
            let err = ScrapydError::Unreachable {
                url: ctx.scrapyd_url.clone(),
            };
            error!(error = %err, "daemon probe failed");
            return Err(SpindleError::from(err).into());
        }

        let project = Project::load(&ctx, &self.project)?;
        project.crawl(&client)?;

        info!(project = %project.name, "crawl triggered");
        if !cli.quiet {
            println!(
                "{} crawl triggered for {}",
                style("✓").green().bold(),
                project.name
            );
        }
        Ok(())
    }
}
