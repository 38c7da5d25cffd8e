//! Init command: validate, deploy, and schedule every manifest project

use std::time::Duration;

use clap::Args;
use console::style;
use tracing::{error, info, warn};

use spindle_core::cron::Crontab;
use spindle_core::{Context, Manifest};
use spindle_projects::Project;
use spindle_scrapyd::ScrapydClient;

use crate::cli::Cli;

/// Validate, deploy, and schedule every project in the manifest
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Seconds to wait for the daemon before giving up
    #[arg(long, default_value_t = 120)]
    pub startup_timeout: u64,
}

impl InitCommand {
    /// Execute the init command.
    ///
    /// Per-project failures are logged and skipped; the pass continues
    /// with the remaining entries and still exits 0.
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        let ctx = Context::from_env()?;
        let client = ScrapydClient::new(&ctx.scrapyd_url)?;
        client.wait_until_up(Duration::from_secs(self.startup_timeout))?;

        Crontab::wipe()?;
        let manifest = Manifest::load_or_init(&ctx.manifest_path)?;
        if manifest.spiders.is_empty() {
            warn!(manifest = %ctx.manifest_path.display(), "no spider configured");
        }

        let mut projects = Vec::new();
        for name in manifest.spiders.keys() {
            match Project::load(&ctx, name) {
                Ok(project) => projects.push(project),
                Err(err) => {
                    error!(project = %name, error = %err, "cannot fetch project data, skipping");
                    if !cli.quiet {
                        println!("  {} {}: {}", style("✗").red(), name, err);
                    }
                }
            }
        }
        info!(count = projects.len(), "projects found");

        let mut registered = 0;
        for project in &projects {
            info!(project = %project.name, "registering");
            match project.register(&ctx) {
                Ok(()) => {
                    registered += 1;
                    if !cli.quiet {
                        println!(
                            "  {} {} ({})",
                            style("✓").green(),
                            project.name,
                            project.cron
                        );
                    }
                }
                Err(err) => {
                    error!(project = %project.name, error = %err, "cannot register project, skipping");
                    if !cli.quiet {
                        println!("  {} {}: {}", style("✗").red(), project.name, err);
                    }
                }
            }
        }

        let table = Crontab::read()?;
        table.log_entries();
        if !cli.quiet {
            println!();
            println!("{}", style("Cron table").bold());
            for line in table.lines() {
                println!("  {line}");
            }
            println!();
            println!(
                "{} {}/{} project(s) registered",
                style("✓").green().bold(),
                registered,
                manifest.spiders.len()
            );
        }
        info!("init finished");
        Ok(())
    }
}
