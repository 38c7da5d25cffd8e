//! The Project model
//!
//! Construction is the validation pipeline: a `Project` either fully
//! validates (manifest entry, schedule, source URL, working copy,
//! settings file, packaging descriptor) or construction fails, and no
//! partially-valid instance is observable afterward.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{json, Value};
use tracing::{error, info};
use url::Url;

use spindle_core::cron::{validate_schedule, CronEntry, Crontab};
use spindle_core::error::{ProjectError, Result};
use spindle_core::{Context, Manifest};
use spindle_git::GitRepo;
use spindle_scrapyd::ScrapydClient;

/// Name of the deploy target every project is published under
pub const DEPLOY_TARGET: &str = "localScrapyd";

const SETTINGS_FILE: &str = "settings.py";
const PACKAGING_FILE: &str = "scrapy.cfg";
const DEPLOY_TOOL: &str = "scrapyd-deploy";

const LOG_FORMAT: &str = "%(asctime)s [%(name)s] %(levelname)s: %(message)s";
const LOG_DATEFORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Materialized, validated view of one manifest entry and its working copy
#[derive(Debug, Clone)]
pub struct Project {
    /// Manifest name, also the working-copy directory name
    pub name: String,

    /// Working-copy path under the spiders directory
    pub path: PathBuf,

    /// Schedule the crawl trigger is installed on
    pub cron: String,

    /// Source repository URL, when the project is version-controlled
    pub giturl: Option<String>,

    /// Manifest overrides merged with the injected export/log settings
    pub settings: BTreeMap<String, Value>,

    /// Extra fields forwarded on run submission
    pub args: BTreeMap<String, Value>,

    /// Located settings file inside the working copy
    pub settings_file: PathBuf,

    /// Located packaging descriptor inside the working copy
    pub scrapy_cfg: PathBuf,

    /// Project identifier declared by the packaging descriptor
    pub deploy_name: String,
}

impl Project {
    /// Build and validate a project from its manifest entry.
    ///
    /// Runs the full pipeline: entry lookup, schedule and source-URL
    /// validation, working-copy reconciliation (clone or fast-forward),
    /// settings patching, and packaging-name resolution.
    pub fn load(ctx: &Context, name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return fail(ProjectError::EmptyName);
        }
        if !ctx.spiders_path.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("spiders directory {} not found", ctx.spiders_path.display()),
            )
            .into());
        }
        if !ctx.manifest_path.is_file() {
            return fail(ProjectError::ManifestMissing(ctx.manifest_path.clone()));
        }

        let manifest = Manifest::load(&ctx.manifest_path)?;
        let entry = manifest
            .entry(name)
            .ok_or_else(|| {
                log_raise(ProjectError::Unknown {
                    name: name.to_string(),
                    manifest: ctx.manifest_path.clone(),
                })
            })?
            .clone();

        let cron = entry
            .cron
            .ok_or_else(|| log_raise(ProjectError::MissingCron(name.to_string())))?;
        if validate_schedule(&cron).is_err() {
            return fail(ProjectError::InvalidCron {
                project: name.to_string(),
                expr: cron,
            });
        }
        if let Some(url) = entry.giturl.as_deref() {
            validate_git_url(name, url)?;
        }

        let path = ctx.spiders_path.join(name);
        let export_dir = ctx.export_path.join(name);
        if !export_dir.is_dir() {
            std::fs::create_dir(&export_dir)?;
        }
        let mut settings = entry.custom_settings;
        settings.insert("EXPORT_PATH".to_string(), json!(export_dir.display().to_string()));
        settings.insert("LOG_LEVEL".to_string(), json!("INFO"));
        settings.insert("LOG_FORMAT".to_string(), json!(LOG_FORMAT));
        settings.insert("LOG_DATEFORMAT".to_string(), json!(LOG_DATEFORMAT));
        settings.insert(
            "LOG_FILE".to_string(),
            json!(ctx.logs_path.join(format!("{name}.log")).display().to_string()),
        );

        reconcile_working_copy(name, &path, ctx, entry.giturl.as_deref())?;

        let settings_file = crate::locate::find_file(&path, SETTINGS_FILE)?;
        crate::settings::strip_log_directives(&settings_file)?;
        let scrapy_cfg = crate::locate::find_file(&path, PACKAGING_FILE)?;
        let deploy_name = crate::scrapy_cfg::project_name(&scrapy_cfg)?;

        info!(project = name, deploy = %deploy_name, path = %path.display(), "project validated");
        Ok(Self {
            name: name.to_string(),
            path,
            cron,
            giturl: entry.giturl,
            settings,
            args: entry.custom_args,
            settings_file,
            scrapy_cfg,
            deploy_name,
        })
    }

    /// Make sure the packaging descriptor carries our deploy target
    pub fn ensure_deploy_target(&self, ctx: &Context) -> Result<()> {
        crate::scrapy_cfg::ensure_deploy_target(
            &self.scrapy_cfg,
            DEPLOY_TARGET,
            &ctx.scrapyd_url,
            &self.deploy_name,
            self.giturl.is_some(),
        )
    }

    /// Deploy the project to the daemon and install its crawl-trigger
    /// cron entry.
    pub fn register(&self, ctx: &Context) -> Result<()> {
        self.ensure_deploy_target(ctx)?;

        let tool = which::which(DEPLOY_TOOL)
            .map_err(|_| log_raise(ProjectError::DeployToolMissing(DEPLOY_TOOL.to_string())))?;
        info!(project = %self.name, target = DEPLOY_TARGET, "deploying");
        let output = Command::new(tool)
            .arg(DEPLOY_TARGET)
            .current_dir(&self.path)
            .output()?;
        if !output.status.success() {
            return fail(ProjectError::DeployFailed {
                project: self.name.clone(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let command = format!("{} crawl {} >/dev/null 2>&1", coordinator_exe(), self.name);
        let entry = CronEntry::new(&self.cron, &command)?;
        Crontab::add(&entry)?;
        info!(project = %self.name, schedule = %self.cron, "project registered");
        Ok(())
    }

    /// Submit one run request per task the daemon has registered for this
    /// project. Zero registered tasks is an error; the first submission
    /// that yields no run id aborts the call.
    pub fn crawl(&self, client: &ScrapydClient) -> Result<()> {
        let spiders = client.list_spiders(&self.deploy_name)?;
        if spiders.is_empty() {
            return fail(ProjectError::NoSpidersRegistered(self.name.clone()));
        }
        for spider in &spiders {
            let jobid = client.schedule(&self.deploy_name, spider, &self.settings, &self.args)?;
            info!(job = %jobid, project = %self.deploy_name, spider = %spider, "job started");
        }
        Ok(())
    }
}

/// Reconcile the working copy with the manifest's source URL.
///
/// An existing copy must point at exactly the recorded URL (protecting
/// against silently running code from the wrong repository) and is synced;
/// a missing copy is cloned. URL-less projects must already be on disk.
fn reconcile_working_copy(
    name: &str,
    path: &Path,
    ctx: &Context,
    giturl: Option<&str>,
) -> Result<()> {
    match giturl {
        Some(url) => {
            if path.is_dir() {
                let repo = GitRepo::open(path)?;
                let found = repo.origin_url()?;
                if found != url {
                    return fail(ProjectError::RemoteMismatch {
                        project: name.to_string(),
                        expected: url.to_string(),
                        found,
                    });
                }
                repo.sync()?;
            } else {
                GitRepo::clone(url, path)?;
            }
        }
        None => {
            if !path.is_dir() {
                return fail(ProjectError::WorkingCopyMissing {
                    project: name.to_string(),
                    path: ctx.spiders_path.join(name),
                });
            }
        }
    }
    Ok(())
}

/// A source URL must be an http(s) repository URL ending in `.git`
fn validate_git_url(project: &str, raw: &str) -> Result<()> {
    let invalid = || {
        log_raise(ProjectError::InvalidGitUrl {
            project: project.to_string(),
            url: raw.to_string(),
        })
    };
    let url = Url::parse(raw).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || !url.path().ends_with(".git") {
        return Err(invalid().into());
    }
    Ok(())
}

/// Command the installed cron entry re-invokes
fn coordinator_exe() -> String {
    std::env::current_exe()
        .ok()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "spindle".to_string())
}

/// Log a validation failure at the raise site so it stays visible even if
/// the caller swallows it
fn log_raise(err: ProjectError) -> ProjectError {
    error!(error = %err, "project validation failed");
    err
}

fn fail<T>(err: ProjectError) -> Result<T> {
    Err(log_raise(err).into())
}
