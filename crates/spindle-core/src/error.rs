//! Error types for Spindle

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using SpindleError
pub type Result<T> = std::result::Result<T, SpindleError>;

/// Main error type for Spindle operations
#[derive(Debug, Error)]
pub enum SpindleError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Git-related errors
    #[error(transparent)]
    Git(#[from] GitError),

    /// Crontab-related errors
    #[error(transparent)]
    Cron(#[from] CronError),

    /// Daemon API errors
    #[error(transparent)]
    Scrapyd(#[from] ScrapydError),

    /// Project validation and registration errors
    #[error(transparent)]
    Project(#[from] ProjectError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable is not set
    #[error("required environment variable {0} is not set")]
    MissingVar(String),

    /// A configured path does not exist as a directory
    #[error("{var} does not point to a directory: {path}")]
    NotADirectory { var: String, path: PathBuf },

    /// The acting user does not match the real process user
    #[error("this coordinator must run as {expected}, not {actual}")]
    UserMismatch { expected: String, actual: String },

    /// The real process user cannot be determined
    #[error("cannot determine the current user")]
    UnknownUser,

    /// Failed to create the initial manifest document
    #[error("cannot create manifest {path}: {message}")]
    ManifestInit { path: PathBuf, message: String },
}

/// Git-related errors
#[derive(Debug, Error)]
pub enum GitError {
    /// Repository not found
    #[error("git repository not found at {0}")]
    RepositoryNotFound(PathBuf),

    /// Failed to open repository
    #[error("failed to open repository at {path}: {message}")]
    OpenFailed { path: PathBuf, message: String },

    /// Failed to clone
    #[error("failed to clone {url}: {message}")]
    CloneFailed { url: String, message: String },

    /// Remote not found
    #[error("remote {name} not found in {path}")]
    RemoteNotFound { name: String, path: PathBuf },

    /// Remote exists but records no URL
    #[error("remote {name} in {path} has no URL")]
    MissingRemoteUrl { name: String, path: PathBuf },

    /// Upstream diverged; a fast-forward sync is not possible
    #[error("working copy at {0} cannot be fast-forwarded to upstream")]
    NonFastForward(PathBuf),

    /// Sync failed for another reason
    #[error("failed to sync working copy at {path}: {message}")]
    SyncFailed { path: PathBuf, message: String },

    /// Git2 library error
    #[error("git error: {0}")]
    Git2(#[from] git2::Error),
}

/// Crontab-related errors
#[derive(Debug, Error)]
pub enum CronError {
    /// The schedule expression is not a valid cron expression
    #[error("invalid cron schedule: {0}")]
    InvalidSchedule(String),

    /// The entry has no command to run
    #[error("cron entry with schedule {schedule} has an empty command")]
    EmptyCommand { schedule: String },

    /// The crontab could not be rewritten with the new entry
    #[error("cannot add {command} to crontab: {message}")]
    WriteFailed { command: String, message: String },

    /// The crontab command itself failed
    #[error("crontab {action} failed: {message}")]
    CommandFailed { action: String, message: String },
}

/// Daemon API errors
#[derive(Debug, Error)]
pub enum ScrapydError {
    /// The configured endpoint is not a valid URL
    #[error("invalid daemon endpoint {url}: {message}")]
    InvalidEndpoint { url: String, message: String },

    /// The daemon did not answer the reachability probe
    #[error("daemon at {url} is unreachable")]
    Unreachable { url: String },

    /// The daemon never came up within the startup wait budget
    #[error("daemon at {url} still unreachable after {waited_secs}s")]
    StartupTimedOut { url: String, waited_secs: u64 },

    /// HTTP transport failure
    #[error("daemon {operation} request failed: {message}")]
    Http { operation: String, message: String },

    /// The daemon answered with a non-ok status
    #[error("daemon {operation} returned an error: {message}")]
    Api { operation: String, message: String },

    /// The daemon accepted a run request but returned no run id
    #[error("no job id returned for project {project}, spider {spider}")]
    MissingJobId { project: String, spider: String },
}

/// Project validation and registration errors
#[derive(Debug, Error)]
pub enum ProjectError {
    /// No project name was supplied
    #[error("project name is empty")]
    EmptyName,

    /// The manifest document does not exist
    #[error("manifest {0} not found")]
    ManifestMissing(PathBuf),

    /// The manifest has no entry under this name
    #[error("project {name} not found in {manifest}")]
    Unknown { name: String, manifest: PathBuf },

    /// The recorded source URL is not an http(s) repository URL
    #[error("invalid git repo url for project {project}: {url}")]
    InvalidGitUrl { project: String, url: String },

    /// The manifest entry has no cron schedule
    #[error("project {0} has no cron schedule")]
    MissingCron(String),

    /// The manifest entry's cron schedule is malformed
    #[error("invalid cron schedule for project {project}: {expr}")]
    InvalidCron { project: String, expr: String },

    /// The on-disk origin URL differs from the manifest URL
    #[error("project {project}: manifest url {expected} but working copy has {found}")]
    RemoteMismatch {
        project: String,
        expected: String,
        found: String,
    },

    /// No source URL and no working copy on disk
    #[error("project {project}: working copy {path} not found")]
    WorkingCopyMissing { project: String, path: PathBuf },

    /// A required file is missing from the working copy
    #[error("file {filename} not found under {root}")]
    FileNotFound { filename: String, root: PathBuf },

    /// The packaging descriptor declares no project name
    #[error("cannot find project name in {0}")]
    PackagingNameMissing(PathBuf),

    /// The external deploy tool is not installed
    #[error("deploy tool {0} not found on PATH")]
    DeployToolMissing(String),

    /// The external deploy command exited non-zero
    #[error("deploy failed for project {project} (exit {code:?}): {stderr}")]
    DeployFailed {
        project: String,
        code: Option<i32>,
        stderr: String,
    },

    /// The daemon has no runnable tasks for this project
    #[error("no spider registered in the daemon for project {0}")]
    NoSpidersRegistered(String),
}
