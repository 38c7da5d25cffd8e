//! Crontab housekeeping
//!
//! The coordinator owns the acting user's whole crontab: a full
//! initialization pass wipes it and rebuilds one entry per registered
//! project. Reads and writes go through the `crontab` CLI; entry parsing,
//! rendering, and schedule validation are pure so they stay testable
//! without touching the system table.

use std::io::Write;
use std::process::{Command, Stdio};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::CronError;

/// Result type for crontab operations
pub type Result<T> = std::result::Result<T, CronError>;

const CRONTAB: &str = "crontab";

/// One scheduled entry, keyed by the command line it runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronEntry {
    /// Five-field schedule or an `@keyword`
    pub schedule: String,
    /// Command line, run verbatim by cron
    pub command: String,
}

impl CronEntry {
    /// Build a validated entry
    pub fn new(schedule: &str, command: &str) -> Result<Self> {
        validate_schedule(schedule)?;
        if command.trim().is_empty() {
            return Err(CronError::EmptyCommand {
                schedule: schedule.to_string(),
            });
        }
        Ok(Self {
            schedule: schedule.trim().to_string(),
            command: command.trim().to_string(),
        })
    }

    /// Render the crontab line for this entry
    pub fn render(&self) -> String {
        format!("{} {}", self.schedule, self.command)
    }

    /// Parse a crontab line back into an entry.
    ///
    /// Returns `None` for blank lines and for lines that are not job
    /// entries (environment assignments, free-form comments).
    pub fn parse(line: &str) -> Option<Self> {
        let text = line.trim().trim_start_matches('#').trim_start();
        if text.is_empty() {
            return None;
        }
        let fields: Vec<&str> = text.split_whitespace().collect();
        let (schedule, command) = if text.starts_with('@') {
            if fields.len() < 2 {
                return None;
            }
            (fields[0].to_string(), fields[1..].join(" "))
        } else {
            if fields.len() < 6 {
                return None;
            }
            (fields[..5].join(" "), fields[5..].join(" "))
        };
        Some(Self { schedule, command })
    }
}

/// Validate a cron schedule expression.
///
/// Accepts the `@keyword` shorthands and five whitespace-separated fields:
/// digits, `*`, `,`, `-`, `/` everywhere, with month and weekday names
/// allowed in the last two fields.
pub fn validate_schedule(expr: &str) -> Result<()> {
    static NUMERIC: OnceLock<Regex> = OnceLock::new();
    static NAMED: OnceLock<Regex> = OnceLock::new();
    let numeric = NUMERIC.get_or_init(|| Regex::new(r"^[0-9*,/-]+$").unwrap());
    let named = NAMED.get_or_init(|| Regex::new(r"^[0-9A-Za-z*,/-]+$").unwrap());

    let expr = expr.trim();
    const KEYWORDS: [&str; 8] = [
        "@reboot", "@yearly", "@annually", "@monthly", "@weekly", "@daily", "@midnight", "@hourly",
    ];
    if KEYWORDS.contains(&expr) {
        return Ok(());
    }

    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(CronError::InvalidSchedule(expr.to_string()));
    }
    let ok = fields[..3].iter().all(|f| numeric.is_match(f))
        && fields[3..].iter().all(|f| named.is_match(f));
    if !ok {
        return Err(CronError::InvalidSchedule(expr.to_string()));
    }
    Ok(())
}

/// The acting user's crontab, read as raw lines
#[derive(Debug, Clone, Default)]
pub struct Crontab {
    lines: Vec<String>,
}

impl Crontab {
    /// Read the current crontab. A user without one yields an empty table.
    pub fn read() -> Result<Self> {
        let output = Command::new(CRONTAB)
            .arg("-l")
            .output()
            .map_err(|e| CronError::CommandFailed {
                action: "read".to_string(),
                message: e.to_string(),
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("no crontab") {
                debug!("no crontab installed yet");
                return Ok(Self::default());
            }
            return Err(CronError::CommandFailed {
                action: "read".to_string(),
                message: stderr.trim().to_string(),
            });
        }
        let lines = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect();
        Ok(Self { lines })
    }

    /// Wipe the crontab unconditionally
    pub fn wipe() -> Result<()> {
        info!("wiping crontab");
        install("")
    }

    /// Append a validated entry and rewrite the whole table
    pub fn add(entry: &CronEntry) -> Result<()> {
        let mut table = Self::read()?;
        table.lines.push(entry.render());
        let mut content = table.lines.join("\n");
        content.push('\n');
        install(&content).map_err(|e| CronError::WriteFailed {
            command: entry.command.clone(),
            message: e.to_string(),
        })?;
        info!(schedule = %entry.schedule, command = %entry.command, "cron entry added");
        Ok(())
    }

    /// Raw crontab lines
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Log every entry with its enabled/valid flags
    pub fn log_entries(&self) {
        info!("cron jobs:");
        for line in &self.lines {
            if line.trim().is_empty() {
                continue;
            }
            let enabled = !line.trim_start().starts_with('#');
            let valid = CronEntry::parse(line)
                .map(|e| validate_schedule(&e.schedule).is_ok())
                .unwrap_or(false);
            info!(enabled, valid, entry = %line, "cron job");
        }
    }
}

/// Replace the installed crontab with the given content
fn install(content: &str) -> Result<()> {
    let mut child = Command::new(CRONTAB)
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| CronError::CommandFailed {
            action: "install".to_string(),
            message: e.to_string(),
        })?;
    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(content.as_bytes())
            .map_err(|e| CronError::CommandFailed {
                action: "install".to_string(),
                message: e.to_string(),
            })?;
    }
    let output = child.wait_with_output().map_err(|e| CronError::CommandFailed {
        action: "install".to_string(),
        message: e.to_string(),
    })?;
    if !output.status.success() {
        warn!(status = ?output.status.code(), "crontab install failed");
        return Err(CronError::CommandFailed {
            action: "install".to_string(),
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}
