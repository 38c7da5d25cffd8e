//! Exit codes for the CLI

use spindle_core::error::{CronError, GitError, ScrapydError};
use spindle_core::SpindleError;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Git error
pub const GIT_ERROR: i32 = 3;

/// Daemon API error
pub const SCRAPYD_ERROR: i32 = 4;

/// Project validation or registration error
pub const PROJECT_ERROR: i32 = 5;

/// Crontab error
pub const CRON_ERROR: i32 = 6;

/// Map a surfaced error to the process exit code.
///
/// Concern-typed errors that were not folded into [`SpindleError`] before
/// crossing the CLI boundary still map to their own code.
pub fn for_error(err: &anyhow::Error) -> i32 {
    if let Some(spindle) = err.downcast_ref::<SpindleError>() {
        return match spindle {
            SpindleError::Config(_) => CONFIG_ERROR,
            SpindleError::Git(_) => GIT_ERROR,
            SpindleError::Scrapyd(_) => SCRAPYD_ERROR,
            SpindleError::Project(_) => PROJECT_ERROR,
            SpindleError::Cron(_) => CRON_ERROR,
            SpindleError::Io(_) | SpindleError::Json(_) => ERROR,
        };
    }
    if err.downcast_ref::<GitError>().is_some() {
        return GIT_ERROR;
    }
    if err.downcast_ref::<ScrapydError>().is_some() {
        return SCRAPYD_ERROR;
    }
    if err.downcast_ref::<CronError>().is_some() {
        return CRON_ERROR;
    }
    ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use spindle_core::error::{ConfigError, ProjectError};

    #[test]
    fn test_error_kinds_map_to_codes() {
        let config: anyhow::Error =
            SpindleError::from(ConfigError::MissingVar("SPIDERS_PATH".into())).into();
        assert_eq!(for_error(&config), CONFIG_ERROR);

        let project: anyhow::Error = SpindleError::from(ProjectError::EmptyName).into();
        assert_eq!(for_error(&project), PROJECT_ERROR);

        let other = anyhow::anyhow!("anything else");
        assert_eq!(for_error(&other), ERROR);
    }

    #[test]
    fn test_unfolded_concern_errors_still_map() {
        let scrapyd: anyhow::Error = ScrapydError::Unreachable {
            url: "http://localhost:6800/".into(),
        }
        .into();
        assert_eq!(for_error(&scrapyd), SCRAPYD_ERROR);
    }
}
