//! Blocking daemon client

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use spindle_core::error::ScrapydError;

use crate::types::{ListSpidersResponse, ScheduleResponse, STATUS_OK};

/// Result type for daemon calls
pub type Result<T> = std::result::Result<T, ScrapydError>;

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Initial interval of the startup poll
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Cap for the doubling startup-poll interval
const POLL_INTERVAL_CAP: Duration = Duration::from_secs(30);

/// Client for the crawl-execution daemon's HTTP API
pub struct ScrapydClient {
    base: Url,
    http: Client,
}

impl ScrapydClient {
    /// Build a client for the given endpoint URL
    pub fn new(endpoint: &str) -> Result<Self> {
        let base = Url::parse(endpoint).map_err(|e| ScrapydError::InvalidEndpoint {
            url: endpoint.to_string(),
            message: e.to_string(),
        })?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ScrapydError::Http {
                operation: "client".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { base, http })
    }

    /// The endpoint this client talks to
    pub fn endpoint(&self) -> &str {
        self.base.as_str()
    }

    /// Probe the daemon root. Transport errors count as "not reachable".
    pub fn is_up(&self) -> bool {
        match self.http.get(self.base.clone()).send() {
            Ok(response) => response.status() == StatusCode::OK,
            Err(_) => false,
        }
    }

    /// Poll the daemon until it answers, with a bounded overall budget.
    ///
    /// The interval starts at two seconds and doubles per miss up to a cap;
    /// exceeding `timeout` surfaces [`ScrapydError::StartupTimedOut`].
    pub fn wait_until_up(&self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let mut interval = POLL_INTERVAL;
        loop {
            if self.is_up() {
                debug!(url = %self.base, "daemon is up");
                return Ok(());
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(ScrapydError::StartupTimedOut {
                    url: self.base.to_string(),
                    waited_secs: elapsed.as_secs(),
                });
            }
            warn!(url = %self.base, "waiting for daemon...");
            std::thread::sleep(interval.min(timeout.saturating_sub(elapsed)));
            interval = (interval * 2).min(POLL_INTERVAL_CAP);
        }
    }

    /// List the runnable tasks the daemon has registered for a project
    pub fn list_spiders(&self, project: &str) -> Result<Vec<String>> {
        let mut url = self.join("listspiders.json")?;
        url.query_pairs_mut().append_pair("project", project);

        let body: ListSpidersResponse = self
            .http
            .get(url)
            .send()
            .and_then(|r| r.json())
            .map_err(|e| http_error("listspiders", &e))?;
        if body.status != STATUS_OK {
            return Err(api_error("listspiders", body.message));
        }
        debug!(project, count = body.spiders.len(), "listed spiders");
        Ok(body.spiders)
    }

    /// Submit one run request; returns the daemon's run identifier.
    ///
    /// Settings are passed as repeated `setting=KEY=VALUE` form pairs; extra
    /// args become form fields of their own. A response without a non-empty
    /// job id is a submission failure.
    pub fn schedule(
        &self,
        project: &str,
        spider: &str,
        settings: &BTreeMap<String, Value>,
        args: &BTreeMap<String, Value>,
    ) -> Result<String> {
        let url = self.join("schedule.json")?;

        let mut form: Vec<(String, String)> = vec![
            ("project".to_string(), project.to_string()),
            ("spider".to_string(), spider.to_string()),
        ];
        for (key, value) in settings {
            form.push(("setting".to_string(), format!("{}={}", key, value_text(value))));
        }
        for (key, value) in args {
            form.push((key.clone(), value_text(value)));
        }

        let body: ScheduleResponse = self
            .http
            .post(url)
            .form(&form)
            .send()
            .and_then(|r| r.json())
            .map_err(|e| http_error("schedule", &e))?;
        if body.status != STATUS_OK {
            return Err(api_error("schedule", body.message));
        }
        match body.jobid {
            Some(jobid) if !jobid.is_empty() => {
                info!(job = %jobid, project, spider, "job scheduled");
                Ok(jobid)
            }
            _ => Err(ScrapydError::MissingJobId {
                project: project.to_string(),
                spider: spider.to_string(),
            }),
        }
    }

    fn join(&self, endpoint: &str) -> Result<Url> {
        self.base.join(endpoint).map_err(|e| ScrapydError::InvalidEndpoint {
            url: self.base.to_string(),
            message: e.to_string(),
        })
    }
}

/// Render a JSON settings value the way the daemon expects it on the wire
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn http_error(operation: &str, err: &reqwest::Error) -> ScrapydError {
    ScrapydError::Http {
        operation: operation.to_string(),
        message: err.to_string(),
    }
}

fn api_error(operation: &str, message: Option<String>) -> ScrapydError {
    ScrapydError::Api {
        operation: operation.to_string(),
        message: message.unwrap_or_else(|| "unknown error".to_string()),
    }
}
