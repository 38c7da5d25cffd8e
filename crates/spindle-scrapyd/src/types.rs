//! Daemon API response types

use serde::Deserialize;

/// Daemon status value for a successful call
pub const STATUS_OK: &str = "ok";

/// Response of `listspiders.json`
#[derive(Debug, Deserialize)]
pub struct ListSpidersResponse {
    pub status: String,
    #[serde(default)]
    pub spiders: Vec<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Response of `schedule.json`
#[derive(Debug, Deserialize)]
pub struct ScheduleResponse {
    pub status: String,
    #[serde(default)]
    pub jobid: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_spiders_response() {
        let body = r#"{"status": "ok", "spiders": ["news", "blog"], "node_name": "crawlhost"}"#;
        let parsed: ListSpidersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, STATUS_OK);
        assert_eq!(parsed.spiders, vec!["news", "blog"]);
        assert!(parsed.message.is_none());
    }

    #[test]
    fn test_error_response_carries_message() {
        let body = r#"{"status": "error", "message": "project not found"}"#;
        let parsed: ListSpidersResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.status, "error");
        assert!(parsed.spiders.is_empty());
        assert_eq!(parsed.message.as_deref(), Some("project not found"));
    }

    #[test]
    fn test_schedule_response_without_jobid() {
        let body = r#"{"status": "ok"}"#;
        let parsed: ScheduleResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.jobid.is_none());
    }
}
