pub mod domain {
    use serde::{Deserialize, Serialize};
    use std::fmt;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum Action {
        Accept,
        Reject,
        #[serde(other)]
        Other,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "UPPERCASE")]
    pub enum LogStatus {
        Ok,
        Nodata,
        #[serde(other)]
        Other,
    }

    /// Per-file result of an upload, or `Removed` for a retraction entry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum OutcomeStatus {
        Success,
        Error,
        Removed,
    }

    impl fmt::Display for Action {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.pad(match self {
                Action::Accept => "ACCEPT",
                Action::Reject => "REJECT",
                Action::Other => "?",
            })
        }
    }

    impl fmt::Display for LogStatus {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.pad(match self {
                LogStatus::Ok => "OK",
                LogStatus::Nodata => "NODATA",
                LogStatus::Other => "?",
            })
        }
    }
}

pub mod dto {
    use chrono::{DateTime, FixedOffset};
    use serde::{Deserialize, Serialize};

    use super::domain::{Action, LogStatus, OutcomeStatus};

    /// One network event as stored and returned by the backend. Read-only.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct EventRecord {
        pub id: i64,
        pub src_addr: String,
        pub dst_addr: String,
        pub account_id: String,
        pub action: Action,
        pub log_status: LogStatus,
        pub file_name: String,
        /// Epoch seconds.
        pub start_time: i64,
        pub end_time: i64,
        pub src_port: u32,
        pub dst_port: u32,
        pub protocol: u32,
        pub packets: u64,
        pub bytes_transferred: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub serial_no: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub version: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub instance_id: Option<String>,
    }

    /// Response of `POST /events/search/`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct SearchResultPage {
        pub results: Vec<EventRecord>,
        /// Seconds spent by the backend on the query.
        pub search_time: f64,
        pub total_count: u64,
        pub page: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub page_size: Option<u32>,
        pub total_pages: u32,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct UploadOutcome {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub id: Option<i64>,
        pub name: String,
        pub status: OutcomeStatus,
        #[serde(default)]
        pub events_processed: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub error: Option<String>,
    }

    impl UploadOutcome {
        pub fn success(name: impl Into<String>, events_processed: i64) -> Self {
            Self {
                id: None,
                name: name.into(),
                status: OutcomeStatus::Success,
                events_processed,
                error: None,
            }
        }

        pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
            Self {
                id: None,
                name: name.into(),
                status: OutcomeStatus::Error,
                events_processed: 0,
                error: Some(message.into()),
            }
        }

        pub fn is_success(&self) -> bool {
            self.status == OutcomeStatus::Success
        }
    }

    /// Response of `GET /events/stats/`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    pub struct ServerStats {
        pub total_events: u64,
        pub total_files: u64,
        pub processed_files: u64,
    }

    /// Element of `GET /files/`.
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct EventFile {
        pub id: i64,
        pub name: String,
        pub uploaded_at: DateTime<FixedOffset>,
        pub processed: bool,
        pub total_events: i64,
    }
}

#[cfg(test)]
mod tests {
    use super::domain::{Action, LogStatus, OutcomeStatus};
    use super::dto::{EventFile, SearchResultPage, UploadOutcome};

    #[test]
    fn search_page_decodes_backend_payload() {
        let body = r#"{
            "results": [{
                "id": 1, "file_name": "events_2024_08_29.log", "serial_no": 2,
                "version": 2, "account_id": "348935949", "instance_id": "eni-1",
                "src_addr": "159.62.125.136", "dst_addr": "30.55.177.194",
                "src_port": 152, "dst_port": 23475, "protocol": 8,
                "packets": 1250, "bytes_transferred": 2048576,
                "start_time": 1725850449, "end_time": 1725855086,
                "action": "ACCEPT", "log_status": "NODATA"
            }],
            "search_time": 0.15, "total_count": 1, "page": 1,
            "page_size": 100, "total_pages": 1
        }"#;

        let page: SearchResultPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 1);
        let record = &page.results[0];
        assert_eq!(record.action, Action::Accept);
        assert_eq!(record.log_status, LogStatus::Nodata);
        assert_eq!(record.instance_id.as_deref(), Some("eni-1"));
        assert_eq!(page.page_size, Some(100));
    }

    #[test]
    fn unknown_action_does_not_fail_the_page() {
        let body = r#"{"id": 7, "file_name": "f.log", "account_id": "1",
            "src_addr": "10.0.0.1", "dst_addr": "10.0.0.2", "src_port": 1,
            "dst_port": 2, "protocol": 6, "packets": 1, "bytes_transferred": 1,
            "start_time": 0, "end_time": 0, "action": "DROP", "log_status": "SKIPDATA"}"#;
        let record: super::dto::EventRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.action, Action::Other);
        assert_eq!(record.log_status, LogStatus::Other);
    }

    #[test]
    fn error_outcome_without_event_count_defaults_to_zero() {
        let body = r#"[
            {"id": 3, "name": "a.log", "status": "success", "events_processed": 50},
            {"name": "b.log", "status": "error", "error": "bad line 4"}
        ]"#;
        let outcomes: Vec<UploadOutcome> = serde_json::from_str(body).unwrap();
        assert_eq!(outcomes[0].status, OutcomeStatus::Success);
        assert_eq!(outcomes[1].events_processed, 0);
        assert_eq!(outcomes[1].error.as_deref(), Some("bad line 4"));
    }

    #[test]
    fn event_file_accepts_utc_timestamps() {
        let body = r#"{"id": 1, "name": "a.log", "uploaded_at": "2024-08-29T10:15:00.123456Z",
            "processed": true, "total_events": 12}"#;
        let file: EventFile = serde_json::from_str(body).unwrap();
        assert!(file.processed);
        assert_eq!(file.uploaded_at.timestamp(), 1724926500);
    }
}
