//! Monitor configuration

use serde::{Deserialize, Serialize};

pub const DEFAULT_VIOLATION_ENDPOINT: &str = "/api/csp-report";
pub const DEFAULT_ERROR_ENDPOINT: &str = "/api/csp-error";
pub const DEFAULT_MAX_REPORTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    pub violation_endpoint: String,
    pub error_endpoint: String,
    /// Violation reports sent before the session goes quiet
    pub max_reports_per_session: usize,
    /// Log every forwarded violation locally
    pub log_to_console: bool,
    /// Drop extension, tracker and devtools noise before sending
    pub filter_known_issues: bool,
    /// Tell the visitor when a high-severity violation blocks content
    pub show_user_notices: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            violation_endpoint: DEFAULT_VIOLATION_ENDPOINT.to_string(),
            error_endpoint: DEFAULT_ERROR_ENDPOINT.to_string(),
            max_reports_per_session: DEFAULT_MAX_REPORTS,
            log_to_console: true,
            filter_known_issues: true,
            show_user_notices: false,
        }
    }
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_reports_per_session(mut self, max: usize) -> Self {
        self.max_reports_per_session = max;
        self
    }

    pub fn log_to_console(mut self, enabled: bool) -> Self {
        self.log_to_console = enabled;
        self
    }

    pub fn filter_known_issues(mut self, enabled: bool) -> Self {
        self.filter_known_issues = enabled;
        self
    }

    pub fn show_user_notices(mut self, enabled: bool) -> Self {
        self.show_user_notices = enabled;
        self
    }

    pub fn endpoints(mut self, violation: impl Into<String>, error: impl Into<String>) -> Self {
        self.violation_endpoint = violation.into();
        self.error_endpoint = error.into();
        self
    }
}
