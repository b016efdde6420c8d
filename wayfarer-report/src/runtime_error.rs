//! JavaScript runtime errors forwarded by the browser monitor

use crate::classify::ErrorCategory;
use crate::error::ReportError;
use crate::sanitize::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeErrorReport {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    /// Client clock, ISO 8601
    pub timestamp: String,
    pub user_agent: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<Value>,
}

impl RuntimeErrorReport {
    /// Validate and extract an error body. `message`, `timestamp`,
    /// `userAgent` and `url` must be strings.
    pub fn from_json(body: &Value) -> Result<Self, ReportError> {
        let obj = body
            .as_object()
            .ok_or_else(|| ReportError::malformed("body is not an object"))?;

        let required = |key: &str| match obj.get(key) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ReportError::malformed(format!("missing string field {key}"))),
        };

        let stack = match obj.get("stack") {
            Some(Value::String(s)) => Some(s.clone()),
            _ => None,
        };
        let additional_info = obj.get("additionalInfo").filter(|v| !v.is_null()).cloned();

        Ok(Self {
            message: required("message")?,
            stack,
            timestamp: required("timestamp")?,
            user_agent: required("userAgent")?,
            url: required("url")?,
            additional_info,
        })
    }
}

/// Capped error record plus server-side classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedRuntimeError {
    /// Server receipt time
    pub timestamp: DateTime<Utc>,
    pub reported_at: String,
    pub message: String,
    pub stack: Option<String>,
    pub user_agent: String,
    pub url: String,
    /// `additionalInfo` serialized to JSON, then capped
    pub additional_info: Option<String>,
    pub ip: String,
    pub category: ErrorCategory,
}

impl SanitizedRuntimeError {
    pub fn new(report: &RuntimeErrorReport, ip: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            reported_at: truncate(&report.timestamp, REPORTED_AT_MAX),
            // Same text the relatedness check saw, not the capped copy
            category: ErrorCategory::categorize(&report.message),
            message: truncate(&report.message, MESSAGE_MAX),
            stack: report.stack.as_deref().map(|s| truncate(s, STACK_MAX)),
            user_agent: truncate(&report.user_agent, USER_AGENT_MAX),
            url: truncate(&report.url, URL_MAX),
            additional_info: report
                .additional_info
                .as_ref()
                .map(|info| truncate(&info.to_string(), ADDITIONAL_INFO_MAX)),
            ip: truncate(ip, IP_MAX),
        }
    }
}
