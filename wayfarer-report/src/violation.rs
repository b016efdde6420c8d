//! Browser-native CSP violation reports

use crate::classify::Severity;
use crate::error::ReportError;
use crate::sanitize::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Key wrapping the violation in a report body
pub const REPORT_KEY: &str = "csp-report";

/// One violation as browsers send it, inside `{"csp-report": {...}}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ViolationReport {
    pub document_uri: String,
    pub referrer: String,
    pub violated_directive: String,
    pub effective_directive: String,
    pub original_policy: String,
    pub disposition: String,
    pub blocked_uri: String,
    pub source_file: String,
    pub line_number: i64,
    pub column_number: i64,
    pub status_code: i64,
    pub script_sample: String,
}

impl ViolationReport {
    /// Validate and extract a report body.
    ///
    /// The body must be an object holding a `csp-report` object with a
    /// non-empty string `violated-directive`. Other string fields default
    /// to empty and numeric fields are coerced.
    pub fn from_json(body: &Value) -> Result<Self, ReportError> {
        let report = body
            .get(REPORT_KEY)
            .and_then(Value::as_object)
            .ok_or_else(|| ReportError::malformed("missing csp-report object"))?;

        let directive = match report.get("violated-directive") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => return Err(ReportError::malformed("missing violated-directive")),
        };

        let field = |key: &str| text(report.get(key));
        let number = |key: &str| coerce_number(report.get(key));

        Ok(Self {
            document_uri: field("document-uri"),
            referrer: field("referrer"),
            violated_directive: directive,
            effective_directive: field("effective-directive"),
            original_policy: field("original-policy"),
            disposition: field("disposition"),
            blocked_uri: field("blocked-uri"),
            source_file: field("source-file"),
            line_number: number("line-number"),
            column_number: number("column-number"),
            status_code: number("status-code"),
            script_sample: field("script-sample"),
        })
    }

    /// Wire body, as posted to the ingest endpoint
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert(REPORT_KEY.to_string(), json!(self));
        Value::Object(body)
    }
}

/// Capped, flattened violation plus request metadata. This is the shape
/// that gets logged and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedViolation {
    pub timestamp: DateTime<Utc>,
    pub document_uri: String,
    pub referrer: String,
    pub violated_directive: String,
    pub effective_directive: String,
    pub original_policy: String,
    pub disposition: String,
    pub blocked_uri: String,
    pub source_file: String,
    pub line_number: i64,
    pub column_number: i64,
    pub status_code: i64,
    pub script_sample: String,
    pub user_agent: String,
    pub ip: String,
    pub severity: Severity,
}

impl SanitizedViolation {
    pub fn new(report: &ViolationReport, user_agent: &str, ip: &str) -> Self {
        let violated_directive = truncate(&report.violated_directive, DIRECTIVE_MAX);
        let blocked_uri = truncate(&report.blocked_uri, URI_MAX);
        let severity = Severity::for_ingest(&violated_directive, &blocked_uri);

        Self {
            timestamp: Utc::now(),
            document_uri: truncate(&report.document_uri, URI_MAX),
            referrer: truncate(&report.referrer, URI_MAX),
            violated_directive,
            effective_directive: truncate(&report.effective_directive, EFFECTIVE_DIRECTIVE_MAX),
            original_policy: truncate(&report.original_policy, POLICY_MAX),
            disposition: truncate(&report.disposition, DISPOSITION_MAX),
            blocked_uri,
            source_file: truncate(&report.source_file, URI_MAX),
            line_number: report.line_number,
            column_number: report.column_number,
            status_code: report.status_code,
            script_sample: truncate(&report.script_sample, SAMPLE_MAX),
            user_agent: truncate(user_agent, USER_AGENT_MAX),
            ip: truncate(ip, IP_MAX),
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_coerces_numbers() {
        let body = json!({"csp-report": {
            "violated-directive": "script-src",
            "blocked-uri": "https://evil.example/x.js",
            "line-number": "12",
            "column-number": 3,
            "status-code": "n/a"
        }});
        let report = ViolationReport::from_json(&body).unwrap();
        assert_eq!(report.line_number, 12);
        assert_eq!(report.column_number, 3);
        assert_eq!(report.status_code, 0);
        assert_eq!(report.document_uri, "");
    }

    #[test]
    fn test_from_json_rejects_bad_shapes() {
        let bad = [
            json!(null),
            json!([]),
            json!({"violated-directive": "script-src"}),
            json!({"csp-report": "script-src"}),
            json!({"csp-report": {}}),
            json!({"csp-report": {"violated-directive": ""}}),
            json!({"csp-report": {"violated-directive": 7}}),
        ];
        for body in bad {
            assert!(
                matches!(ViolationReport::from_json(&body), Err(ReportError::Malformed(_))),
                "{body} should be malformed"
            );
        }
    }

    #[test]
    fn test_wire_body_parses_back() {
        let report = ViolationReport {
            violated_directive: "img-src".to_string(),
            blocked_uri: "https://img.example/a.png".to_string(),
            line_number: 4,
            ..Default::default()
        };
        let body = report.to_body();
        assert_eq!(body["csp-report"]["violated-directive"], "img-src");
        assert_eq!(ViolationReport::from_json(&body).unwrap(), report);
    }

    #[test]
    fn test_sanitize_caps_every_string() {
        let long = "x".repeat(5000);
        let report = ViolationReport {
            document_uri: long.clone(),
            referrer: long.clone(),
            violated_directive: long.clone(),
            effective_directive: long.clone(),
            original_policy: long.clone(),
            disposition: long.clone(),
            blocked_uri: long.clone(),
            source_file: long.clone(),
            script_sample: long.clone(),
            ..Default::default()
        };
        let sanitized = SanitizedViolation::new(&report, &long, &long);

        assert_eq!(sanitized.document_uri.len(), URI_MAX);
        assert_eq!(sanitized.referrer.len(), URI_MAX);
        assert_eq!(sanitized.violated_directive.len(), DIRECTIVE_MAX);
        assert_eq!(sanitized.effective_directive.len(), EFFECTIVE_DIRECTIVE_MAX);
        assert_eq!(sanitized.original_policy.len(), POLICY_MAX);
        assert_eq!(sanitized.disposition.len(), DISPOSITION_MAX);
        assert_eq!(sanitized.blocked_uri.len(), URI_MAX);
        assert_eq!(sanitized.source_file.len(), URI_MAX);
        assert_eq!(sanitized.script_sample.len(), SAMPLE_MAX);
        assert_eq!(sanitized.user_agent.len(), USER_AGENT_MAX);
        assert_eq!(sanitized.ip.len(), IP_MAX);
    }

    #[test]
    fn test_sanitized_record_keys() {
        let report = ViolationReport {
            violated_directive: "script-src".to_string(),
            line_number: 12,
            ..Default::default()
        };
        let record = serde_json::to_value(SanitizedViolation::new(&report, "ua", "1.2.3.4")).unwrap();
        assert_eq!(record["violatedDirective"], "script-src");
        assert_eq!(record["lineNumber"], 12);
        assert_eq!(record["severity"], "warning");
        assert!(record["timestamp"].is_string());
    }
}
