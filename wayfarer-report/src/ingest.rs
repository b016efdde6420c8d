//! Violation and runtime-error ingest endpoints
//!
//! Both endpoints follow the same pass: parse, validate, filter, sanitize,
//! log, persist. Persistence failures are logged and never change the
//! response.

use crate::classify::{NoiseFilter, Severity, is_csp_related};
use crate::error::ReportError;
use crate::runtime_error::{RuntimeErrorReport, SanitizedRuntimeError};
use crate::sanitize::{client_ip, user_agent};
use crate::store::{JsonlFileStore, NullStore, ReportStore};
use crate::violation::{SanitizedViolation, ViolationReport};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use wayfarer_config::SiteConfig;
use wayfarer_core::{Error, HttpRequest, HttpResponse, Router};
use wayfarer_log::{debug, error, info, warn};

pub const VIOLATION_ENDPOINT: &str = "/api/csp-report";
pub const ERROR_ENDPOINT: &str = "/api/csp-error";

const INVALID_VIOLATION: &str = "Invalid CSP report format";
const INVALID_ERROR: &str = "Invalid error report format";
const INTERNAL_ERROR: &str = "Internal server error";

#[derive(Debug, Clone, PartialEq)]
pub enum ViolationOutcome {
    Received(SanitizedViolation),
    /// Matched the noise heuristic; not logged or stored
    Ignored,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorOutcome {
    Received(SanitizedRuntimeError),
    /// No CSP keyword in the message; not logged or stored
    NotCspRelated,
}

/// Shared state of the two endpoints
#[derive(Clone)]
pub struct ReportIngest {
    violations: Arc<dyn ReportStore>,
    errors: Arc<dyn ReportStore>,
}

impl ReportIngest {
    pub fn new(violations: Arc<dyn ReportStore>, errors: Arc<dyn ReportStore>) -> Self {
        Self { violations, errors }
    }

    /// JSONL files under the report directory in development-like
    /// environments, nothing in production
    pub fn for_site(config: &SiteConfig) -> Self {
        if config.environment.is_development() {
            Self::new(
                Arc::new(JsonlFileStore::violations(&config.report_dir)),
                Arc::new(JsonlFileStore::errors(&config.report_dir)),
            )
        } else {
            Self::new(Arc::new(NullStore), Arc::new(NullStore))
        }
    }

    pub async fn ingest_violation(&self, request: &HttpRequest) -> Result<ViolationOutcome, ReportError> {
        let body = parse_body(request)?;
        let report = ViolationReport::from_json(&body).inspect_err(|err| {
            debug!(error = %err, "Rejected malformed CSP report");
        })?;

        if NoiseFilter::INGEST.is_noise(
            &report.violated_directive,
            &report.blocked_uri,
            &report.source_file,
        ) {
            debug!(
                violated_directive = %report.violated_directive,
                blocked_uri = %report.blocked_uri,
                "Ignoring CSP report from extension or tracker"
            );
            return Ok(ViolationOutcome::Ignored);
        }

        let record = SanitizedViolation::new(&report, &user_agent(request), &client_ip(request));
        log_violation(&record);
        persist(self.violations.as_ref(), &record, "violation").await?;

        Ok(ViolationOutcome::Received(record))
    }

    pub async fn ingest_error(&self, request: &HttpRequest) -> Result<ErrorOutcome, ReportError> {
        let body = parse_body(request)?;
        let report = RuntimeErrorReport::from_json(&body).inspect_err(|err| {
            debug!(error = %err, "Rejected malformed error report");
        })?;

        if !is_csp_related(&report.message) {
            debug!("Ignoring runtime error without CSP keywords");
            return Ok(ErrorOutcome::NotCspRelated);
        }

        let record = SanitizedRuntimeError::new(&report, &client_ip(request));
        warn!(
            category = %record.category,
            message = %record.message,
            stack = record.stack.as_deref().unwrap_or_default(),
            url = %record.url,
            user_agent = %record.user_agent,
            reported_at = %record.reported_at,
            additional_info = record.additional_info.as_deref().unwrap_or_default(),
            ip = %record.ip,
            "CSP runtime error reported"
        );
        persist(self.errors.as_ref(), &record, "error").await?;

        Ok(ErrorOutcome::Received(record))
    }

    /// Mount both endpoints (POST ingest, GET health) on `router`
    pub fn register(self: &Arc<Self>, router: &mut Router) {
        let ingest = self.clone();
        router.post(VIOLATION_ENDPOINT, move |req| violation_report(ingest.clone(), req));
        router.get(VIOLATION_ENDPOINT, |_req| async { Ok::<_, Error>(violation_health()) });

        let ingest = self.clone();
        router.post(ERROR_ENDPOINT, move |req| error_report(ingest.clone(), req));
        router.get(ERROR_ENDPOINT, |_req| async { Ok::<_, Error>(error_health()) });
    }
}

fn parse_body(request: &HttpRequest) -> Result<Value, ReportError> {
    serde_json::from_slice(&request.body).map_err(|e| ReportError::InvalidJson(e.to_string()))
}

macro_rules! violation_event {
    ($level:ident, $v:ident) => {
        $level!(
            severity = %$v.severity,
            violated_directive = %$v.violated_directive,
            effective_directive = %$v.effective_directive,
            blocked_uri = %$v.blocked_uri,
            document_uri = %$v.document_uri,
            referrer = %$v.referrer,
            source_file = %$v.source_file,
            line_number = $v.line_number,
            column_number = $v.column_number,
            status_code = $v.status_code,
            disposition = %$v.disposition,
            script_sample = %$v.script_sample,
            original_policy = %$v.original_policy,
            user_agent = %$v.user_agent,
            ip = %$v.ip,
            "CSP violation reported"
        )
    };
}

fn log_violation(record: &SanitizedViolation) {
    match record.severity {
        Severity::Error => violation_event!(error, record),
        Severity::Warning => violation_event!(warn, record),
        Severity::Info => violation_event!(info, record),
    }
}

async fn persist<T: Serialize>(store: &dyn ReportStore, record: &T, kind: &str) -> Result<(), ReportError> {
    let value = serde_json::to_value(record).map_err(|e| ReportError::Internal(e.to_string()))?;
    if let Err(err) = store.append(&value).await {
        warn!(kind = kind, error = %err, "Failed to persist CSP report");
    }
    Ok(())
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn failure_response(err: &ReportError, malformed: &str) -> HttpResponse {
    if err.is_client_error() {
        HttpResponse::json_value(400, json!({ "error": malformed }))
    } else {
        error!(error = %err, "Failed to process CSP report");
        HttpResponse::json_value(500, json!({ "error": INTERNAL_ERROR }))
    }
}

/// `POST /api/csp-report`
pub async fn violation_report(ingest: Arc<ReportIngest>, request: HttpRequest) -> Result<HttpResponse, Error> {
    let response = match ingest.ingest_violation(&request).await {
        Ok(ViolationOutcome::Received(_)) => HttpResponse::json_value(200, json!({ "status": "received" })),
        Ok(ViolationOutcome::Ignored) => HttpResponse::json_value(200, json!({ "status": "ignored" })),
        Err(err) => failure_response(&err, INVALID_VIOLATION),
    };
    Ok(response)
}

/// `POST /api/csp-error`
pub async fn error_report(ingest: Arc<ReportIngest>, request: HttpRequest) -> Result<HttpResponse, Error> {
    let response = match ingest.ingest_error(&request).await {
        Ok(ErrorOutcome::Received(record)) => HttpResponse::json_value(
            200,
            json!({ "status": "received", "category": record.category }),
        ),
        Ok(ErrorOutcome::NotCspRelated) => {
            HttpResponse::json_value(200, json!({ "status": "not-csp-related" }))
        }
        Err(err) => failure_response(&err, INVALID_ERROR),
    };
    Ok(response)
}

/// `GET /api/csp-report`
pub fn violation_health() -> HttpResponse {
    HttpResponse::json_value(
        200,
        json!({
            "endpoint": "CSP Violation Reporter",
            "status": "active",
            "timestamp": timestamp(),
        }),
    )
}

/// `GET /api/csp-error`
pub fn error_health() -> HttpResponse {
    HttpResponse::json_value(
        200,
        json!({
            "endpoint": "CSP Error Reporter",
            "status": "active",
            "timestamp": timestamp(),
            "accepts": ["csp-runtime-errors"],
        }),
    )
}
