//! Browser events the monitor listens for

use wayfarer_report::ViolationReport;

/// Fields of a `securitypolicyviolation` event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViolationEvent {
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
    pub sample: String,
}

impl ViolationEvent {
    pub fn new(violated_directive: impl Into<String>, blocked_uri: impl Into<String>) -> Self {
        Self {
            violated_directive: violated_directive.into(),
            blocked_uri: blocked_uri.into(),
            ..Default::default()
        }
    }

    pub fn with_source(mut self, source_file: impl Into<String>, line: i64, column: i64) -> Self {
        self.source_file = source_file.into();
        self.line_number = line;
        self.column_number = column;
        self
    }

    /// Deduplication key: `{violatedDirective}:{blockedURI}:{sourceFile}`
    pub fn signature(&self) -> String {
        format!(
            "{}:{}:{}",
            self.violated_directive, self.blocked_uri, self.source_file
        )
    }

    /// Wire-format report for the ingest endpoint
    pub fn to_report(&self) -> ViolationReport {
        ViolationReport {
            document_uri: self.document_uri.clone(),
            referrer: self.referrer.clone(),
            violated_directive: self.violated_directive.clone(),
            effective_directive: self.effective_directive.clone(),
            original_policy: self.original_policy.clone(),
            disposition: self.disposition.clone(),
            blocked_uri: self.blocked_uri.clone(),
            source_file: self.source_file.clone(),
            line_number: self.line_number,
            column_number: self.column_number,
            status_code: self.status_code,
            script_sample: self.sample.clone(),
        }
    }
}

/// An uncaught error or the reason of an unhandled rejection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeErrorEvent {
    pub message: String,
    pub stack: Option<String>,
}

impl RuntimeErrorEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    SecurityPolicyViolation(ViolationEvent),
    Error(RuntimeErrorEvent),
    UnhandledRejection(RuntimeErrorEvent),
}

impl BrowserEvent {
    /// DOM event type name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SecurityPolicyViolation(_) => "securitypolicyviolation",
            Self::Error(_) => "error",
            Self::UnhandledRejection(_) => "unhandledrejection",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature() {
        let event = ViolationEvent::new("script-src", "https://cdn.example/a.js")
            .with_source("https://site.example/app.js", 3, 9);
        assert_eq!(
            event.signature(),
            "script-src:https://cdn.example/a.js:https://site.example/app.js"
        );
        assert_eq!(ViolationEvent::new("img-src", "data").signature(), "img-src:data:");
    }

    #[test]
    fn test_event_kind() {
        let violation = BrowserEvent::SecurityPolicyViolation(ViolationEvent::new("img-src", "data"));
        assert_eq!(violation.kind(), "securitypolicyviolation");
        let error = RuntimeErrorEvent::new("Refused to execute inline script");
        assert_eq!(BrowserEvent::Error(error.clone()).kind(), "error");
        assert_eq!(BrowserEvent::UnhandledRejection(error).kind(), "unhandledrejection");
    }

    #[test]
    fn test_to_report() {
        let event = ViolationEvent::new("script-src", "eval").with_source("app.js", 3, 9);
        let body = event.to_report().to_body();
        assert_eq!(body["csp-report"]["violated-directive"], "script-src");
        assert_eq!(body["csp-report"]["line-number"], 3);
        assert_eq!(body["csp-report"]["source-file"], "app.js");
    }
}
