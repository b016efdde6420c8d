//! Per-page-session CSP monitor
//!
//! One [`CspMonitor`] exists per page session. It owns the signature set and
//! report counter that keep a noisy page from flooding the ingest endpoint.

use crate::config::MonitorConfig;
use crate::context::BrowserContext;
use crate::event::{BrowserEvent, RuntimeErrorEvent, ViolationEvent};
use crate::transport::ReportTransport;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use wayfarer_log::{debug, info, trace, warn};
use wayfarer_report::{NoiseFilter, RuntimeErrorReport, Severity, mentions_csp};

const BLOCKED_CONTENT_NOTICE: &str =
    "Some content on this page was blocked by the site's security policy.";

/// What the monitor did with one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorOutcome {
    /// Delivered to the ingest endpoint
    Sent,
    /// Claimed and counted, but delivery failed
    DeliveryFailed,
    /// Signature already reported this session
    Duplicate,
    /// Session report cap reached
    LimitReached,
    /// Matched the noise heuristic
    Filtered,
    /// Runtime error without CSP keywords
    NotCspRelated,
    /// Monitor not initialized, or no listener for this event
    Inactive,
}

impl MonitorOutcome {
    /// Whether a network call was made
    pub fn attempted_delivery(&self) -> bool {
        matches!(self, Self::Sent | Self::DeliveryFailed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStats {
    pub reports_sent: usize,
    pub unique_violations: usize,
    pub max_reports: usize,
}

#[derive(Default)]
struct Listeners {
    violation: bool,
    error: bool,
    rejection: bool,
}

#[derive(Default)]
struct SessionState {
    signatures: HashSet<String>,
    reports_sent: usize,
}

pub struct CspMonitor {
    config: MonitorConfig,
    transport: Arc<dyn ReportTransport>,
    context: Mutex<Option<Arc<dyn BrowserContext>>>,
    listeners: Mutex<Listeners>,
    session: Mutex<SessionState>,
}

impl CspMonitor {
    pub fn new(config: MonitorConfig, transport: Arc<dyn ReportTransport>) -> Self {
        Self {
            config,
            transport,
            context: Mutex::new(None),
            listeners: Mutex::new(Listeners::default()),
            session: Mutex::new(SessionState::default()),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Attach to a page. Without a page (`None`) this does nothing.
    /// Calling it again after a successful attach is a no-op.
    ///
    /// Returns whether the monitor is active afterwards.
    pub fn init(&self, context: Option<Arc<dyn BrowserContext>>) -> bool {
        let Some(context) = context else {
            debug!("No browser context, CSP monitor stays inactive");
            return self.is_active();
        };

        let mut current = self.context.lock();
        if current.is_some() {
            return true;
        }
        *current = Some(context);

        let mut listeners = self.listeners.lock();
        listeners.violation = true;
        listeners.error = true;
        listeners.rejection = true;

        info!(
            max_reports = self.config.max_reports_per_session,
            "CSP monitor initialized"
        );
        true
    }

    pub fn is_active(&self) -> bool {
        self.context.lock().is_some()
    }

    fn context(&self) -> Option<Arc<dyn BrowserContext>> {
        self.context.lock().clone()
    }

    /// Route an event to its handler if that listener is registered
    pub async fn dispatch(&self, event: BrowserEvent) -> MonitorOutcome {
        let registered = {
            let listeners = self.listeners.lock();
            match &event {
                BrowserEvent::SecurityPolicyViolation(_) => listeners.violation,
                BrowserEvent::Error(_) => listeners.error,
                BrowserEvent::UnhandledRejection(_) => listeners.rejection,
            }
        };
        let kind = event.kind();
        if !registered {
            trace!(event = kind, "No listener registered");
            return MonitorOutcome::Inactive;
        }

        let outcome = match event {
            BrowserEvent::SecurityPolicyViolation(violation) => {
                self.handle_violation(&violation).await
            }
            BrowserEvent::Error(error) | BrowserEvent::UnhandledRejection(error) => {
                self.handle_runtime_error(&error).await
            }
        };
        trace!(
            event = kind,
            outcome = ?outcome,
            delivered = outcome.attempted_delivery(),
            "Browser event handled"
        );
        outcome
    }

    /// Run [`dispatch`](Self::dispatch) on the runtime without waiting
    pub fn spawn_dispatch(self: &Arc<Self>, event: BrowserEvent) -> JoinHandle<MonitorOutcome> {
        let monitor = self.clone();
        tokio::spawn(async move { monitor.dispatch(event).await })
    }

    pub async fn handle_violation(&self, event: &ViolationEvent) -> MonitorOutcome {
        let Some(context) = self.context() else {
            return MonitorOutcome::Inactive;
        };
        let signature = event.signature();

        // Claim the signature and a slot before the network call, so
        // concurrent duplicates never both go out.
        {
            let mut session = self.session.lock();
            if session.signatures.contains(&signature) {
                return MonitorOutcome::Duplicate;
            }
            if session.reports_sent >= self.config.max_reports_per_session {
                return MonitorOutcome::LimitReached;
            }
            if self.config.filter_known_issues
                && NoiseFilter::MONITOR.is_noise(
                    &event.violated_directive,
                    &event.blocked_uri,
                    &event.source_file,
                )
            {
                return MonitorOutcome::Filtered;
            }
            session.signatures.insert(signature);
            session.reports_sent += 1;
        }

        let severity = Severity::for_monitor(&event.violated_directive, &event.blocked_uri);
        if self.config.log_to_console {
            warn!(
                severity = %severity,
                violated_directive = %event.violated_directive,
                blocked_uri = %event.blocked_uri,
                source_file = %event.source_file,
                line_number = event.line_number,
                "CSP violation detected"
            );
        }

        let mut report = event.to_report();
        if report.document_uri.is_empty() {
            report.document_uri = context.current_url();
        }
        let delivered = self
            .deliver(&self.config.violation_endpoint, &report.to_body())
            .await;

        if self.config.show_user_notices && severity == Severity::Error {
            context.notify_user(BLOCKED_CONTENT_NOTICE);
        }

        delivered
    }

    pub async fn handle_runtime_error(&self, event: &RuntimeErrorEvent) -> MonitorOutcome {
        let Some(context) = self.context() else {
            return MonitorOutcome::Inactive;
        };
        if !mentions_csp(&event.message) {
            return MonitorOutcome::NotCspRelated;
        }

        if self.config.log_to_console {
            warn!(message = %event.message, "CSP-related runtime error");
        }

        let report = RuntimeErrorReport {
            message: event.message.clone(),
            stack: event.stack.clone(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            user_agent: context.user_agent(),
            url: context.current_url(),
            additional_info: None,
        };
        let body = json!(report);
        self.deliver(&self.config.error_endpoint, &body).await
    }

    async fn deliver(&self, endpoint: &str, body: &serde_json::Value) -> MonitorOutcome {
        match self.transport.send(endpoint, body).await {
            Ok(()) => MonitorOutcome::Sent,
            Err(err) => {
                warn!(endpoint = endpoint, error = %err, "Failed to deliver CSP report");
                MonitorOutcome::DeliveryFailed
            }
        }
    }

    pub fn stats(&self) -> MonitorStats {
        let session = self.session.lock();
        MonitorStats {
            reports_sent: session.reports_sent,
            unique_violations: session.signatures.len(),
            max_reports: self.config.max_reports_per_session,
        }
    }

    /// Forget every signature and zero the counter
    pub fn reset(&self) {
        let mut session = self.session.lock();
        session.signatures.clear();
        session.reports_sent = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StaticContext;
    use crate::transport::RecordingTransport;

    fn monitor(config: MonitorConfig) -> (CspMonitor, Arc<RecordingTransport>, Arc<StaticContext>) {
        let transport = Arc::new(RecordingTransport::new());
        let context = Arc::new(StaticContext::new("Mozilla/5.0", "https://site.example/en"));
        let monitor = CspMonitor::new(config, transport.clone());
        assert!(monitor.init(Some(context.clone())));
        (monitor, transport, context)
    }

    #[tokio::test]
    async fn test_inactive_without_context() {
        let transport = Arc::new(RecordingTransport::new());
        let monitor = CspMonitor::new(MonitorConfig::default(), transport.clone());

        assert!(!monitor.init(None));
        let event = BrowserEvent::SecurityPolicyViolation(ViolationEvent::new("script-src", "eval"));
        assert_eq!(monitor.dispatch(event).await, MonitorOutcome::Inactive);
        assert_eq!(transport.count(), 0);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let (monitor, _, _) = monitor(MonitorConfig::default());
        let other = Arc::new(StaticContext::new("other", "https://other.example"));
        assert!(monitor.init(Some(other)));
        assert_eq!(monitor.context().unwrap().user_agent(), "Mozilla/5.0");
    }

    #[tokio::test]
    async fn test_duplicate_signature_sends_once() {
        let (monitor, transport, _) = monitor(MonitorConfig::default());
        let event = ViolationEvent::new("script-src", "https://cdn.example/a.js");

        assert_eq!(monitor.handle_violation(&event).await, MonitorOutcome::Sent);
        assert_eq!(monitor.handle_violation(&event).await, MonitorOutcome::Duplicate);
        assert_eq!(transport.count(), 1);
        assert_eq!(monitor.stats().unique_violations, 1);
    }

    #[tokio::test]
    async fn test_cap_until_reset() {
        let (monitor, transport, _) = monitor(MonitorConfig::default().max_reports_per_session(3));

        for i in 0..3 {
            let event = ViolationEvent::new("img-src", format!("https://img.example/{i}.png"));
            assert_eq!(monitor.handle_violation(&event).await, MonitorOutcome::Sent);
        }
        let next = ViolationEvent::new("img-src", "https://img.example/late.png");
        assert_eq!(monitor.handle_violation(&next).await, MonitorOutcome::LimitReached);
        assert_eq!(transport.count(), 3);

        monitor.reset();
        assert_eq!(monitor.stats().reports_sent, 0);
        assert_eq!(monitor.handle_violation(&next).await, MonitorOutcome::Sent);
        assert_eq!(transport.count(), 4);
    }

    #[tokio::test]
    async fn test_noise_filter_can_be_disabled() {
        let event = ViolationEvent::new("style-src", "inline").with_source("devtools://devtools/x.js", 1, 1);

        let (filtered, transport, _) = monitor(MonitorConfig::default());
        assert_eq!(filtered.handle_violation(&event).await, MonitorOutcome::Filtered);
        assert_eq!(transport.count(), 0);
        assert_eq!(filtered.stats().reports_sent, 0);

        let (unfiltered, transport, _) = monitor(MonitorConfig::default().filter_known_issues(false));
        assert_eq!(unfiltered.handle_violation(&event).await, MonitorOutcome::Sent);
        assert_eq!(transport.count(), 1);
    }

    #[tokio::test]
    async fn test_failed_delivery_still_counts() {
        let (monitor, transport, _) = monitor(MonitorConfig::default());
        transport.set_failing(true);

        let event = ViolationEvent::new("connect-src", "https://api.example");
        let first = monitor.handle_violation(&event).await;
        assert_eq!(first, MonitorOutcome::DeliveryFailed);
        assert!(first.attempted_delivery());

        let second = monitor.handle_violation(&event).await;
        assert_eq!(second, MonitorOutcome::Duplicate);
        assert!(!second.attempted_delivery());
        assert_eq!(monitor.stats().reports_sent, 1);
    }

    #[test]
    fn test_attempted_delivery() {
        assert!(MonitorOutcome::Sent.attempted_delivery());
        assert!(MonitorOutcome::DeliveryFailed.attempted_delivery());
        for outcome in [
            MonitorOutcome::Duplicate,
            MonitorOutcome::LimitReached,
            MonitorOutcome::Filtered,
            MonitorOutcome::NotCspRelated,
            MonitorOutcome::Inactive,
        ] {
            assert!(!outcome.attempted_delivery(), "{outcome:?}");
        }
    }

    #[tokio::test]
    async fn test_notices_only_for_errors_when_enabled() {
        let (monitor, _, context) = monitor(MonitorConfig::default().show_user_notices(true));

        monitor.handle_violation(&ViolationEvent::new("img-src", "https://a.example/x.png")).await;
        assert!(context.notices().is_empty());

        monitor.handle_violation(&ViolationEvent::new("script-src", "eval")).await;
        assert_eq!(context.notices(), vec![BLOCKED_CONTENT_NOTICE.to_string()]);
    }

    #[tokio::test]
    async fn test_violation_body_fills_document_uri() {
        let (monitor, transport, _) = monitor(MonitorConfig::default());
        monitor.handle_violation(&ViolationEvent::new("frame-src", "https://video.example")).await;

        let (endpoint, body) = &transport.sent()[0];
        assert_eq!(endpoint, "/api/csp-report");
        assert_eq!(body["csp-report"]["document-uri"], "https://site.example/en");
        assert_eq!(body["csp-report"]["blocked-uri"], "https://video.example");
    }

    #[tokio::test]
    async fn test_runtime_errors() {
        let (monitor, transport, _) = monitor(MonitorConfig::default());

        let unrelated = RuntimeErrorEvent::new("Unexpected token } in JSON");
        assert_eq!(monitor.handle_runtime_error(&unrelated).await, MonitorOutcome::NotCspRelated);

        let blocked = RuntimeErrorEvent::new("Refused to load the script because it violates the CSP")
            .with_stack("at app.js:1:1");
        let outcome = monitor.dispatch(BrowserEvent::UnhandledRejection(blocked)).await;
        assert_eq!(outcome, MonitorOutcome::Sent);

        let (endpoint, body) = &transport.sent()[0];
        assert_eq!(endpoint, "/api/csp-error");
        assert_eq!(body["userAgent"], "Mozilla/5.0");
        assert_eq!(body["url"], "https://site.example/en");
        assert_eq!(body["stack"], "at app.js:1:1");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
        // runtime errors do not use the violation budget
        assert_eq!(monitor.stats().reports_sent, 0);
    }

    #[tokio::test]
    async fn test_concurrent_duplicates_send_once() {
        let (monitor, transport, _) = monitor(MonitorConfig::default());
        let monitor = Arc::new(monitor);
        let event = BrowserEvent::SecurityPolicyViolation(ViolationEvent::new("script-src", "https://x.example/a.js"));

        let handles: Vec<_> = (0..16).map(|_| monitor.spawn_dispatch(event.clone())).collect();
        let mut sent = 0;
        for handle in handles {
            if handle.await.unwrap() == MonitorOutcome::Sent {
                sent += 1;
            }
        }
        assert_eq!(sent, 1);
        assert_eq!(transport.count(), 1);
    }
}
