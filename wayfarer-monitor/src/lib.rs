//! Page-session CSP monitor
//!
//! Watches `securitypolicyviolation`, `error` and `unhandledrejection`
//! events for one page session, drops known noise, deduplicates by
//! signature, caps the number of reports and forwards the rest to the
//! ingest endpoints.
//!
//! ```no_run
//! use std::sync::Arc;
//! use wayfarer_monitor::*;
//!
//! # async fn run() -> Result<(), TransportError> {
//! let transport = Arc::new(HttpTransport::new("https://wayfarer.example")?);
//! let monitor = Arc::new(CspMonitor::new(MonitorConfig::default(), transport));
//! monitor.init(Some(Arc::new(StaticContext::new("Mozilla/5.0", "https://wayfarer.example/en"))));
//!
//! let event = ViolationEvent::new("script-src", "https://cdn.example/a.js");
//! monitor.spawn_dispatch(BrowserEvent::SecurityPolicyViolation(event));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod context;
pub mod event;
pub mod monitor;
pub mod transport;

pub use config::MonitorConfig;
pub use context::{BrowserContext, StaticContext};
pub use event::{BrowserEvent, RuntimeErrorEvent, ViolationEvent};
pub use monitor::{CspMonitor, MonitorOutcome, MonitorStats};
pub use transport::{DeliveryResult, HttpTransport, RecordingTransport, ReportTransport, TransportError};
