//! CSP violation and runtime-error reporting
//!
//! Two ingest endpoints receive reports from browsers:
//!
//! - `POST /api/csp-report`: browser-native violation reports
//! - `POST /api/csp-error`: JavaScript errors the page monitor flags as
//!   CSP-related
//!
//! Each report is validated, filtered for noise, capped field by field,
//! logged once and appended to a [`ReportStore`]. Both paths also answer
//! `GET` with a static health payload.
//!
//! ```
//! use std::sync::Arc;
//! use wayfarer_core::Router;
//! use wayfarer_report::{MemoryStore, ReportIngest};
//!
//! let ingest = Arc::new(ReportIngest::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(MemoryStore::new()),
//! ));
//! let mut router = Router::new();
//! ingest.register(&mut router);
//! assert_eq!(router.routes.len(), 4);
//! ```

pub mod classify;
pub mod error;
pub mod ingest;
pub mod runtime_error;
pub mod sanitize;
pub mod store;
pub mod violation;

pub use classify::{ErrorCategory, NoiseFilter, Severity, is_csp_related, mentions_csp};
pub use error::{ReportError, StoreError};
pub use ingest::{ERROR_ENDPOINT, ErrorOutcome, ReportIngest, VIOLATION_ENDPOINT, ViolationOutcome};
pub use runtime_error::{RuntimeErrorReport, SanitizedRuntimeError};
pub use store::{ERRORS_FILE, JsonlFileStore, MemoryStore, NullStore, ReportStore, VIOLATIONS_FILE};
pub use violation::{SanitizedViolation, ViolationReport};
