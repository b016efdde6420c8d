//! Wayfarer Tours site backend
//!
//! Wires the member crates into one application:
//!
//! - `/api/csp-report` and `/api/csp-error` ingest endpoints
//! - locale-prefixed page routes behind [`LocaleSecurityMiddleware`]
//! - request logging around everything
//!
//! ```no_run
//! use wayfarer::build_application;
//! use wayfarer::config::SiteConfig;
//!
//! # async fn run() -> Result<(), wayfarer::AppError> {
//! let config = SiteConfig::default();
//! let app = build_application(&config)?;
//! app.listen(config.bind_address().parse()?).await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod error;
pub mod middleware;
pub mod pages;

pub use app::{build_application, build_router};
pub use error::AppError;
pub use middleware::{LocaleSecurityMiddleware, matches_page_route};

pub use wayfarer_config as config;
pub use wayfarer_core as core;
pub use wayfarer_i18n as i18n;
pub use wayfarer_log as log;
pub use wayfarer_monitor as monitor;
pub use wayfarer_report as report;
pub use wayfarer_security as security;

/// Common imports
pub mod prelude {
    pub use crate::{AppError, LocaleSecurityMiddleware, build_application, build_router};
    pub use wayfarer_config::{Environment, SiteConfig, SiteConfigBuilder};
    pub use wayfarer_core::{Application, Error, HttpRequest, HttpResponse, Router};
    pub use wayfarer_log::LogConfig;
}
