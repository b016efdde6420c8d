//! Application assembly

use crate::error::AppError;
use crate::middleware::LocaleSecurityMiddleware;
use crate::pages::PageShell;
use std::sync::Arc;
use wayfarer_config::SiteConfig;
use wayfarer_core::{Application, RequestLoggingMiddleware, Router};
use wayfarer_monitor::MonitorConfig;
use wayfarer_report::ReportIngest;

/// Report endpoints plus the localized page shell
pub fn build_router(config: &SiteConfig) -> Router {
    let mut router = Router::new();
    Arc::new(ReportIngest::for_site(config)).register(&mut router);
    PageShell::new(config.locales.clone(), MonitorConfig::default()).register(&mut router);
    router
}

/// Router wrapped in request logging and the locale/security middleware
pub fn build_application(config: &SiteConfig) -> Result<Application, AppError> {
    let app = Application::new(build_router(config))
        .with_middleware(RequestLoggingMiddleware)
        .with_middleware(LocaleSecurityMiddleware::for_site(config)?);
    Ok(app)
}
