//! Locale routing plus security headers for page requests

use async_trait::async_trait;
use std::sync::Arc;
use wayfarer_config::SiteConfig;
use wayfarer_core::{Error, HttpRequest, HttpResponse, Middleware, Next};
use wayfarer_i18n::{LOCALE_HEADER, LocaleDecision, LocaleRouting, PrefixLocaleRouter};
use wayfarer_log::{debug, error, warn};
use wayfarer_security::{NONCE_HEADER, Nonce, SecurityHeaders};

/// Path prefixes served by the asset pipeline, never by pages
const ASSET_PREFIXES: [&str; 4] = ["/_next/", "/_static/", "/_assets/", "/_vercel/"];

const STATIC_EXTENSIONS: [&str; 19] = [
    "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "css", "js", "map", "txt", "xml",
    "woff", "woff2", "ttf", "eot", "pdf", "webmanifest",
];

/// Whether a path goes through locale routing and gets security headers.
///
/// API routes, asset paths and static files are skipped; `/` always
/// matches.
pub fn matches_page_route(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    if path == "/api" || path.starts_with("/api/") {
        return false;
    }
    if ASSET_PREFIXES.iter().any(|p| path.starts_with(p)) {
        return false;
    }

    let last = path.rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => !STATIC_EXTENSIONS
            .iter()
            .any(|s| s.eq_ignore_ascii_case(ext)),
        _ => true,
    }
}

/// Resolves the locale first, then layers CSP and hardening headers on
/// whatever the locale step produced.
///
/// A locale-routing failure passes the request through untouched. Handler
/// errors are rendered as JSON error responses before headers are applied.
/// A header-building failure is logged and the response goes out without
/// security headers.
pub struct LocaleSecurityMiddleware {
    locale: Arc<dyn LocaleRouting>,
    security: Option<SecurityHeaders>,
}

impl LocaleSecurityMiddleware {
    pub fn new(locale: Arc<dyn LocaleRouting>, security: Option<SecurityHeaders>) -> Self {
        Self { locale, security }
    }

    pub fn for_site(config: &SiteConfig) -> Result<Self, wayfarer_i18n::I18nError> {
        let router = PrefixLocaleRouter::from_tags(&config.locales, &config.default_locale)?;
        let security = config
            .security_headers
            .then(|| SecurityHeaders::for_site(config));
        Ok(Self::new(Arc::new(router), security))
    }

    async fn route_locale(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let decision = match self.locale.resolve(&req) {
            Ok(decision) => decision,
            Err(err) => {
                warn!(path = %req.path, error = %err, "Locale routing failed, passing request through");
                return next(req).await;
            }
        };

        match decision {
            LocaleDecision::Redirect { location, .. } => {
                Ok(HttpResponse::temporary_redirect(location))
            }
            LocaleDecision::Continue(locale) => {
                let tag = locale.tag();
                req.set_header(LOCALE_HEADER, tag.clone());
                let response = next(req).await?;
                Ok(response.with_header("Content-Language", tag))
            }
        }
    }
}

#[async_trait]
impl Middleware for LocaleSecurityMiddleware {
    async fn handle(&self, mut req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        if !matches_page_route(&req.path) {
            return next(req).await;
        }

        let Some(security) = &self.security else {
            return self.route_locale(req, next).await;
        };

        let nonce = Nonce::generate();
        req.set_header(NONCE_HEADER, nonce.as_str());

        // Error pages on page paths are hardened too
        let mut response = match self.route_locale(req, next).await {
            Ok(response) => response,
            Err(err) => err.to_response(),
        };

        match security.build(&nonce) {
            Ok(headers) => {
                headers.apply(&mut response);
                debug!(header_count = headers.len(), "Security headers attached");
            }
            Err(err) => error!(error = %err, "Failed to build security headers"),
        }
        Ok(response)
    }
}
