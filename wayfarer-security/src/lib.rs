//! Security headers for the Wayfarer site backend
//!
//! Builds the per-request `Content-Security-Policy` around a fresh nonce
//! and the fixed hardening headers that go with it.
//!
//! ```
//! use wayfarer_config::SiteConfig;
//! use wayfarer_security::{Nonce, SecurityHeaders};
//!
//! let headers = SecurityHeaders::for_site(&SiteConfig::default());
//! let nonce = Nonce::generate();
//! let set = headers.build(&nonce).unwrap();
//! assert!(set.get("Content-Security-Policy").is_some());
//! ```

pub mod content_security_policy;
pub mod error;
pub mod hardening;
pub mod nonce;

pub use content_security_policy::{CSP_HEADER, CSP_REPORT_ONLY_HEADER, CspConfig};
pub use error::{Result, SecurityError};
pub use hardening::{ContentTypeOptions, FrameGuard, HstsConfig, PermissionsPolicy, ReferrerPolicy};
pub use nonce::Nonce;

use wayfarer_config::{Environment, SiteConfig};
use wayfarer_core::HttpResponse;

/// Header carrying the nonce to the page renderer and back to the client
pub const NONCE_HEADER: &str = "x-nonce";

const HSTS_MAX_AGE: u64 = 31_536_000;

/// Ordered set of header name/value pairs for one response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspHeaderSet {
    headers: Vec<(String, String)>,
}

impl CspHeaderSet {
    fn push(&mut self, name: &str, value: impl Into<String>) {
        self.headers.push((name.to_string(), value.into()));
    }

    /// Case-insensitive lookup
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Copy every header onto the response, overwriting existing values
    pub fn apply(&self, response: &mut HttpResponse) {
        for (name, value) in &self.headers {
            response.headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
            response.headers.insert(name.clone(), value.clone());
        }
    }
}

/// Security header policy for one deployment
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    pub environment: Environment,
    pub report_only: bool,
    /// Extra `connect-src` origins
    pub connect_origins: Vec<String>,
    pub frame_guard: FrameGuard,
    pub content_type_options: ContentTypeOptions,
    pub referrer_policy: ReferrerPolicy,
    pub permissions_policy: PermissionsPolicy,
    /// Only sent in production
    pub hsts: HstsConfig,
}

impl SecurityHeaders {
    pub fn new(environment: Environment) -> Self {
        Self {
            environment,
            report_only: false,
            connect_origins: Vec::new(),
            frame_guard: FrameGuard::Deny,
            content_type_options: ContentTypeOptions::NoSniff,
            referrer_policy: ReferrerPolicy::StrictOriginWhenCrossOrigin,
            permissions_policy: PermissionsPolicy::default(),
            hsts: HstsConfig::new(HSTS_MAX_AGE),
        }
    }

    pub fn for_site(config: &SiteConfig) -> Self {
        Self::new(config.environment)
            .report_only(config.csp_report_only)
            .with_connect_origins(config.site_origin.iter().cloned())
    }

    pub fn report_only(mut self, enabled: bool) -> Self {
        self.report_only = enabled;
        self
    }

    pub fn with_connect_origins<I: IntoIterator<Item = String>>(mut self, origins: I) -> Self {
        self.connect_origins.extend(origins);
        self
    }

    /// The CSP for a response carrying `nonce`
    pub fn policy(&self, nonce: &Nonce) -> CspConfig {
        let policy = if self.environment.is_production() {
            CspConfig::strict(nonce, &self.connect_origins)
        } else {
            CspConfig::relaxed(nonce, &self.connect_origins)
        };
        policy.report_only(self.report_only)
    }

    /// Every header for one response, CSP first
    pub fn build(&self, nonce: &Nonce) -> Result<CspHeaderSet> {
        let policy = self.policy(nonce);
        policy.validate()?;

        let mut set = CspHeaderSet::default();
        set.push(policy.header_name(), policy.to_header_value());
        set.push("X-Frame-Options", self.frame_guard.to_header_value());
        set.push(
            "X-Content-Type-Options",
            self.content_type_options.to_header_value(),
        );
        set.push("Referrer-Policy", self.referrer_policy.to_header_value());
        set.push(
            "Permissions-Policy",
            self.permissions_policy.to_header_value(),
        );
        if self.environment.is_production() {
            set.push("Strict-Transport-Security", self.hsts.to_header_value());
        }
        set.push(NONCE_HEADER, nonce.as_str());
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nonce() -> Nonce {
        Nonce::parse("bm9uY2U=").unwrap()
    }

    #[test]
    fn test_production_headers() {
        let set = SecurityHeaders::new(Environment::Production)
            .build(&nonce())
            .unwrap();

        let csp = set.get(CSP_HEADER).unwrap();
        assert!(csp.contains("'nonce-bm9uY2U='"));
        assert!(!csp.contains("'unsafe-eval'"));
        assert_eq!(set.get("x-frame-options"), Some("DENY"));
        assert_eq!(set.get("X-Content-Type-Options"), Some("nosniff"));
        assert_eq!(
            set.get("Referrer-Policy"),
            Some("strict-origin-when-cross-origin")
        );
        assert_eq!(
            set.get("Strict-Transport-Security"),
            Some("max-age=31536000; includeSubDomains")
        );
        assert_eq!(set.get(NONCE_HEADER), Some("bm9uY2U="));
    }

    #[test]
    fn test_development_headers() {
        let set = SecurityHeaders::new(Environment::Development)
            .build(&nonce())
            .unwrap();

        assert!(set.get(CSP_HEADER).unwrap().contains("'unsafe-eval'"));
        assert!(set.get("Strict-Transport-Security").is_none());
    }

    #[test]
    fn test_report_only_header_name() {
        let set = SecurityHeaders::new(Environment::Production)
            .report_only(true)
            .build(&nonce())
            .unwrap();

        assert!(set.get(CSP_HEADER).is_none());
        assert!(set.get(CSP_REPORT_ONLY_HEADER).is_some());
    }

    #[test]
    fn test_site_origin_in_connect_src() {
        let config = SiteConfig {
            environment: Environment::Production,
            site_origin: Some("https://wayfarer.example".to_string()),
            ..SiteConfig::default()
        };
        let policy = SecurityHeaders::for_site(&config).policy(&nonce());
        assert_eq!(
            policy.get("connect-src").unwrap().last().map(String::as_str),
            Some("https://wayfarer.example")
        );
    }

    #[test]
    fn test_bad_origin_is_rejected() {
        let result = SecurityHeaders::new(Environment::Production)
            .with_connect_origins(["https://a.example; script-src *".to_string()])
            .build(&nonce());
        assert_eq!(
            result,
            Err(SecurityError::InvalidHeaderValue("connect-src".to_string()))
        );
    }

    #[test]
    fn test_apply_replaces_existing() {
        let mut response = HttpResponse::ok().with_header("x-frame-options", "SAMEORIGIN");
        let set = SecurityHeaders::new(Environment::Test).build(&nonce()).unwrap();
        set.apply(&mut response);

        assert_eq!(response.header("X-Frame-Options"), Some("DENY"));
        assert_eq!(
            response
                .headers
                .keys()
                .filter(|k| k.eq_ignore_ascii_case("x-frame-options"))
                .count(),
            1
        );
    }
}
