//! Content Security Policy (CSP) configuration
//!
//! Directives keep their insertion order so the rendered header is stable
//! from one response to the next.

use crate::nonce::Nonce;
use crate::{Result, SecurityError};

pub const CSP_HEADER: &str = "Content-Security-Policy";
pub const CSP_REPORT_ONLY_HEADER: &str = "Content-Security-Policy-Report-Only";

/// Endpoint browsers post violation reports to
pub const DEFAULT_REPORT_URI: &str = "/api/csp-report";

/// Third-party origin used by the contact form's email delivery
pub const EMAIL_API_ORIGIN: &str = "https://api.emailjs.com";

#[derive(Debug, Clone, Default)]
pub struct CspConfig {
    directives: Vec<(String, Vec<String>)>,
    report_only: bool,
}

impl CspConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a directive, replacing any previous value in place
    pub fn directive<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.directives.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = values,
            None => self.directives.push((name.to_string(), values)),
        }
        self
    }

    /// Add a valueless directive such as `upgrade-insecure-requests`
    pub fn flag(self, name: &str) -> Self {
        self.directive(name, Vec::<String>::new())
    }

    pub fn default_src<I: IntoIterator<Item = S>, S: Into<String>>(self, sources: I) -> Self {
        self.directive("default-src", sources)
    }

    pub fn script_src<I: IntoIterator<Item = S>, S: Into<String>>(self, sources: I) -> Self {
        self.directive("script-src", sources)
    }

    pub fn style_src<I: IntoIterator<Item = S>, S: Into<String>>(self, sources: I) -> Self {
        self.directive("style-src", sources)
    }

    pub fn img_src<I: IntoIterator<Item = S>, S: Into<String>>(self, sources: I) -> Self {
        self.directive("img-src", sources)
    }

    pub fn font_src<I: IntoIterator<Item = S>, S: Into<String>>(self, sources: I) -> Self {
        self.directive("font-src", sources)
    }

    pub fn connect_src<I: IntoIterator<Item = S>, S: Into<String>>(self, sources: I) -> Self {
        self.directive("connect-src", sources)
    }

    pub fn frame_src<I: IntoIterator<Item = S>, S: Into<String>>(self, sources: I) -> Self {
        self.directive("frame-src", sources)
    }

    pub fn object_src<I: IntoIterator<Item = S>, S: Into<String>>(self, sources: I) -> Self {
        self.directive("object-src", sources)
    }

    pub fn report_uri(self, uri: &str) -> Self {
        self.directive("report-uri", [uri])
    }

    pub fn report_only(mut self, enabled: bool) -> Self {
        self.report_only = enabled;
        self
    }

    pub fn is_report_only(&self) -> bool {
        self.report_only
    }

    /// Sources for a directive, if set
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.directives
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Header name matching the enforcement mode
    pub fn header_name(&self) -> &'static str {
        if self.report_only {
            CSP_REPORT_ONLY_HEADER
        } else {
            CSP_HEADER
        }
    }

    /// Check directive names and values before they go on the wire
    pub fn validate(&self) -> Result<()> {
        for (name, values) in &self.directives {
            let name_ok = !name.is_empty()
                && name.bytes().all(|b| b.is_ascii_lowercase() || b == b'-');
            if !name_ok {
                return Err(SecurityError::InvalidDirective(name.clone()));
            }
            if values
                .iter()
                .any(|v| v.contains(['\r', '\n', ';', ',']) || v.trim().is_empty())
            {
                return Err(SecurityError::InvalidHeaderValue(name.clone()));
            }
        }
        Ok(())
    }

    pub fn to_header_value(&self) -> String {
        self.directives
            .iter()
            .map(|(name, values)| {
                if values.is_empty() {
                    name.clone()
                } else {
                    format!("{} {}", name, values.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Production policy: nonce-gated scripts, no eval, HTTPS upgrade
    pub fn strict(nonce: &Nonce, extra_connect: &[String]) -> Self {
        let mut connect = vec!["'self'".to_string(), EMAIL_API_ORIGIN.to_string()];
        connect.extend(extra_connect.iter().cloned());

        Self::new()
            .default_src(["'self'"])
            .script_src(["'self'".to_string(), nonce.source(), "'strict-dynamic'".to_string()])
            .style_src(["'self'", "'unsafe-inline'"])
            .img_src(["'self'", "data:", "blob:", "https:"])
            .font_src(["'self'", "data:"])
            .connect_src(connect)
            .frame_src(["'none'"])
            .object_src(["'none'"])
            .directive("base-uri", ["'self'"])
            .directive("form-action", ["'self'"])
            .directive("frame-ancestors", ["'none'"])
            .flag("upgrade-insecure-requests")
            .report_uri(DEFAULT_REPORT_URI)
    }

    /// Development policy: the strict policy plus `'unsafe-eval'` for hot
    /// reload and websocket connections, served over plain HTTP
    pub fn relaxed(nonce: &Nonce, extra_connect: &[String]) -> Self {
        let mut connect = vec![
            "'self'".to_string(),
            EMAIL_API_ORIGIN.to_string(),
            "ws:".to_string(),
            "wss:".to_string(),
        ];
        connect.extend(extra_connect.iter().cloned());

        let mut policy = Self::strict(nonce, extra_connect)
            .script_src([
                "'self'".to_string(),
                nonce.source(),
                "'strict-dynamic'".to_string(),
                "'unsafe-eval'".to_string(),
            ])
            .connect_src(connect);
        policy.directives.retain(|(n, _)| n != "upgrade-insecure-requests");
        policy
    }
}
