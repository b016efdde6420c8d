//! Noise filtering, severity and error categorization
//!
//! All pure functions of the report text. The browser-side monitor and the
//! ingest endpoints share the noise heuristic but differ on a few details,
//! so both variants live here.

use serde::{Deserialize, Serialize};
use std::fmt;

const EXTENSION_SCHEMES: [&str; 3] = ["chrome-extension:", "moz-extension:", "safari-extension:"];

/// Third-party analytics and tracking hosts blocked by the policy on purpose
pub const TRACKING_DOMAINS: [&str; 8] = [
    "google-analytics.com",
    "googletagmanager.com",
    "doubleclick.net",
    "connect.facebook.net",
    "hotjar.com",
    "clarity.ms",
    "segment.io",
    "mixpanel.com",
];

/// Keywords marking a runtime error as CSP-related in the browser
const MONITOR_KEYWORDS: [&str; 6] = [
    "content security policy",
    "csp",
    "refused to execute",
    "refused to load",
    "unsafe-eval",
    "unsafe-inline",
];

/// Violations that are noise rather than policy problems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoiseFilter {
    /// Drop `style-src` violations raised by browser developer tooling
    pub ignore_devtools_styles: bool,
}

impl NoiseFilter {
    /// Heuristic applied by the ingest endpoints
    pub const INGEST: Self = Self {
        ignore_devtools_styles: false,
    };

    /// Heuristic applied by the browser monitor
    pub const MONITOR: Self = Self {
        ignore_devtools_styles: true,
    };

    pub fn is_noise(&self, directive: &str, blocked_uri: &str, source_file: &str) -> bool {
        let from_extension = EXTENSION_SCHEMES
            .iter()
            .any(|scheme| blocked_uri.starts_with(scheme) || source_file.starts_with(scheme))
            || source_file.contains("extension");
        if from_extension {
            return true;
        }

        if TRACKING_DOMAINS.iter().any(|d| blocked_uri.contains(d)) {
            return true;
        }

        self.ignore_devtools_styles
            && directive.contains("style-src")
            && source_file.to_lowercase().contains("devtools")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }

    /// Severity assigned by the ingest endpoint
    pub fn for_ingest(directive: &str, blocked_uri: &str) -> Self {
        if blocked_uri.contains("eval") || blocked_uri.contains("unsafe-inline") {
            Self::Error
        } else if directive.contains("script-src") || directive.contains("object-src") {
            Self::Warning
        } else {
            Self::Info
        }
    }

    /// Severity assigned by the browser monitor
    pub fn for_monitor(directive: &str, blocked_uri: &str) -> Self {
        if directive.contains("script-src")
            || directive.contains("object-src")
            || blocked_uri.contains("eval")
            || blocked_uri.contains("unsafe-inline")
        {
            Self::Error
        } else if directive.contains("connect-src") || directive.contains("frame-src") {
            Self::Warning
        } else {
            Self::Info
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CSP-relatedness test used by the error ingest endpoint. A superset of
/// the browser monitor's test: a bare "eval" also counts.
pub fn is_csp_related(message: &str) -> bool {
    mentions_csp(message) || message.to_lowercase().contains("eval")
}

/// CSP-relatedness test used by the browser monitor
pub fn mentions_csp(message: &str) -> bool {
    let message = message.to_lowercase();
    MONITOR_KEYWORDS.iter().any(|k| message.contains(k))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCategory {
    EvalBlocked,
    InlineScriptBlocked,
    ResourceBlocked,
    EmailjsIntegration,
    OtherCspError,
}

impl ErrorCategory {
    /// First match wins, in declaration order
    pub fn categorize(message: &str) -> Self {
        let message = message.to_lowercase();
        if message.contains("eval") {
            Self::EvalBlocked
        } else if message.contains("inline") {
            Self::InlineScriptBlocked
        } else if message.contains("refused to load") {
            Self::ResourceBlocked
        } else if message.contains("email") {
            Self::EmailjsIntegration
        } else {
            Self::OtherCspError
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EvalBlocked => "eval-blocked",
            Self::InlineScriptBlocked => "inline-script-blocked",
            Self::ResourceBlocked => "resource-blocked",
            Self::EmailjsIntegration => "emailjs-integration",
            Self::OtherCspError => "other-csp-error",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_noise() {
        for filter in [NoiseFilter::INGEST, NoiseFilter::MONITOR] {
            assert!(filter.is_noise("script-src", "chrome-extension://abc/x.js", ""));
            assert!(filter.is_noise("script-src", "moz-extension://abc", ""));
            assert!(filter.is_noise("img-src", "https://cdn.example/a.png", "safari-extension://x"));
            assert!(filter.is_noise("script-src", "inline", "https://site.example/extension-loader.js"));
            assert!(!filter.is_noise("script-src", "https://evil.example/x.js", "https://site.example/app.js"));
        }
    }

    #[test]
    fn test_tracking_noise() {
        assert!(NoiseFilter::INGEST.is_noise(
            "script-src",
            "https://www.google-analytics.com/analytics.js",
            ""
        ));
        assert!(NoiseFilter::MONITOR.is_noise("img-src", "https://stats.doubleclick.net/p", ""));
    }

    #[test]
    fn test_devtools_styles_only_ignored_by_monitor() {
        let args = ("style-src-elem", "inline", "chrome://DevTools/bundled/inspector.js");
        assert!(NoiseFilter::MONITOR.is_noise(args.0, args.1, args.2));
        assert!(!NoiseFilter::INGEST.is_noise(args.0, args.1, args.2));
    }

    #[test]
    fn test_ingest_severity() {
        assert_eq!(Severity::for_ingest("script-src", "https://evil.example/x.js"), Severity::Warning);
        assert_eq!(Severity::for_ingest("object-src", "https://a.example/f.swf"), Severity::Warning);
        assert_eq!(Severity::for_ingest("script-src", "eval"), Severity::Error);
        assert_eq!(Severity::for_ingest("style-src", "unsafe-inline"), Severity::Error);
        assert_eq!(Severity::for_ingest("connect-src", "https://api.example"), Severity::Info);
    }

    #[test]
    fn test_monitor_severity() {
        assert_eq!(Severity::for_monitor("script-src", "unsafe-inline"), Severity::Error);
        assert_eq!(Severity::for_monitor("script-src-elem", "https://cdn.example/a.js"), Severity::Error);
        assert_eq!(Severity::for_monitor("connect-src", "https://api.example"), Severity::Warning);
        assert_eq!(Severity::for_monitor("frame-src", "https://video.example"), Severity::Warning);
        assert_eq!(Severity::for_monitor("img-src", "https://img.example/a.png"), Severity::Info);
    }

    #[test]
    fn test_csp_relatedness() {
        let json_error = "Unexpected token } in JSON";
        assert!(!is_csp_related(json_error));
        assert!(!mentions_csp(json_error));

        let inline = "Refused to execute inline script because it violates the following Content Security Policy directive";
        assert!(is_csp_related(inline));
        assert!(mentions_csp(inline));

        assert!(is_csp_related("call to eval() blocked"));
        assert!(!mentions_csp("call to eval() blocked"));
    }

    #[test]
    fn test_categorize_first_match_wins() {
        let inline = "Refused to execute inline script because it violates the following Content Security Policy directive";
        assert_eq!(ErrorCategory::categorize(inline), ErrorCategory::InlineScriptBlocked);
        assert_eq!(
            ErrorCategory::categorize("Refused to evaluate a string as JavaScript because 'unsafe-eval' is not allowed"),
            ErrorCategory::EvalBlocked
        );
        assert_eq!(
            ErrorCategory::categorize("Refused to load the script 'https://x.example/a.js'"),
            ErrorCategory::ResourceBlocked
        );
        assert_eq!(
            ErrorCategory::categorize("CSP blocked EmailJS request"),
            ErrorCategory::EmailjsIntegration
        );
        assert_eq!(ErrorCategory::categorize("CSP problem"), ErrorCategory::OtherCspError);
        assert_eq!(ErrorCategory::EvalBlocked.to_string(), "eval-blocked");
    }
}
