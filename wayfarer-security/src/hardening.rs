//! Fixed hardening headers sent alongside the CSP

/// `X-Frame-Options`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameGuard {
    Deny,
    SameOrigin,
}

impl FrameGuard {
    pub fn to_header_value(&self) -> &'static str {
        match self {
            Self::Deny => "DENY",
            Self::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// `X-Content-Type-Options`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentTypeOptions {
    #[default]
    NoSniff,
}

impl ContentTypeOptions {
    pub fn to_header_value(&self) -> &'static str {
        "nosniff"
    }
}

/// `Referrer-Policy`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferrerPolicy {
    NoReferrer,
    SameOrigin,
    StrictOrigin,
    StrictOriginWhenCrossOrigin,
}

impl ReferrerPolicy {
    pub fn to_header_value(&self) -> &'static str {
        match self {
            Self::NoReferrer => "no-referrer",
            Self::SameOrigin => "same-origin",
            Self::StrictOrigin => "strict-origin",
            Self::StrictOriginWhenCrossOrigin => "strict-origin-when-cross-origin",
        }
    }
}

/// `Permissions-Policy`; every listed feature is disabled for all origins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionsPolicy {
    disabled: Vec<String>,
}

impl PermissionsPolicy {
    pub fn deny<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            disabled: features.into_iter().map(Into::into).collect(),
        }
    }

    pub fn to_header_value(&self) -> String {
        self.disabled
            .iter()
            .map(|f| format!("{}=()", f))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for PermissionsPolicy {
    fn default() -> Self {
        Self::deny(["camera", "microphone", "geolocation", "interest-cohort"])
    }
}

/// `Strict-Transport-Security`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HstsConfig {
    pub max_age: u64,
    pub include_subdomains: bool,
}

impl HstsConfig {
    pub fn new(max_age: u64) -> Self {
        Self {
            max_age,
            include_subdomains: true,
        }
    }

    pub fn to_header_value(&self) -> String {
        if self.include_subdomains {
            format!("max-age={}; includeSubDomains", self.max_age)
        } else {
            format!("max-age={}", self.max_age)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_guard() {
        assert_eq!(FrameGuard::Deny.to_header_value(), "DENY");
        assert_eq!(FrameGuard::SameOrigin.to_header_value(), "SAMEORIGIN");
    }

    #[test]
    fn test_referrer_policy() {
        assert_eq!(
            ReferrerPolicy::StrictOriginWhenCrossOrigin.to_header_value(),
            "strict-origin-when-cross-origin"
        );
        assert_eq!(ReferrerPolicy::NoReferrer.to_header_value(), "no-referrer");
    }

    #[test]
    fn test_permissions_policy() {
        assert_eq!(
            PermissionsPolicy::default().to_header_value(),
            "camera=(), microphone=(), geolocation=(), interest-cohort=()"
        );
        assert_eq!(PermissionsPolicy::deny(["usb"]).to_header_value(), "usb=()");
    }

    #[test]
    fn test_hsts() {
        assert_eq!(
            HstsConfig::new(31536000).to_header_value(),
            "max-age=31536000; includeSubDomains"
        );
    }
}
