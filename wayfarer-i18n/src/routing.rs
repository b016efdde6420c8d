//! Locale-prefix routing
//!
//! Every page lives under a locale segment (`/en/tours`, `/es/tours`).
//! Requests without one are redirected to the best locale for the visitor.

use crate::locale::{Locale, negotiate_locale, parse_accept_language};
use crate::{I18nError, Result};
use wayfarer_core::{HttpRequest, HttpResponse};
use wayfarer_log::debug;

/// Cookie remembering the visitor's explicit locale choice
pub const LOCALE_COOKIE: &str = "WAYFARER_LOCALE";

/// Request header carrying the resolved locale to page handlers
pub const LOCALE_HEADER: &str = "x-locale";

/// Outcome of locale resolution for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocaleDecision {
    /// Path already carries a supported locale
    Continue(Locale),
    /// Send the visitor to the localized path
    Redirect { locale: Locale, location: String },
}

impl LocaleDecision {
    pub fn locale(&self) -> &Locale {
        match self {
            Self::Continue(locale) | Self::Redirect { locale, .. } => locale,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Self::Redirect { .. })
    }

    /// 307 response for a redirect decision
    pub fn redirect_response(&self) -> Option<HttpResponse> {
        match self {
            Self::Redirect { location, .. } => Some(HttpResponse::temporary_redirect(location)),
            Self::Continue(_) => None,
        }
    }
}

/// Resolves the locale of an inbound request
pub trait LocaleRouting: Send + Sync {
    fn resolve(&self, request: &HttpRequest) -> Result<LocaleDecision>;
}

/// Routes on the first path segment, negotiating when it is absent
#[derive(Debug, Clone)]
pub struct PrefixLocaleRouter {
    locales: Vec<Locale>,
    default: Locale,
}

impl PrefixLocaleRouter {
    pub fn new(locales: Vec<Locale>, default: Locale) -> Result<Self> {
        if locales.is_empty() {
            return Err(I18nError::NoLocales);
        }
        if !locales.contains(&default) {
            return Err(I18nError::UnsupportedDefault(default.tag()));
        }
        Ok(Self { locales, default })
    }

    /// Build from configuration tags such as `["en", "es"]` and `"en"`
    pub fn from_tags<S: AsRef<str>>(tags: &[S], default: &str) -> Result<Self> {
        let locales = tags
            .iter()
            .map(|t| Locale::parse(t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::new(locales, Locale::parse(default)?)
    }

    pub fn locales(&self) -> &[Locale] {
        &self.locales
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    /// Supported locale named by the first path segment, if any
    pub fn path_locale(&self, path: &str) -> Option<&Locale> {
        let segment = path.trim_start_matches('/').split('/').next()?;
        if segment.is_empty() {
            return None;
        }
        self.locales
            .iter()
            .find(|l| l.tag().eq_ignore_ascii_case(segment))
    }

    fn cookie_locale(&self, request: &HttpRequest) -> Option<&Locale> {
        let requested = Locale::parse(request.cookie(LOCALE_COOKIE)?).ok()?;
        self.locales.iter().find(|l| **l == requested)
    }

    fn preferred_locale(&self, request: &HttpRequest) -> &Locale {
        if let Some(locale) = self.cookie_locale(request) {
            return locale;
        }
        let requested = request
            .header("accept-language")
            .map(parse_accept_language)
            .unwrap_or_default();
        negotiate_locale(&requested, &self.locales, &self.default)
    }
}

impl LocaleRouting for PrefixLocaleRouter {
    fn resolve(&self, request: &HttpRequest) -> Result<LocaleDecision> {
        if let Some(locale) = self.path_locale(&request.path) {
            return Ok(LocaleDecision::Continue(locale.clone()));
        }

        let locale = self.preferred_locale(request).clone();
        let mut location = format!("/{}", locale.tag());
        if request.path != "/" {
            location.push_str(&request.path);
        }
        if let Some(query) = request.query.as_deref().filter(|q| !q.is_empty()) {
            location.push('?');
            location.push_str(query);
        }

        debug!(path = %request.path, locale = %locale, location = %location, "Redirecting to localized path");
        Ok(LocaleDecision::Redirect { locale, location })
    }
}
