//! Locale handling for the Wayfarer site backend
//!
//! - [`Locale`] tags and `Accept-Language` negotiation
//! - [`PrefixLocaleRouter`], which keeps every page under a locale prefix
//!
//! ```
//! use wayfarer_core::HttpRequest;
//! use wayfarer_i18n::{LocaleRouting, PrefixLocaleRouter};
//!
//! let router = PrefixLocaleRouter::from_tags(&["en", "es"], "en").unwrap();
//! let request = HttpRequest::new("GET", "/tours").with_header("Accept-Language", "es-MX,es;q=0.9");
//! let decision = router.resolve(&request).unwrap();
//! assert_eq!(decision.redirect_response().unwrap().header("Location"), Some("/es/tours"));
//! ```

pub mod error;
pub mod locale;
pub mod routing;

pub use error::{I18nError, Result};
pub use locale::{Locale, negotiate_locale, parse_accept_language};
pub use routing::{LOCALE_COOKIE, LOCALE_HEADER, LocaleDecision, LocaleRouting, PrefixLocaleRouter};
