//! Locale tags and Accept-Language negotiation

use crate::{I18nError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A language with an optional region, e.g. `es` or `en-US`.
///
/// ```
/// use wayfarer_i18n::Locale;
///
/// let es_mx = Locale::parse("es_mx").unwrap();
/// assert_eq!(es_mx.tag(), "es-MX");
/// assert_eq!(es_mx.language_only().tag(), "es");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locale {
    /// ISO 639 language code, lowercase
    pub language: String,
    /// ISO 3166 region or UN M.49 area code, uppercase
    pub region: Option<String>,
}

impl Locale {
    pub fn new(language: impl Into<String>, region: Option<impl Into<String>>) -> Self {
        Self {
            language: language.into().to_lowercase(),
            region: region.map(|r| r.into().to_uppercase()),
        }
    }

    /// Parse a tag such as `en`, `en-US` or `es_419`. Script subtags are
    /// accepted and dropped; anything else is an error.
    pub fn parse(tag: &str) -> Result<Self> {
        let invalid = || I18nError::InvalidLocale(tag.to_string());
        let mut parts = tag.trim().split(['-', '_']);

        let language = parts.next().filter(|l| !l.is_empty()).ok_or_else(invalid)?;
        if !(2..=3).contains(&language.len()) || !language.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut region = None;
        for part in parts {
            let alpha = part.bytes().all(|b| b.is_ascii_alphabetic());
            let digits = part.bytes().all(|b| b.is_ascii_digit());
            match part.len() {
                4 if alpha => {}
                2 if alpha => region = Some(part.to_uppercase()),
                3 if digits => region = Some(part.to_string()),
                _ => return Err(invalid()),
            }
        }

        Ok(Self {
            language: language.to_lowercase(),
            region,
        })
    }

    pub fn tag(&self) -> String {
        match &self.region {
            Some(region) => format!("{}-{}", self.language, region),
            None => self.language.clone(),
        }
    }

    pub fn language_only(&self) -> Self {
        Self {
            language: self.language.clone(),
            region: None,
        }
    }

    /// 0 for a different language, 10 for a language match, 100 for exact
    pub fn match_score(&self, other: &Locale) -> u32 {
        if self.language != other.language {
            0
        } else if self.region == other.region {
            100
        } else {
            10
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag())
    }
}

impl FromStr for Locale {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

// ============================================================================
// Accept-Language
// ============================================================================

/// Parse an `Accept-Language` header into locales, highest quality first.
///
/// Wildcards, entries with `q=0` and entries that fail to parse are skipped.
/// Entries of equal quality keep their header order.
///
/// ```
/// use wayfarer_i18n::parse_accept_language;
///
/// let locales = parse_accept_language("fr;q=0.8, es-MX, *;q=0.1, !!;q=0.9");
/// let tags: Vec<String> = locales.iter().map(|l| l.tag()).collect();
/// assert_eq!(tags, ["es-MX", "fr"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<Locale> {
    let mut entries: Vec<(Locale, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut fields = part.split(';');
            let tag = fields.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let mut quality = 1.0_f32;
            for param in fields {
                if let Some(q) = param.trim().strip_prefix("q=") {
                    quality = q.trim().parse().ok().filter(|q| (0.0..=1.0).contains(q))?;
                }
            }
            if quality <= 0.0 {
                return None;
            }

            Locale::parse(tag).ok().map(|locale| (locale, quality))
        })
        .collect();

    entries.sort_by(|a, b| b.1.total_cmp(&a.1));
    entries.into_iter().map(|(locale, _)| locale).collect()
}

/// Pick the best available locale for the requested list.
///
/// Each requested locale is tried in order: first an exact match, then any
/// available locale sharing its language. Falls back to `default`.
pub fn negotiate_locale<'a>(
    requested: &[Locale],
    available: &'a [Locale],
    default: &'a Locale,
) -> &'a Locale {
    for req in requested {
        if let Some(exact) = available.iter().find(|a| *a == req) {
            return exact;
        }
        if let Some(partial) = available.iter().find(|a| a.match_score(req) > 0) {
            return partial;
        }
    }
    default
}
