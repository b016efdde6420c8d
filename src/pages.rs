//! Minimal localized page shell
//!
//! Real page rendering lives in the frontend; the shell exists so every
//! localized path answers with a document that carries the request nonce
//! on its inline bootstrap script.

use wayfarer_core::{Error, HttpRequest, HttpResponse, Router};
use wayfarer_i18n::LOCALE_HEADER;
use wayfarer_monitor::MonitorConfig;
use wayfarer_security::NONCE_HEADER;

fn tagline(locale: &str) -> &'static str {
    match locale.split('-').next() {
        Some("es") => "Viajes en grupos pequeños por los Andes",
        _ => "Small-group journeys across the Andes",
    }
}

fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Page shell for the supported locales
#[derive(Debug, Clone)]
pub struct PageShell {
    locales: Vec<String>,
    monitor: MonitorConfig,
}

impl PageShell {
    pub fn new(locales: Vec<String>, monitor: MonitorConfig) -> Self {
        Self { locales, monitor }
    }

    /// Render the shell for one request. Paths whose first segment is not
    /// a supported locale are not pages.
    pub fn render(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let segment = request.param("locale").map(String::as_str).unwrap_or_default();
        let Some(locale) = self
            .locales
            .iter()
            .find(|l| l.eq_ignore_ascii_case(segment))
        else {
            return Err(Error::RouteNotFound(request.path.clone()));
        };
        let locale = request.header(LOCALE_HEADER).unwrap_or(locale.as_str());
        let page = request.param("page").map(String::as_str).unwrap_or("home");

        let config = serde_json::to_string(&self.monitor)
            .map_err(|e| Error::Serialization(e.to_string()))?
            .replace('<', "\\u003c");
        let nonce_attr = request
            .header(NONCE_HEADER)
            .map(|n| format!(" nonce=\"{}\"", escape_html(n)))
            .unwrap_or_default();

        let body = format!(
            "<!DOCTYPE html>\n<html lang=\"{lang}\">\n<head>\n<meta charset=\"utf-8\">\n<title>Wayfarer Tours</title>\n\
             <script{nonce_attr}>window.__CSP_MONITOR__ = {config};</script>\n</head>\n\
             <body data-page=\"{page}\">\n<h1>Wayfarer Tours</h1>\n<p>{tagline}</p>\n</body>\n</html>\n",
            lang = escape_html(locale),
            page = escape_html(page),
            tagline = tagline(locale),
        );
        Ok(HttpResponse::html(body))
    }

    /// Mount on `/:locale` and `/:locale/:page`
    pub fn register(self, router: &mut Router) {
        let home = self.clone();
        router.get("/:locale", move |req| {
            let shell = home.clone();
            async move { shell.render(&req) }
        });
        router.get("/:locale/:page", move |req| {
            let shell = self.clone();
            async move { shell.render(&req) }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> PageShell {
        PageShell::new(vec!["en".to_string(), "es".to_string()], MonitorConfig::default())
    }

    fn page(target: &str) -> String {
        let mut router = Router::new();
        shell().register(&mut router);
        let request = HttpRequest::new("GET", target)
            .with_header(NONCE_HEADER, "bm9uY2U=")
            .with_header(LOCALE_HEADER, "es");
        let response = tokio_test::block_on(router.route(request)).unwrap();
        String::from_utf8(response.body).unwrap()
    }

    #[test]
    fn test_shell_carries_nonce_and_locale() {
        let html = page("/es/tours");
        assert!(html.contains("<html lang=\"es\">"));
        assert!(html.contains("<script nonce=\"bm9uY2U=\">"));
        assert!(html.contains("\"violationEndpoint\":\"/api/csp-report\""));
        assert!(html.contains("data-page=\"tours\""));
        assert!(html.contains("Viajes"));
    }

    #[test]
    fn test_shell_without_nonce() {
        let mut request = HttpRequest::new("GET", "/en");
        request.path_params.insert("locale".to_string(), "en".to_string());
        let response = shell().render(&request).unwrap();
        let html = String::from_utf8(response.body).unwrap();
        assert!(html.contains("<script>window.__CSP_MONITOR__"));
        assert_eq!(response.headers.get("Content-Type").map(String::as_str), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_unknown_locale_is_not_a_page() {
        let mut router = Router::new();
        shell().register(&mut router);
        let result = tokio_test::block_on(router.route(HttpRequest::new("GET", "/favicon.ico")));
        assert!(matches!(result, Err(Error::RouteNotFound(_))));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
