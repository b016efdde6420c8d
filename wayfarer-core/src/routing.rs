// Routing system for HTTP requests

use crate::middleware::{BoxFuture, HandlerFn};
use crate::{Error, HttpMethod, HttpRequest, HttpResponse};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Route definition with handler
#[derive(Clone)]
pub struct Route {
    pub method: HttpMethod,
    pub path: String,
    pub handler: HandlerFn,
}

/// Router for managing routes and dispatching requests
#[derive(Clone, Default)]
pub struct Router {
    pub routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route);
    }

    /// Register a handler for `method` on `path`. Segments written as
    /// `:name` capture into `path_params`.
    pub fn on<F, Fut>(&mut self, method: HttpMethod, path: &str, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(Route {
            method,
            path: path.to_string(),
            handler: Arc::new(move |req| Box::pin(handler(req)) as BoxFuture),
        });
        self
    }

    pub fn get<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.on(HttpMethod::GET, path, handler)
    }

    pub fn post<F, Fut>(&mut self, path: &str, handler: F) -> &mut Self
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.on(HttpMethod::POST, path, handler)
    }

    /// Dispatch a request to the first matching route
    pub async fn route(&self, mut request: HttpRequest) -> Result<HttpResponse, Error> {
        let mut path_matched = false;

        for route in &self.routes {
            let Some(params) = match_path(&route.path, &request.path) else {
                continue;
            };
            path_matched = true;

            if route.method.as_str() != request.method {
                continue;
            }

            request.path_params = params;
            return (route.handler)(request).await;
        }

        if path_matched {
            Err(Error::MethodNotAllowed(format!(
                "{} {}",
                request.method, request.path
            )))
        } else {
            Err(Error::RouteNotFound(format!(
                "{} {}",
                request.method, request.path
            )))
        }
    }

    /// Wrap the router as the terminal handler of a middleware chain
    pub fn into_handler(self: Arc<Self>) -> HandlerFn {
        Arc::new(move |req| {
            let router = self.clone();
            Box::pin(async move { router.route(req).await }) as BoxFuture
        })
    }
}

/// Match a route path pattern against a request path
/// Returns Some(params) if matched, None otherwise
fn match_path(pattern: &str, path: &str) -> Option<HashMap<String, String>> {
    let pattern_parts: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
    let path_parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if pattern_parts.len() != path_parts.len() {
        return None;
    }

    let mut params = HashMap::new();

    for (pattern_part, path_part) in pattern_parts.iter().zip(path_parts.iter()) {
        if let Some(param_name) = pattern_part.strip_prefix(':') {
            params.insert(param_name.to_string(), path_part.to_string());
        } else if pattern_part != path_part {
            return None;
        }
    }

    Some(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_path_static() {
        let result = match_path("/api/csp-report", "/api/csp-report");
        assert_eq!(result.map(|p| p.len()), Some(0));
    }

    #[test]
    fn test_match_path_with_param() {
        let params = match_path("/:locale/tours", "/es/tours").unwrap();
        assert_eq!(params.get("locale"), Some(&"es".to_string()));
    }

    #[test]
    fn test_match_path_no_match() {
        assert!(match_path("/api/csp-report", "/api/csp-error").is_none());
        assert!(match_path("/:locale", "/es/tours").is_none());
    }

    #[test]
    fn test_match_path_root() {
        assert!(match_path("/", "/").is_some());
    }

    #[tokio::test]
    async fn test_router_dispatch() {
        let mut router = Router::new();
        router.get("/:locale", |req| async move {
            let locale = req.param("locale").cloned().unwrap_or_default();
            Ok::<_, Error>(HttpResponse::html(locale))
        });

        let response = router.route(HttpRequest::new("GET", "/es")).await.unwrap();
        assert_eq!(response.body, b"es".to_vec());
    }

    #[tokio::test]
    async fn test_router_not_found_and_method_not_allowed() {
        let mut router = Router::new();
        router.post("/api/csp-report", |_req| async { Ok::<_, Error>(HttpResponse::ok()) });

        let missing = router.route(HttpRequest::new("GET", "/nope")).await;
        assert!(matches!(missing, Err(Error::RouteNotFound(_))));

        let wrong_method = router.route(HttpRequest::new("PUT", "/api/csp-report")).await;
        assert!(matches!(wrong_method, Err(Error::MethodNotAllowed(_))));
    }
}
