// Middleware system for request/response processing

use crate::{Error, HttpRequest, HttpResponse};
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use wayfarer_log::{debug, error, info, trace};

/// Future returned by handlers and by [`Next`]
pub type BoxFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// The next handler in the middleware chain
pub type Next = Box<dyn FnOnce(HttpRequest) -> BoxFuture + Send>;

/// Terminal request handler
pub type HandlerFn = Arc<dyn Fn(HttpRequest) -> BoxFuture + Send + Sync>;

/// Middleware trait for processing requests before they reach the handler
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Process the request and optionally pass it to the next middleware
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error>;
}

/// Middleware chain executor
#[derive(Clone, Default)]
pub struct MiddlewareChain {
    middlewares: Arc<Vec<Arc<dyn Middleware>>>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware; earlier middleware wrap later ones
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) {
        let mut mws = (*self.middlewares).clone();
        mws.push(Arc::new(middleware));
        self.middlewares = Arc::new(mws);
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }

    /// Execute the middleware chain with a handler
    pub async fn apply(&self, req: HttpRequest, handler: HandlerFn) -> Result<HttpResponse, Error> {
        debug!(
            middleware_count = self.middlewares.len(),
            path = %req.path,
            method = %req.method,
            "Executing middleware chain"
        );
        self.execute_from(0, req, handler).await
    }

    fn execute_from(&self, index: usize, req: HttpRequest, handler: HandlerFn) -> BoxFuture {
        if index >= self.middlewares.len() {
            trace!("Middleware chain complete, calling handler");
            handler(req)
        } else {
            let middleware = self.middlewares[index].clone();
            let chain = self.clone();

            trace!(middleware_index = index, "Executing middleware");
            Box::pin(async move {
                middleware
                    .handle(
                        req,
                        Box::new(move |req| chain.execute_from(index + 1, req, handler)),
                    )
                    .await
            })
        }
    }
}

/// Logs method, path, status and duration of every request
#[derive(Debug, Default)]
pub struct RequestLoggingMiddleware;

#[async_trait]
impl Middleware for RequestLoggingMiddleware {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let start = std::time::Instant::now();
        let method = req.method.clone();
        let path = req.path.clone();

        let result = next(req).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => info!(
                method = %method,
                path = %path,
                status = response.status,
                duration_ms = duration.as_millis() as u64,
                "HTTP response sent"
            ),
            Err(err) => error!(
                method = %method,
                path = %path,
                status = err.status_code(),
                duration_ms = duration.as_millis() as u64,
                error = %err,
                "HTTP request failed"
            ),
        }

        result
    }
}
