// Application bootstrapper and HTTP server

use crate::{Error, HandlerFn, HttpRequest, HttpResponse, Middleware, MiddlewareChain, Router};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use wayfarer_log::{error, info, warn};

/// Router plus the middleware chain wrapped around it
#[derive(Clone)]
pub struct Application {
    router: Arc<Router>,
    middleware: MiddlewareChain,
}

impl Application {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
            middleware: MiddlewareChain::new(),
        }
    }

    /// Append a middleware; the first registered is the outermost
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.use_middleware(middleware);
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Run one request through middleware and router. Errors that escape
    /// the chain become JSON error responses.
    pub async fn handle(&self, req: HttpRequest) -> HttpResponse {
        let handler: HandlerFn = self.router.clone().into_handler();
        match self.middleware.apply(req, handler).await {
            Ok(response) => response,
            Err(err) => err.to_response(),
        }
    }

    /// Bind and serve HTTP/1.1 until the listener fails
    pub async fn listen(self, addr: SocketAddr) -> Result<(), Error> {
        let listener = TcpListener::bind(addr).await?;
        info!(address = %addr, "Server listening");
        self.serve(listener).await
    }

    /// Serve connections from an already-bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<(), Error> {
        let app = Arc::new(self);

        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let app = app.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let app = app.clone();
                    async move { handle_request(req, app).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(peer = %peer, error = %err, "Error serving connection");
                }
            });
        }
    }
}

async fn handle_request(
    req: Request<IncomingBody>,
    app: Arc<Application>,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let mut request = HttpRequest::new(req.method().as_str(), target);

    for (name, value) in req.headers() {
        if let Ok(value) = value.to_str() {
            request.append_header(name.as_str(), value);
        }
    }

    request.body = req.collect().await?.to_bytes().to_vec();

    let response = app.handle(request).await;

    let mut builder = Response::builder().status(response.status);
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    match builder.body(Full::new(Bytes::from(response.body))) {
        Ok(response) => Ok(response),
        Err(err) => {
            error!(error = %err, "Failed to build response");
            let mut fallback = Response::new(Full::new(Bytes::from_static(
                br#"{"error":"Internal server error"}"#,
            )));
            *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            Ok(fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_handle_maps_errors() {
        let app = Application::new(Router::new());
        let response = app.handle(HttpRequest::new("GET", "/missing")).await;

        assert_eq!(response.status, 404);
        let body: serde_json::Value = response.json().unwrap();
        assert!(body["error"].as_str().unwrap().contains("/missing"));
    }

    #[tokio::test]
    async fn test_server_errors_are_generic() {
        let mut router = Router::new();
        router.get("/boom", |_req| async {
            Err::<HttpResponse, _>(Error::Internal("database password is hunter2".to_string()))
        });

        let response = Application::new(router)
            .handle(HttpRequest::new("GET", "/boom"))
            .await;

        assert_eq!(response.status, 500);
        let body: serde_json::Value = response.json().unwrap();
        assert_eq!(body["error"], "Internal server error");
    }
}
