//! Integration tests for wayfarer-core

use async_trait::async_trait;
use wayfarer_core::*;

struct PoweredBy;

#[async_trait]
impl Middleware for PoweredBy {
    async fn handle(&self, req: HttpRequest, next: Next) -> Result<HttpResponse, Error> {
        let response = next(req).await?;
        Ok(response.with_header("X-Served-By", "wayfarer"))
    }
}

fn router() -> Router {
    let mut router = Router::new();
    router
        .get("/api/ping", |_req| async {
            Ok::<_, Error>(HttpResponse::json_value(200, serde_json::json!({"pong": true})))
        })
        .post("/api/echo", |req| async move {
            let body: serde_json::Value = req.json()?;
            Ok::<_, Error>(HttpResponse::json_value(200, body))
        });
    router
}

#[tokio::test]
async fn test_application_runs_middleware_around_router() {
    let app = Application::new(router()).with_middleware(PoweredBy);

    let response = app.handle(HttpRequest::new("GET", "/api/ping")).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.header("x-served-by"), Some("wayfarer"));
}

#[tokio::test]
async fn test_bad_json_is_client_error() {
    let app = Application::new(router());
    let request = HttpRequest::new("POST", "/api/echo").with_body(b"{not json".to_vec());

    let response = app.handle(request).await;
    assert_eq!(response.status, 400);
}

#[tokio::test]
async fn test_echo_round_trip() {
    let app = Application::new(router()).with_middleware(RequestLoggingMiddleware);
    let request = HttpRequest::new("POST", "/api/echo").with_body(br#"{"tour":"andes"}"#.to_vec());

    let response = app.handle(request).await;
    let body: serde_json::Value = response.json().unwrap();
    assert_eq!(body["tour"], "andes");
}

#[tokio::test]
async fn test_method_not_allowed() {
    let app = Application::new(router());
    let response = app.handle(HttpRequest::new("DELETE", "/api/ping")).await;
    assert_eq!(response.status, 405);
}
