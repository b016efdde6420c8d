// Core HTTP layer for the Wayfarer site backend
// Request/response model, routing, middleware chain and the hyper server loop

pub mod application;
pub mod error;
pub mod http;
pub mod method;
pub mod middleware;
pub mod routing;

pub use application::Application;
pub use error::Error;
pub use http::{HttpRequest, HttpResponse};
pub use method::HttpMethod;
pub use middleware::{BoxFuture, HandlerFn, Middleware, MiddlewareChain, Next, RequestLoggingMiddleware};
pub use routing::{Route, Router};
