//! Middleware support for request/response processing.

use std::future::Future;
use std::pin::Pin;

use crate::request::Request;
use crate::response::Response;

/// A boxed future for async handlers and collaborators.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Result of middleware processing.
pub enum MiddlewareResult {
    /// Continue to the next middleware/handler.
    Continue(Request),
    /// Stop processing and return this response.
    Response(Response),
}

/// Trait for middleware that processes requests and responses.
///
/// Middleware can:
/// - Modify the request before it reaches the handler
/// - Short-circuit processing and return a response
/// - Modify the response after the handler runs
pub trait Middleware: Send + Sync {
    /// Called before the request handler.
    ///
    /// Can modify the request or short-circuit with a response.
    fn before<'a>(&'a self, req: Request) -> BoxFuture<'a, MiddlewareResult>;

    /// Called after the request handler.
    ///
    /// Can modify the response.
    fn after<'a>(&'a self, res: Response) -> BoxFuture<'a, Response>;
}

/// Middleware that logs every request and its response status.
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn before<'a>(&'a self, req: Request) -> BoxFuture<'a, MiddlewareResult> {
        Box::pin(async move {
            tracing::info!(method = %req.method, path = %req.path, "request");
            MiddlewareResult::Continue(req)
        })
    }

    fn after<'a>(&'a self, res: Response) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            tracing::info!(status = res.status, "response");
            res
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_logging_middleware_passes_through() {
        let mw = LoggingMiddleware;
        match mw.before(Request::get("/admin/")).await {
            MiddlewareResult::Continue(req) => assert_eq!(req.path, "/admin/"),
            MiddlewareResult::Response(_) => panic!("expected Continue"),
        }

        let res = mw.after(Response::ok().status(404)).await;
        assert_eq!(res.status, 404);
    }
}
