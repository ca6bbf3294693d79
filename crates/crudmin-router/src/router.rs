//! Main router implementation.

use std::future::Future;
use std::sync::Arc;

use crate::error::{Result, RouterError};
use crate::middleware::{BoxFuture, Middleware, MiddlewareResult};
use crate::path::PathPattern;
use crate::request::{Method, PathParams, Request};
use crate::response::Response;

/// A boxed async handler function.
pub type Handler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// A single route definition.
#[derive(Clone)]
pub struct Route {
    /// HTTP method.
    pub method: Method,
    /// Path pattern.
    pub pattern: PathPattern,
    /// Request handler.
    pub handler: Handler,
}

impl Route {
    /// Creates a new route.
    pub fn new<F, Fut>(method: Method, pattern: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        Ok(Self {
            method,
            pattern: PathPattern::new(pattern)?,
            handler: Arc::new(move |req| Box::pin(handler(req))),
        })
    }
}

/// A group of routes with a common prefix.
pub struct RouteGroup {
    /// URL prefix for all routes in this group.
    prefix: String,
    /// Routes in this group.
    routes: Vec<Route>,
}

impl RouteGroup {
    /// Creates a new route group with the given prefix.
    ///
    /// A trailing `/` on the prefix is ignored.
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.trim_end_matches('/').to_string(),
            routes: Vec::new(),
        }
    }

    /// Adds a GET route.
    pub fn get<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Get, path, handler)
    }

    /// Adds a POST route.
    pub fn post<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Post, path, handler)
    }

    /// Adds a route with any method.
    pub fn route<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        let full_path = format!("{}{}", self.prefix, path);
        self.routes.push(Route::new(method, &full_path, handler)?);
        Ok(self)
    }

    /// Returns the routes in this group.
    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}

/// The main router for handling HTTP requests.
pub struct Router {
    /// Registered routes.
    routes: Vec<Route>,
    /// Global middleware.
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Adds a GET route.
    pub fn get<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Get, path, handler)
    }

    /// Adds a POST route.
    pub fn post<F, Fut>(self, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.route(Method::Post, path, handler)
    }

    /// Adds a route with any method.
    pub fn route<F, Fut>(mut self, method: Method, path: &str, handler: F) -> Result<Self>
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.routes.push(Route::new(method, path, handler)?);
        Ok(self)
    }

    /// Adds global middleware.
    #[must_use]
    pub fn middleware(mut self, mw: impl Middleware + 'static) -> Self {
        self.middleware.push(Arc::new(mw));
        self
    }

    /// Adds a route group.
    #[must_use]
    pub fn group(mut self, group: RouteGroup) -> Self {
        self.routes.extend(group.into_routes());
        self
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Handles an incoming request.
    pub fn handle(&self, mut request: Request) -> BoxFuture<'_, Response> {
        Box::pin(async move {
            // Run before middleware
            for mw in &self.middleware {
                match mw.before(request).await {
                    MiddlewareResult::Continue(req) => request = req,
                    MiddlewareResult::Response(res) => {
                        // Run after middleware even on early return
                        return self.run_after(res).await;
                    }
                }
            }

            let response = match self.find_route(&request) {
                Ok((route, params)) => {
                    request.params = params;
                    (route.handler)(request).await
                }
                Err(RouterError::MethodNotAllowed { .. }) => Response::method_not_allowed(),
                Err(_) => Response::not_found("Not Found"),
            };

            self.run_after(response).await
        })
    }

    async fn run_after(&self, mut response: Response) -> Response {
        for mw in self.middleware.iter().rev() {
            response = mw.after(response).await;
        }
        response
    }

    /// Finds a matching route for the request.
    fn find_route(&self, request: &Request) -> Result<(&Route, PathParams)> {
        let mut method_matched = false;

        for route in &self.routes {
            if let Some(params) = route.pattern.match_path(&request.path) {
                method_matched = true;
                // HEAD is served by GET handlers
                if route.method == request.method
                    || (request.method == Method::Head && route.method == Method::Get)
                {
                    return Ok((route, params));
                }
            }
        }

        if method_matched {
            Err(RouterError::MethodNotAllowed {
                method: request.method.to_string(),
                path: request.path.clone(),
            })
        } else {
            Err(RouterError::NotFound {
                method: request.method.to_string(),
                path: request.path.clone(),
            })
        }
    }
}
