//! # crudmin-router
//!
//! The HTTP seam of the crudmin admin: plain request/response values and a
//! small pattern router. Any server (hyper, axum, a test harness) converts its
//! own request type into a [`Request`], calls [`Router::handle`] and writes the
//! returned [`Response`] back.
//!
//! This crate provides:
//! - Path pattern matching with `{param}` segments
//! - HTTP method-based routing with 404/405 fallbacks
//! - Multi-valued `application/x-www-form-urlencoded` body parsing
//! - Middleware support (before/after hooks)
//! - Route groups with prefixes
//!
//! ## Quick Start
//!
//! ```ignore
//! use crudmin_router::{Request, Response, Router};
//!
//! async fn hello(_req: Request) -> Response {
//!     Response::text("Hello, World!")
//! }
//!
//! let router = Router::new()
//!     .get("/", hello)?
//!     .get("/users/{id}", user_handler)?;
//!
//! let response = router.handle(Request::get("/users/123")).await;
//! ```
//!
//! ## Forms
//!
//! ```ignore
//! async fn save(req: Request) -> Response {
//!     let form = req.form();
//!     let tags = form.get_all("tags");
//!     // ...
//! }
//! ```

mod error;
mod form;
mod middleware;
mod path;
mod request;
mod response;
mod router;

pub use error::{Result, RouterError};
pub use form::{percent_encode, url_encode, FormData};
pub use middleware::{BoxFuture, LoggingMiddleware, Middleware, MiddlewareResult};
pub use path::PathPattern;
pub use request::{Method, PathParams, Request};
pub use response::Response;
pub use router::{Handler, Route, RouteGroup, Router};
