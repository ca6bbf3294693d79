//! Page rendering seam.

use crudmin_router::Response;

use super::Page;

/// Turns a [`Page`] into an HTTP response.
pub trait ViewRenderer: Send + Sync {
    fn render(&self, page: &Page) -> Response;
}

/// Renders pages as JSON documents tagged with a `page` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ViewRenderer for JsonRenderer {
    fn render(&self, page: &Page) -> Response {
        Response::json(page)
    }
}
