//! Admin view handlers.
//!
//! This module contains the handlers behind each admin route:
//! - `index` - record counts per model
//! - `list` - paginated listing and bulk actions
//! - `change` - change/create form, save and delete
//!
//! Handlers return an [`AdminResponse`]. Pages are turned into HTTP
//! responses by a [`ViewRenderer`].

mod change;
mod html;
mod index;
mod list;
mod render;

use std::collections::{BTreeMap, HashMap};

use crudmin_router::Response;
use serde::Serialize;

use crate::error::AdminError;
use crate::list::Listing;
use crate::marshal::FieldNode;
use crate::site::{AdminSite, ModelLink};

pub use change::{change_view, create_view, delete_view, save_view};
pub use html::HtmlRenderer;
pub use index::index_view;
pub use list::{list_update, list_view};
pub use render::{JsonRenderer, ViewRenderer};

/// Outcome of an admin request.
#[derive(Debug, Clone, Serialize)]
pub enum AdminResponse {
    /// A page to render, always with status 200.
    Page(Page),
    /// Redirect to a URL.
    Redirect(String),
    /// 404 with a message.
    NotFound(String),
    /// 406 with a message.
    ClientError(String),
    /// 500 with a message.
    ServerError(String),
}

impl AdminResponse {
    /// Converts into an HTTP response, rendering pages with `renderer`.
    pub fn into_response(self, renderer: &dyn ViewRenderer) -> Response {
        match self {
            Self::Page(page) => renderer.render(&page),
            Self::Redirect(url) => Response::redirect(url),
            Self::NotFound(message) => Response::not_found(message),
            Self::ClientError(message) => Response::not_acceptable(message),
            Self::ServerError(message) => Response::internal_server_error(message),
        }
    }

    /// Returns the page, if this is one.
    pub fn page(&self) -> Option<&Page> {
        match self {
            Self::Page(page) => Some(page),
            _ => None,
        }
    }
}

impl AdminError {
    /// Maps an error to the response the admin sends for it.
    ///
    /// Store failures carry their message to the client verbatim.
    pub fn into_response(self) -> AdminResponse {
        match self {
            Self::NotFound | Self::ModelNotRegistered(_) => {
                AdminResponse::NotFound("Not found.".to_string())
            }
            Self::InvalidId => AdminResponse::NotFound("Invalid ID.".to_string()),
            Self::Store(message) => AdminResponse::ClientError(message),
            Self::PermissionDenied => AdminResponse::ClientError("Permission denied.".to_string()),
            Self::UnknownAction(action) => {
                AdminResponse::ClientError(format!("Unknown action: {action}"))
            }
            err @ (Self::DuplicateModel(_) | Self::Router(_)) => {
                AdminResponse::ServerError(err.to_string())
            }
        }
    }
}

/// A rendered admin page.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "page", rename_all = "lowercase")]
pub enum Page {
    Index(IndexPage),
    List(ListPage),
    Change(ChangePage),
    Denied(DeniedPage),
}

impl Page {
    /// Shared layout data.
    pub fn context(&self) -> &PageContext {
        match self {
            Self::Index(p) => &p.context,
            Self::List(p) => &p.context,
            Self::Change(p) => &p.context,
            Self::Denied(p) => &p.context,
        }
    }

    /// Page heading.
    pub fn title(&self) -> String {
        match self {
            Self::Index(_) => "Site administration".to_string(),
            Self::List(p) => format!("Select {} to change", p.verbose_name.to_lowercase()),
            Self::Change(p) if p.is_new => format!("Add {}", p.verbose_name.to_lowercase()),
            Self::Change(p) => format!("Change {}", p.verbose_name.to_lowercase()),
            Self::Denied(_) => "Permission denied".to_string(),
        }
    }
}

/// Layout data every page carries.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub brand: String,
    pub index_url: String,
    /// Navigation entries for every registered model.
    pub models: Vec<ModelLink>,
}

impl PageContext {
    pub fn for_site(site: &AdminSite) -> Self {
        Self {
            brand: site.config().brand.clone(),
            index_url: site.index_url(),
            models: site.model_list(),
        }
    }
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Info,
    Error,
}

/// A flash message shown above the page content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub level: MessageLevel,
    pub text: String,
}

impl Message {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            text: text.into(),
        }
    }
}

/// Record counts per model.
#[derive(Debug, Clone, Serialize)]
pub struct IndexPage {
    pub context: PageContext,
    pub models: Vec<ModelSummary>,
}

/// One model on the index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelSummary {
    pub name: String,
    pub verbose_name_plural: String,
    pub list_url: String,
    pub add_url: String,
    pub count: usize,
}

/// One page of a model's records.
#[derive(Debug, Clone, Serialize)]
pub struct ListPage {
    pub context: PageContext,
    pub verbose_name: String,
    pub verbose_name_plural: String,
    pub list_url: String,
    pub add_url: String,
    pub listing: Listing,
    pub message: Option<Message>,
}

/// Change or create form of one record.
#[derive(Debug, Clone, Serialize)]
pub struct ChangePage {
    pub context: PageContext,
    pub model: String,
    pub verbose_name: String,
    /// Primary key, `add` for the create form.
    pub pk: String,
    pub is_new: bool,
    pub fields: Vec<FieldNode>,
    /// Flat display strings per top-level field.
    pub values: BTreeMap<String, String>,
    pub widgets: HashMap<String, String>,
    pub notes: HashMap<String, String>,
    pub list_url: String,
    /// Form target for save and delete.
    pub action_url: String,
    pub message: Option<Message>,
}

/// Shown instead of the requested page when permission is refused.
#[derive(Debug, Clone, Serialize)]
pub struct DeniedPage {
    pub context: PageContext,
    pub message: String,
}
