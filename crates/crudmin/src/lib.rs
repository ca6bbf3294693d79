//! # crudmin
//!
//! A generic admin interface for Rust applications.
//!
//! Register model descriptors on an [`AdminSite`] and mount the resulting
//! [`Router`] under a URL prefix. The admin then serves, for every model:
//!
//! - An index with record counts
//! - Paginated, sortable and searchable list views
//! - Bulk actions over selected rows (`delete_selected` is built in)
//! - Change and create forms, save, save-and-continue and delete
//!
//! Records describe themselves through the [`Record`] trait, usually derived:
//!
//! ```ignore
//! use crudmin::Record;
//!
//! #[derive(Record)]
//! struct Widget {
//!     id: u64,
//!     #[record(rename = "Name")]
//!     name: String,
//!     parts: Vec<Part>,
//! }
//! ```
//!
//! Persistence is delegated to an [`Accessor`]; search to an optional
//! [`Searcher`]. Access control is delegated to an optional
//! [`Authenticator`].
//!
//! ## Rendering
//!
//! View handlers produce [`Page`] values. A [`ViewRenderer`] turns them into
//! HTTP responses: [`HtmlRenderer`] renders Bootstrap 5 HTML and
//! [`JsonRenderer`] serializes the page as JSON.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use crudmin::{AdminConfig, AdminSite, HtmlRenderer, ModelAdmin};
//!
//! let site = AdminSite::new(AdminConfig::default().brand("Shop"))
//!     .register(
//!         ModelAdmin::new("Widget", Arc::new(WidgetStore::default()))
//!             .list_fields(&["id", "Name"])
//!             .readonly_fields(&["id"]),
//!     );
//! let router = site.into_router(Arc::new(HtmlRenderer))?;
//! ```

extern crate self as crudmin;

pub mod actions;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod list;
pub mod marshal;
pub mod options;
pub mod record;
pub mod site;
pub mod store;
pub mod views;

#[cfg(test)]
mod testing;

pub use actions::{ActionHandler, ActionResult, AdminAction, Confirmation};
pub use auth::{Authenticator, Operation};
pub use config::AdminConfig;
pub use dispatch::{AdminRoute, Dispatcher};
pub use error::{AdminError, Result, StoreError, StoreResult};
pub use form::{selected_ids, unmarshal, ACTION_FIELD, SELECTED_FIELD};
pub use list::{
    compose_listing, sort_directions, ActionSummary, ListParams, ListRow, Listing, PageWindow,
    SortOrder,
};
pub use marshal::{
    default_widget, default_widgets, display_value, marshal, record_to_json, values_map, FieldNode, WIDGET_RADIO,
    WIDGET_TEXT, WIDGET_TEXTAREA,
};
pub use options::{ListField, ModelAdmin};
pub use record::{Field, FieldKind, FieldValue, Record, ToField};
pub use site::{AdminSite, ModelLink, ModelRegistration, ADD_PK};
pub use store::{Accessor, DisplayPk, PkStringer, Records, Searcher};
pub use views::{
    AdminResponse, ChangePage, DeniedPage, HtmlRenderer, IndexPage, JsonRenderer, ListPage,
    Message, MessageLevel, ModelSummary, Page, PageContext, ViewRenderer,
};

pub use crudmin_derive::Record;
pub use crudmin_router::{BoxFuture, FormData, Method, Request, Response, Router};
