//! Per-model admin descriptor.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::actions::AdminAction;
use crate::record::Record;
use crate::store::{Accessor, DisplayPk, PkStringer, Searcher};

const DEFAULT_PK_FIELD: &str = "id";

/// A column of the list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListField {
    pub name: String,
    pub sortable: bool,
}

/// How one record type is shown and edited in the admin.
///
/// ```ignore
/// let admin = ModelAdmin::new("Widget", accessor)
///     .pk_field("ID")
///     .list_fields(&["ID", "Name", "Price"])
///     .readonly_fields(&["ID"])
///     .action(AdminAction::delete_selected(accessor.clone()));
/// ```
#[derive(Clone)]
pub struct ModelAdmin {
    /// Model name, matched case-insensitively in URLs.
    pub name: String,
    /// Human-readable name. Derived from `name` when `None`.
    pub verbose_name: Option<String>,
    /// Field holding the primary key.
    pub pk_field: String,
    /// Columns of the list view, in order.
    pub list_fields: Vec<ListField>,
    /// Fields hidden from the change view.
    pub omit_fields: HashSet<String>,
    /// Fields shown but never written back.
    pub readonly_fields: HashSet<String>,
    /// Help text per field.
    pub field_notes: HashMap<String, String>,
    /// Edit widget per field. Fields missing here are inferred from the
    /// accessor's prototype at registration.
    pub field_widgets: Option<HashMap<String, String>>,
    list_actions: Vec<AdminAction>,
    accessor: Arc<dyn Accessor>,
    pk_stringer: Option<Arc<dyn PkStringer>>,
    searcher: Option<Arc<dyn Searcher>>,
}

impl ModelAdmin {
    /// Creates a descriptor with no list columns, flags or actions.
    pub fn new(name: impl Into<String>, accessor: Arc<dyn Accessor>) -> Self {
        Self {
            name: name.into(),
            verbose_name: None,
            pk_field: DEFAULT_PK_FIELD.to_string(),
            list_fields: Vec::new(),
            omit_fields: HashSet::new(),
            readonly_fields: HashSet::new(),
            field_notes: HashMap::new(),
            field_widgets: None,
            list_actions: Vec::new(),
            accessor,
            pk_stringer: None,
            searcher: None,
        }
    }

    /// Sets the primary key field.
    #[must_use]
    pub fn pk_field(mut self, field: impl Into<String>) -> Self {
        self.pk_field = field.into();
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn verbose_name(mut self, name: impl Into<String>) -> Self {
        self.verbose_name = Some(name.into());
        self
    }

    /// Sets the list columns, all sortable.
    #[must_use]
    pub fn list_fields(mut self, fields: &[&str]) -> Self {
        self.list_fields = fields
            .iter()
            .map(|name| ListField {
                name: (*name).to_string(),
                sortable: true,
            })
            .collect();
        self
    }

    /// Appends one list column.
    #[must_use]
    pub fn list_field(mut self, name: impl Into<String>, sortable: bool) -> Self {
        self.list_fields.push(ListField {
            name: name.into(),
            sortable,
        });
        self
    }

    /// Sets the fields hidden from the change view.
    #[must_use]
    pub fn omit_fields(mut self, fields: &[&str]) -> Self {
        self.omit_fields = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Sets the read-only fields.
    #[must_use]
    pub fn readonly_fields(mut self, fields: &[&str]) -> Self {
        self.readonly_fields = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Adds help text for a field.
    #[must_use]
    pub fn field_note(mut self, field: impl Into<String>, note: impl Into<String>) -> Self {
        self.field_notes.insert(field.into(), note.into());
        self
    }

    /// Sets the widget of one field, keeping inference for the rest.
    #[must_use]
    pub fn field_widget(mut self, field: impl Into<String>, widget: impl Into<String>) -> Self {
        self.field_widgets
            .get_or_insert_with(HashMap::new)
            .insert(field.into(), widget.into());
        self
    }

    /// Sets explicit widgets, replacing earlier ones.
    #[must_use]
    pub fn widgets(mut self, widgets: HashMap<String, String>) -> Self {
        self.field_widgets = Some(widgets);
        self
    }

    /// Adds a list action. An action with the same identifier is replaced in
    /// place.
    #[must_use]
    pub fn action(mut self, action: AdminAction) -> Self {
        match self
            .list_actions
            .iter_mut()
            .find(|a| a.identifier == action.identifier)
        {
            Some(existing) => *existing = action,
            None => self.list_actions.push(action),
        }
        self
    }

    /// Sets a custom primary key renderer.
    #[must_use]
    pub fn pk_stringer(mut self, stringer: impl PkStringer + 'static) -> Self {
        self.pk_stringer = Some(Arc::new(stringer));
        self
    }

    /// Enables search.
    #[must_use]
    pub fn searcher(mut self, searcher: Arc<dyn Searcher>) -> Self {
        self.searcher = Some(searcher);
        self
    }

    pub fn accessor(&self) -> &Arc<dyn Accessor> {
        &self.accessor
    }

    pub fn search(&self) -> Option<&Arc<dyn Searcher>> {
        self.searcher.as_ref()
    }

    /// List actions in registration order.
    pub fn actions(&self) -> &[AdminAction] {
        &self.list_actions
    }

    pub fn find_action(&self, identifier: &str) -> Option<&AdminAction> {
        self.list_actions.iter().find(|a| a.identifier == identifier)
    }

    pub fn is_list_field(&self, name: &str) -> bool {
        self.list_fields.iter().any(|f| f.name == name)
    }

    pub fn is_sortable(&self, name: &str) -> bool {
        self.list_fields.iter().any(|f| f.name == name && f.sortable)
    }

    pub fn is_omitted(&self, name: &str) -> bool {
        self.omit_fields.contains(name)
    }

    pub fn is_readonly(&self, name: &str) -> bool {
        self.readonly_fields.contains(name)
    }

    /// Widget for a field, `text` when unknown.
    pub fn widget(&self, field: &str) -> &str {
        self.field_widgets
            .as_ref()
            .and_then(|w| w.get(field))
            .map_or(crate::marshal::WIDGET_TEXT, String::as_str)
    }

    /// Returns the URL form of a record's primary key.
    ///
    /// A record without the pk field yields an empty string.
    pub fn pk_string(&self, record: &dyn Record) -> String {
        let Some(field) = record.field(&self.pk_field) else {
            tracing::debug!(model = %self.name, field = %self.pk_field, "record has no pk field");
            return String::new();
        };
        match &self.pk_stringer {
            Some(stringer) => stringer.pk_string(&field.value),
            None => DisplayPk.pk_string(&field.value),
        }
    }
}

impl fmt::Debug for ModelAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelAdmin")
            .field("name", &self.name)
            .field("pk_field", &self.pk_field)
            .field("list_fields", &self.list_fields)
            .field("omit_fields", &self.omit_fields)
            .field("readonly_fields", &self.readonly_fields)
            .field("field_widgets", &self.field_widgets)
            .field("list_actions", &self.list_actions)
            .field("searchable", &self.searcher.is_some())
            .finish_non_exhaustive()
    }
}
