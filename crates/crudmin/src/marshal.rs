//! Record to field-tree marshaling.
//!
//! [`marshal`] walks a [`Record`] in declaration order and produces one
//! [`FieldNode`] per field. Nested records and sequences of records become
//! containers whose identifiers extend the parent's with `.<field>` or
//! `.<index>`.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::options::ModelAdmin;
use crate::record::{FieldKind, FieldValue, Record};

/// Widget used for fields without a more specific one.
pub const WIDGET_TEXT: &str = "text";
/// Widget for boolean fields.
pub const WIDGET_RADIO: &str = "radio";
/// Widget for nested records and sequences.
pub const WIDGET_TEXTAREA: &str = "textarea";

/// Display/edit descriptor for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldNode {
    /// Dotted path from the top-level record, e.g. `Parts.0.Name`.
    pub identifier: String,
    /// Declared kind.
    pub kind: FieldKind,
    /// Canonical string form. Empty for containers and null values.
    pub value: String,
    /// Child nodes. Empty for leaves.
    pub children: Vec<FieldNode>,
    /// Shown in list views.
    pub list: bool,
    /// Hidden from change views.
    pub omit: bool,
    /// Not editable.
    pub readonly: bool,
}

impl FieldNode {
    /// Returns true when the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Returns the last segment of the identifier.
    pub fn name(&self) -> &str {
        self.identifier
            .rsplit('.')
            .next()
            .unwrap_or(&self.identifier)
    }

    /// Finds a descendant (or self) by full identifier.
    pub fn find(&self, identifier: &str) -> Option<&Self> {
        if self.identifier == identifier {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(identifier))
    }
}

/// Marshals a record into its field tree.
///
/// `list`/`omit`/`readonly` flags are looked up by bare field name against
/// the top-level descriptor at every depth, so a nested `Name` shares the
/// flags of a top-level `Name`.
pub fn marshal(record: &dyn Record, admin: &ModelAdmin, prefix: &str) -> Vec<FieldNode> {
    record
        .fields()
        .into_iter()
        .map(|field| {
            let identifier = join_identifier(prefix, field.name);
            let mut node = FieldNode {
                identifier,
                kind: field.kind,
                value: String::new(),
                children: Vec::new(),
                list: admin.is_list_field(field.name),
                omit: admin.is_omitted(field.name),
                readonly: admin.is_readonly(field.name),
            };
            match field.value {
                FieldValue::Record(inner) => {
                    node.children = marshal(inner, admin, &node.identifier);
                }
                FieldValue::Seq(items) => {
                    node.children = marshal_seq(items, admin, &node.identifier);
                }
                scalar => node.value = display_value(&scalar),
            }
            node
        })
        .collect()
}

fn marshal_seq(items: Vec<FieldValue<'_>>, admin: &ModelAdmin, parent: &str) -> Vec<FieldNode> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            FieldValue::Record(inner) => {
                let identifier = format!("{parent}.{index}");
                let children = marshal(inner, admin, &identifier);
                Some(FieldNode {
                    identifier,
                    kind: FieldKind::Struct,
                    value: String::new(),
                    children,
                    list: false,
                    omit: false,
                    readonly: false,
                })
            }
            _ => None,
        })
        .collect()
}

fn join_identifier(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Returns the canonical string form of a scalar value.
///
/// Strings are verbatim, integers base-10, floats the shortest decimal that
/// round-trips (never in exponent form), booleans `true`/`false`. Null and
/// container values render empty.
pub fn display_value(value: &FieldValue<'_>) -> String {
    match value {
        FieldValue::Null | FieldValue::Record(_) | FieldValue::Seq(_) => String::new(),
        FieldValue::Str(s) => s.to_string(),
        FieldValue::Int(v) => v.to_string(),
        FieldValue::Uint(v) => v.to_string(),
        FieldValue::Float(v) => v.to_string(),
        FieldValue::Bool(v) => v.to_string(),
        FieldValue::Display(s) => s.clone(),
    }
}

/// Widget used for a field kind when none is configured.
pub const fn default_widget(kind: FieldKind) -> &'static str {
    match kind {
        FieldKind::Bool => WIDGET_RADIO,
        FieldKind::Struct | FieldKind::Slice => WIDGET_TEXTAREA,
        _ => WIDGET_TEXT,
    }
}

/// Infers an edit widget for every field of a prototype record.
pub fn default_widgets(prototype: &dyn Record) -> HashMap<String, String> {
    prototype
        .fields()
        .into_iter()
        .map(|field| (field.name.to_string(), default_widget(field.kind).to_string()))
        .collect()
}

/// Flattens a record into field name → display string.
///
/// Nested records and sequences render as indented JSON, everything else as
/// [`display_value`].
pub fn values_map(record: &dyn Record) -> BTreeMap<String, String> {
    record
        .fields()
        .into_iter()
        .map(|field| {
            let rendered = match &field.value {
                FieldValue::Record(_) | FieldValue::Seq(_) => {
                    serde_json::to_string_pretty(&value_to_json(&field.value)).unwrap_or_default()
                }
                scalar => display_value(scalar),
            };
            (field.name.to_string(), rendered)
        })
        .collect()
}

/// Converts a record into a JSON object keyed by field name.
pub fn record_to_json(record: &dyn Record) -> Value {
    let map: Map<String, Value> = record
        .fields()
        .into_iter()
        .map(|field| (field.name.to_string(), value_to_json(&field.value)))
        .collect();
    Value::Object(map)
}

fn value_to_json(value: &FieldValue<'_>) -> Value {
    match value {
        FieldValue::Null => Value::Null,
        FieldValue::Str(s) => Value::String(s.to_string()),
        FieldValue::Int(v) => Value::from(*v),
        FieldValue::Uint(v) => Value::from(*v),
        FieldValue::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
        FieldValue::Bool(v) => Value::Bool(*v),
        FieldValue::Display(s) => Value::String(s.clone()),
        FieldValue::Record(inner) => record_to_json(*inner),
        FieldValue::Seq(items) => Value::Array(items.iter().map(value_to_json).collect()),
    }
}
