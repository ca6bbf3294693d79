//! Field description for administered records.
//!
//! A [`Record`] lists its fields in declaration order, each with a declared
//! [`FieldKind`] and a runtime [`FieldValue`]. The admin walks this
//! description instead of inspecting types at runtime. Most types get it from
//! `#[derive(Record)]`; field types plug in through [`ToField`].

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde::Serialize;

/// A record type the admin can display and edit.
pub trait Record: Send + Sync {
    /// Returns the fields in declaration order.
    fn fields(&self) -> Vec<Field<'_>>;

    /// Returns a single field by name.
    fn field(&self, name: &str) -> Option<Field<'_>> {
        self.fields().into_iter().find(|f| f.name == name)
    }
}

impl<T: Record + ?Sized> Record for Box<T> {
    fn fields(&self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

impl<T: Record + ?Sized> Record for Arc<T> {
    fn fields(&self) -> Vec<Field<'_>> {
        (**self).fields()
    }
}

/// One field of a record.
#[derive(Debug)]
pub struct Field<'a> {
    /// Field name as shown to the admin and used in form keys.
    pub name: &'static str,
    /// Declared kind, known even when the value is absent.
    pub kind: FieldKind,
    /// Current value.
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    /// Creates a field description.
    pub const fn new(name: &'static str, kind: FieldKind, value: FieldValue<'a>) -> Self {
        Self { name, kind, value }
    }
}

/// Display category of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Int,
    Uint,
    Float,
    Bool,
    Struct,
    Slice,
    Other,
}

impl FieldKind {
    /// Returns the lower-case kind name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Int => "int",
            Self::Uint => "uint",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Struct => "struct",
            Self::Slice => "slice",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime value of a field.
pub enum FieldValue<'a> {
    /// Absent value (`None`).
    Null,
    Str(Cow<'a, str>),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// A value with its own human-readable form. Wins over any generic
    /// rendering, including nesting.
    Display(String),
    /// A nested record.
    Record(&'a dyn Record),
    /// A sequence of values.
    Seq(Vec<FieldValue<'a>>),
}

impl FieldValue<'_> {
    /// Returns true for [`FieldValue::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Wraps any `Display` value.
    pub fn display(value: &impl fmt::Display) -> Self {
        Self::Display(value.to_string())
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Uint(v) => f.debug_tuple("Uint").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::Display(s) => f.debug_tuple("Display").field(s).finish(),
            Self::Record(r) => f.debug_tuple("Record").field(&r.fields()).finish(),
            Self::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
        }
    }
}

/// Conversion of a field's Rust type into a [`FieldValue`].
///
/// `#[derive(Record)]` implements this for the deriving struct (kind
/// `Struct`), which is what lets records nest.
pub trait ToField {
    /// Declared kind of the type.
    const KIND: FieldKind;

    /// Returns the current value.
    fn to_field_value(&self) -> FieldValue<'_>;
}

impl ToField for str {
    const KIND: FieldKind = FieldKind::String;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(Cow::Borrowed(self))
    }
}

impl ToField for String {
    const KIND: FieldKind = FieldKind::String;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(Cow::Borrowed(self.as_str()))
    }
}

impl ToField for Cow<'_, str> {
    const KIND: FieldKind = FieldKind::String;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(Cow::Borrowed(self.as_ref()))
    }
}

impl ToField for char {
    const KIND: FieldKind = FieldKind::String;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(Cow::Owned(self.to_string()))
    }
}

impl ToField for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Bool(*self)
    }
}

macro_rules! impl_to_field_signed {
    ($($t:ty),*) => {
        $(
            impl ToField for $t {
                const KIND: FieldKind = FieldKind::Int;

                fn to_field_value(&self) -> FieldValue<'_> {
                    FieldValue::Int(i64::from(*self))
                }
            }
        )*
    };
}

macro_rules! impl_to_field_unsigned {
    ($($t:ty),*) => {
        $(
            impl ToField for $t {
                const KIND: FieldKind = FieldKind::Uint;

                fn to_field_value(&self) -> FieldValue<'_> {
                    FieldValue::Uint(u64::from(*self))
                }
            }
        )*
    };
}

impl_to_field_signed!(i8, i16, i32, i64);
impl_to_field_unsigned!(u8, u16, u32, u64);

impl ToField for isize {
    const KIND: FieldKind = FieldKind::Int;

    fn to_field_value(&self) -> FieldValue<'_> {
        i64::try_from(*self).map_or_else(|_| FieldValue::display(self), FieldValue::Int)
    }
}

impl ToField for usize {
    const KIND: FieldKind = FieldKind::Uint;

    fn to_field_value(&self) -> FieldValue<'_> {
        u64::try_from(*self).map_or_else(|_| FieldValue::display(self), FieldValue::Uint)
    }
}

impl ToField for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Float(*self)
    }
}

impl ToField for f32 {
    const KIND: FieldKind = FieldKind::Float;

    // Widening to f64 would print the binary expansion (0.1 -> 0.100000001...),
    // so keep the f32's own shortest form.
    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::display(self)
    }
}

impl<T: ToField> ToField for Option<T> {
    const KIND: FieldKind = T::KIND;

    fn to_field_value(&self) -> FieldValue<'_> {
        self.as_ref().map_or(FieldValue::Null, ToField::to_field_value)
    }
}

impl<T: ToField + ?Sized> ToField for &T {
    const KIND: FieldKind = T::KIND;

    fn to_field_value(&self) -> FieldValue<'_> {
        (**self).to_field_value()
    }
}

impl<T: ToField + ?Sized> ToField for Box<T> {
    const KIND: FieldKind = T::KIND;

    fn to_field_value(&self) -> FieldValue<'_> {
        (**self).to_field_value()
    }
}

impl<T: ToField + ?Sized> ToField for Arc<T> {
    const KIND: FieldKind = T::KIND;

    fn to_field_value(&self) -> FieldValue<'_> {
        (**self).to_field_value()
    }
}

impl<T: ToField + ?Sized> ToField for Rc<T> {
    const KIND: FieldKind = T::KIND;

    fn to_field_value(&self) -> FieldValue<'_> {
        (**self).to_field_value()
    }
}

impl<T: ToField> ToField for [T] {
    const KIND: FieldKind = FieldKind::Slice;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Seq(self.iter().map(ToField::to_field_value).collect())
    }
}

impl<T: ToField> ToField for Vec<T> {
    const KIND: FieldKind = FieldKind::Slice;

    fn to_field_value(&self) -> FieldValue<'_> {
        self.as_slice().to_field_value()
    }
}

impl ToField for dyn Record {
    const KIND: FieldKind = FieldKind::Struct;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::Record(self)
    }
}

// Date and time values are structs with their own string form.

impl ToField for NaiveDate {
    const KIND: FieldKind = FieldKind::Struct;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::display(self)
    }
}

impl ToField for NaiveTime {
    const KIND: FieldKind = FieldKind::Struct;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::display(self)
    }
}

impl ToField for NaiveDateTime {
    const KIND: FieldKind = FieldKind::Struct;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::display(self)
    }
}

impl<Tz: TimeZone> ToField for DateTime<Tz>
where
    Tz::Offset: fmt::Display,
{
    const KIND: FieldKind = FieldKind::Struct;

    fn to_field_value(&self) -> FieldValue<'_> {
        FieldValue::display(self)
    }
}
