//! Attribute registry.
//!
//! A [`Schema`] declares the attributes an entity type may hold, which of
//! them may be sent on create and update, and which are required for each.
//! A [`Record`] holds one tri-state [`Slot`] per registered attribute.
//!
//! The three slot states are kept apart everywhere:
//!
//! - [`Slot::Unset`]: never assigned. Invisible to every outbound request.
//! - [`Slot::Null`]: explicitly assigned "no value". Sent as an empty value.
//! - [`Slot::Set`]: holds a concrete [`Value`].
//!
//! Values are stored exactly as assigned; wire-format coercion only happens
//! when a record is hydrated from a response (see [`crate::hydrate`]).

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::error::KayakoError;

/// The unset sentinel shared by every record.
///
/// [`Record::get`] hands out a reference to this value for any attribute
/// that has never been assigned.
pub static UNSET: Slot = Slot::Unset;

/// A concrete attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Integer value.
    Int(i64),
    /// String value.
    Str(String),
    /// Boolean value.
    Bool(bool),
    /// Date/time value, UTC.
    Date(DateTime<Utc>),
    /// Ordered list of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns the integer, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the boolean, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the date/time, if this is one.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Date(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }
}

/// Formats the value in its wire form: booleans as `1`/`0`, dates as epoch
/// seconds, lists comma separated.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{}", v),
            Value::Str(v) => f.write_str(v),
            Value::Bool(true) => f.write_str("1"),
            Value::Bool(false) => f.write_str("0"),
            Value::Date(v) => write!(f, "{}", v.timestamp()),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
        }
    }
}

/// One attribute slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Slot {
    /// Never assigned.
    #[default]
    Unset,
    /// Explicitly assigned "no value".
    Null,
    /// Holds a value.
    Set(Value),
}

impl Slot {
    /// Returns true for the unset sentinel.
    pub fn is_unset(&self) -> bool {
        matches!(self, Slot::Unset)
    }

    /// Returns true for an explicit null.
    pub fn is_null(&self) -> bool {
        matches!(self, Slot::Null)
    }

    /// Returns true if the slot holds a value.
    pub fn is_set(&self) -> bool {
        matches!(self, Slot::Set(_))
    }

    /// Returns the held value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Slot::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the held integer, if any.
    pub fn as_int(&self) -> Option<i64> {
        self.value().and_then(Value::as_int)
    }

    /// Returns the held string, if any.
    pub fn as_str(&self) -> Option<&str> {
        self.value().and_then(Value::as_str)
    }

    /// Returns the held boolean, if any.
    pub fn as_bool(&self) -> Option<bool> {
        self.value().and_then(Value::as_bool)
    }

    /// Returns the held date/time, if any.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        self.value().and_then(Value::as_date)
    }

    /// Returns the held list, if any.
    pub fn as_list(&self) -> Option<&[Value]> {
        self.value().and_then(Value::as_list)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Unset => f.write_str("<unset>"),
            Slot::Null => f.write_str("null"),
            Slot::Set(v) => write!(f, "{}", v),
        }
    }
}

impl Serialize for Slot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Slot::Set(v) => v.serialize(serializer),
            Slot::Unset | Slot::Null => serializer.serialize_none(),
        }
    }
}

macro_rules! impl_value_conversions {
    ($($ty:ty => |$v:ident| $make:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $make
                }
            }

            impl From<$ty> for Slot {
                fn from(v: $ty) -> Self {
                    Slot::Set(Value::from(v))
                }
            }

            impl From<Option<$ty>> for Slot {
                fn from(v: Option<$ty>) -> Self {
                    v.map_or(Slot::Null, Slot::from)
                }
            }
        )*
    };
}

impl_value_conversions! {
    i64 => |v| Value::Int(v),
    i32 => |v| Value::Int(i64::from(v)),
    u32 => |v| Value::Int(i64::from(v)),
    bool => |v| Value::Bool(v),
    String => |v| Value::Str(v),
    &str => |v| Value::Str(v.to_string()),
    DateTime<Utc> => |v| Value::Date(v),
    Vec<i64> => |v| Value::List(v.into_iter().map(Value::Int).collect()),
    Vec<String> => |v| Value::List(v.into_iter().map(Value::Str).collect()),
}

impl From<Value> for Slot {
    fn from(v: Value) -> Self {
        Slot::Set(v)
    }
}

impl From<Option<Value>> for Slot {
    fn from(v: Option<Value>) -> Self {
        v.map_or(Slot::Null, Slot::Set)
    }
}

/// Tag marking an attribute read from the entity node's own text.
pub const TEXT_TAG: &str = "#text";

/// Scalar wire types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// Decimal integer text.
    Int,
    /// Verbatim text.
    Str,
    /// `1` / `0`.
    Bool,
    /// Epoch seconds.
    Date,
}

/// How an attribute is represented in response documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    /// A single scalar element (or XML attribute).
    One(Scalar),
    /// A container element holding one `item` element per value. When `key`
    /// is given, each value is read from that child of the item element.
    List {
        /// Tag of each item element.
        item: &'static str,
        /// Type of each value.
        of: Scalar,
        /// Child of the item element holding the value.
        key: Option<&'static str>,
    },
}

/// Declaration of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Attribute name, also the outbound parameter name.
    pub name: &'static str,
    /// Tag (or XML attribute name) read during hydration.
    pub tag: &'static str,
    /// Wire representation.
    pub wire: WireType,
    /// Whether hydration populates this attribute.
    pub observed: bool,
}

impl FieldDef {
    const fn scalar(name: &'static str, of: Scalar) -> Self {
        Self {
            name,
            tag: name,
            wire: WireType::One(of),
            observed: true,
        }
    }

    /// Integer attribute.
    pub const fn int(name: &'static str) -> Self {
        Self::scalar(name, Scalar::Int)
    }

    /// String attribute.
    pub const fn string(name: &'static str) -> Self {
        Self::scalar(name, Scalar::Str)
    }

    /// Boolean attribute.
    pub const fn boolean(name: &'static str) -> Self {
        Self::scalar(name, Scalar::Bool)
    }

    /// Date/time attribute.
    pub const fn date(name: &'static str) -> Self {
        Self::scalar(name, Scalar::Date)
    }

    /// List attribute whose container element is named after the attribute.
    pub const fn list(name: &'static str, item: &'static str, of: Scalar) -> Self {
        Self {
            name,
            tag: name,
            wire: WireType::List {
                item,
                of,
                key: None,
            },
            observed: true,
        }
    }

    /// Reads the attribute from a differently named tag.
    pub const fn tag(self, tag: &'static str) -> Self {
        Self { tag, ..self }
    }

    /// Reads the attribute from the entity node's own text content.
    pub const fn text(self) -> Self {
        Self {
            tag: TEXT_TAG,
            ..self
        }
    }

    /// For list attributes, reads each value from the named child of the item.
    pub const fn keyed(self, key: &'static str) -> Self {
        let wire = match self.wire {
            WireType::List { item, of, .. } => WireType::List {
                item,
                of,
                key: Some(key),
            },
            other => other,
        };
        Self { wire, ..self }
    }

    /// Marks the attribute as request-only: hydration never touches it.
    pub const fn unobserved(self) -> Self {
        Self {
            observed: false,
            ..self
        }
    }
}

/// The parent identifier of a child entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent {
    /// Attribute holding the parent identifier.
    pub field: &'static str,
    /// Whether the parent identifier is part of the item path.
    pub in_path: bool,
}

/// Extra create-time validation run after the required-field check.
pub type Validator = fn(&Record) -> Result<(), KayakoError>;

/// Immutable shape of one entity type.
pub struct Schema {
    /// Entity type name used in messages and display.
    pub entity: &'static str,
    /// Endpoint path prefix, e.g. `/News/Category`.
    pub controller: &'static str,
    /// Tag of one entity node in responses.
    pub tag: &'static str,
    /// Path segment between the controller and list scope, e.g. `ListAll`.
    pub list_action: Option<&'static str>,
    /// Identifying attribute.
    pub identifier: &'static str,
    /// Parent identifier for child entities.
    pub parent: Option<Parent>,
    /// Attribute shown by `Display`.
    pub label: &'static str,
    /// Registered attributes, in order.
    pub fields: &'static [FieldDef],
    /// Attributes sent on create.
    pub add: &'static [&'static str],
    /// Attributes required on create.
    pub add_required: &'static [&'static str],
    /// Attributes sent on update.
    pub save: &'static [&'static str],
    /// Attributes required on update.
    pub save_required: &'static [&'static str],
    /// Extra create-time validation.
    pub validate_add: Option<Validator>,
}

impl Schema {
    /// Position of the named attribute in the registry.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Declaration of the named attribute.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns true if the attribute is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns true if the type can be created remotely.
    pub fn supports_add(&self) -> bool {
        !self.add.is_empty()
    }

    /// Returns true if the type can be updated remotely.
    pub fn supports_save(&self) -> bool {
        !self.save.is_empty()
    }
}

/// Per-instance attribute storage for one entity.
#[derive(Clone)]
pub struct Record {
    schema: &'static Schema,
    slots: Vec<Slot>,
}

impl Record {
    /// Creates a record with every slot unset.
    pub fn new(schema: &'static Schema) -> Self {
        Self {
            schema,
            slots: vec![Slot::Unset; schema.fields.len()],
        }
    }

    /// Creates a record and assigns the given values.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::Configuration` if any name is not registered.
    pub fn with_values<I, K, V>(schema: &'static Schema, values: I) -> Result<Self, KayakoError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Slot>,
    {
        let mut record = Self::new(schema);
        record.update(values)?;
        Ok(record)
    }

    /// The schema this record was built for.
    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Returns the named slot, or [`UNSET`] if it was never assigned.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::Configuration` for an unregistered name.
    pub fn get(&self, name: &str) -> Result<&Slot, KayakoError> {
        let index = self.index(name)?;
        match &self.slots[index] {
            Slot::Unset => Ok(&UNSET),
            slot => Ok(slot),
        }
    }

    /// Assigns the named slot.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::Configuration` for an unregistered name.
    pub fn set(&mut self, name: &str, value: impl Into<Slot>) -> Result<(), KayakoError> {
        let index = self.index(name)?;
        self.slots[index] = value.into();
        Ok(())
    }

    /// Assigns every given value.
    ///
    /// All names are checked before anything is assigned, so a failed update
    /// leaves the record untouched.
    pub fn update<I, K, V>(&mut self, values: I) -> Result<(), KayakoError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Slot>,
    {
        let mut staged = Vec::new();
        for (name, value) in values {
            staged.push((self.index(name.as_ref())?, value.into()));
        }
        for (index, slot) in staged {
            self.slots[index] = slot;
        }
        Ok(())
    }

    /// Returns the null or set slots among `names`, omitting unset ones.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::Configuration` if any name is not registered.
    pub fn select(&self, names: &[&str]) -> Result<BTreeMap<&'static str, Slot>, KayakoError> {
        let mut selected = BTreeMap::new();
        for name in names {
            let index = self.index(name)?;
            let slot = &self.slots[index];
            if !slot.is_unset() {
                selected.insert(self.schema.fields[index].name, slot.clone());
            }
        }
        Ok(selected)
    }

    /// Every slot that is not unset, in registry order.
    pub fn set_values(&self) -> Vec<(&'static str, &Slot)> {
        self.schema
            .fields
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| !slot.is_unset())
            .map(|(field, slot)| (field.name, slot))
            .collect()
    }

    fn index(&self, name: &str) -> Result<usize, KayakoError> {
        self.schema
            .position(name)
            .ok_or_else(|| KayakoError::unknown_attribute(self.schema.entity, name))
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.schema.entity == other.schema.entity && self.slots == other.slots
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, slot) in self.set_values() {
            map.entry(&name, slot);
        }
        map.finish()
    }
}

/// Serializes the set and null slots as a map.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let values = self.set_values();
        let mut map = serializer.serialize_map(Some(values.len()))?;
        for (name, slot) in values {
            map.serialize_entry(name, slot)?;
        }
        map.end()
    }
}
