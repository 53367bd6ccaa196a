//! Entity lifecycle: create, update, delete and fetch.
//!
//! Every operation validates the instance against its schema first and only
//! then performs a single exchange through the caller's [`Transport`].
//! Response hydration works on a copy of the record, so an instance is left
//! exactly as it was whenever an operation fails.
//!
//! A deleted instance keeps its identifier. Deleting it again issues another
//! exchange, and calling [`Lifecycle::add`] on it fails with
//! `DuplicateCreate`.

use std::collections::BTreeMap;
use std::fmt;

use crate::entity::Entity;
use crate::error::KayakoError;
use crate::hydrate::{hydrate, locate};
use crate::registry::{Record, Schema, Slot, Value};
use crate::transport::{to_parameters, Method, ParamValue, Parameters, Transport};
use crate::xml::{Element, XmlNode};

/// Address of one remote entity: its identifier and, for child entities, the
/// identifier of its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    parent: Option<Value>,
    id: Value,
}

impl Key {
    /// Addresses a top-level entity.
    pub fn new(id: impl Into<Value>) -> Self {
        Self {
            parent: None,
            id: id.into(),
        }
    }

    /// Addresses a child entity under `parent`.
    pub fn within(parent: impl Into<Value>, id: impl Into<Value>) -> Self {
        Self {
            parent: Some(parent.into()),
            id: id.into(),
        }
    }

    /// The entity identifier.
    pub fn id(&self) -> &Value {
        &self.id
    }

    /// The parent identifier, if any.
    pub fn parent(&self) -> Option<&Value> {
        self.parent.as_ref()
    }
}

impl From<i64> for Key {
    fn from(id: i64) -> Self {
        Key::new(id)
    }
}

impl From<i32> for Key {
    fn from(id: i32) -> Self {
        Key::new(id)
    }
}

impl From<(i64, i64)> for Key {
    fn from((parent, id): (i64, i64)) -> Self {
        Key::within(parent, id)
    }
}

/// Narrows a collection fetch: extra path segments after the list action,
/// query parameters, and the parent the listed entities belong to.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    segments: Vec<String>,
    parameters: Parameters,
    parent: Option<Value>,
}

impl Scope {
    /// An unscoped listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lists the children of `parent`. The parent identifier becomes the
    /// first path segment and is recorded on every fetched entity that does
    /// not report it itself.
    pub fn under(parent: impl Into<Value>) -> Self {
        let parent = parent.into();
        Self {
            segments: vec![parent.to_string()],
            parent: Some(parent),
            ..Self::default()
        }
    }

    /// Appends a path segment.
    pub fn segment(mut self, segment: impl fmt::Display) -> Self {
        self.segments.push(segment.to_string());
        self
    }

    /// Appends `count` and `start` segments for paged listings.
    pub fn page(self, count: u32, start: u32) -> Self {
        self.segment(count).segment(start)
    }

    /// Adds a query parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Extra path segments, in order.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Query parameters.
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }
}

/// Remote operations available on every entity type.
#[allow(async_fn_in_trait)]
pub trait Lifecycle: Entity {
    /// Creates the entity remotely and hydrates this instance from the
    /// response.
    ///
    /// # Errors
    ///
    /// - `DuplicateCreate` if the identifier is already assigned
    /// - `MissingRequiredField` if a create-required attribute is unset
    /// - `Configuration` if the type cannot be created
    /// - transport and response errors from the exchange
    async fn add<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<(), KayakoError> {
        let schema = Self::SCHEMA;
        if !schema.supports_add() {
            return Err(KayakoError::configuration(format!(
                "{} cannot be created through the API",
                schema.entity
            )));
        }

        let id = self.id();
        if !id.is_unset() {
            return Err(KayakoError::DuplicateCreate {
                entity: schema.entity,
                id: id.to_string(),
            });
        }

        let selection = self.record().select(schema.add)?;
        check_required(schema, "add", schema.add_required, &selection)?;
        if let Some(validate) = schema.validate_add {
            validate(self.record())?;
        }

        let parameters = to_parameters(&selection);
        tracing::debug!(
            entity = schema.entity,
            path = schema.controller,
            fields = ?parameters.keys().collect::<Vec<_>>(),
            "Creating entity"
        );

        let root = transport
            .exchange(schema.controller, Method::POST, &parameters)
            .await?;
        let hydrated = hydrate_response(self.record(), &root)?;
        *self.record_mut() = hydrated;
        Ok(())
    }

    /// Sends the update-eligible attributes and hydrates this instance from
    /// the response.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the identifier is not set or the type cannot be
    ///   updated
    /// - `MissingRequiredField` if an update-required attribute is unset
    /// - transport and response errors from the exchange
    async fn save<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<(), KayakoError> {
        let schema = Self::SCHEMA;
        if !schema.supports_save() {
            return Err(KayakoError::configuration(format!(
                "{} cannot be updated through the API",
                schema.entity
            )));
        }
        if self.id().value().is_none() {
            return Err(KayakoError::configuration(format!(
                "{} has no {}; use add to create it first",
                schema.entity, schema.identifier
            )));
        }

        let selection = self.record().select(schema.save)?;
        check_required(schema, "save", schema.save_required, &selection)?;
        let key = record_key(self.record(), "save")?;
        let path = item_path(schema, &key, "save")?;

        let parameters = to_parameters(&selection);
        tracing::debug!(
            entity = schema.entity,
            path = %path,
            fields = ?parameters.keys().collect::<Vec<_>>(),
            "Updating entity"
        );

        let root = transport.exchange(&path, Method::PUT, &parameters).await?;
        let hydrated = hydrate_response(self.record(), &root)?;
        *self.record_mut() = hydrated;
        Ok(())
    }

    /// Deletes the entity remotely. The instance itself is left unchanged.
    ///
    /// # Errors
    ///
    /// - `MissingIdentifier` if the identifier, or a parent identifier that
    ///   is part of the item path, is not set
    /// - transport errors from the exchange
    async fn delete<T: Transport + ?Sized>(&self, transport: &T) -> Result<(), KayakoError> {
        let schema = Self::SCHEMA;
        let key = record_key(self.record(), "delete")?;
        let path = item_path(schema, &key, "delete")?;

        tracing::debug!(entity = schema.entity, path = %path, "Deleting entity");
        transport
            .exchange(&path, Method::DELETE, &Parameters::new())
            .await?;
        Ok(())
    }

    /// Fetches one entity. Returns `Ok(None)` when the server reports that it
    /// does not exist.
    async fn get<T: Transport + ?Sized>(
        transport: &T,
        key: impl Into<Key>,
    ) -> Result<Option<Self>, KayakoError> {
        let schema = Self::SCHEMA;
        let key = key.into();
        let path = item_path(schema, &key, "get")?;

        tracing::debug!(entity = schema.entity, path = %path, "Fetching entity");
        let root = match transport.exchange(&path, Method::GET, &Parameters::new()).await {
            Ok(root) => root,
            Err(e) if e.is_not_found() => {
                tracing::debug!(entity = schema.entity, path = %path, "Entity not found");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let Some(node) = locate(&root, schema.tag) else {
            tracing::debug!(
                entity = schema.entity,
                root = root.tag(),
                "Response holds no entity node"
            );
            return Ok(None);
        };

        let mut record = hydrate(&Record::new(schema), node)?;
        adopt_parent(&mut record, key.parent())?;
        Ok(Some(Self::from_record(record)))
    }

    /// Fetches every entity in `scope`, in response order.
    async fn get_all<T: Transport + ?Sized>(
        transport: &T,
        scope: Scope,
    ) -> Result<Vec<Self>, KayakoError> {
        let schema = Self::SCHEMA;
        let path = collection_path(schema, &scope);

        tracing::debug!(entity = schema.entity, path = %path, "Listing entities");
        let root = transport
            .exchange(&path, Method::GET, scope.parameters())
            .await?;

        let blank = Record::new(schema);
        let entities = root
            .children(schema.tag)
            .map(|node| -> Result<Self, KayakoError> {
                let mut record = hydrate(&blank, node)?;
                adopt_parent(&mut record, scope.parent.as_ref())?;
                Ok(Self::from_record(record))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(entity = schema.entity, count = entities.len(), "Listed entities");
        Ok(entities)
    }
}

impl<E: Entity> Lifecycle for E {}

/// Fails with `MissingRequiredField` naming the first required attribute
/// absent from `selection`.
fn check_required(
    schema: &Schema,
    operation: &'static str,
    required: &[&str],
    selection: &BTreeMap<&'static str, Slot>,
) -> Result<(), KayakoError> {
    match required.iter().find(|name| !selection.contains_key(**name)) {
        Some(missing) => Err(KayakoError::missing_required(
            schema.entity,
            operation,
            *missing,
        )),
        None => Ok(()),
    }
}

/// Builds the key of a record from its identifier attributes.
fn record_key(record: &Record, operation: &'static str) -> Result<Key, KayakoError> {
    let schema = record.schema();
    let id = record
        .get(schema.identifier)?
        .value()
        .cloned()
        .ok_or_else(|| KayakoError::missing_identifier(schema.entity, operation, schema.identifier))?;

    let parent = match schema.parent {
        Some(parent) => record.get(parent.field)?.value().cloned(),
        None => None,
    };
    Ok(Key { parent, id })
}

/// `{controller}/[{parent}/]{id}/`
fn item_path(schema: &Schema, key: &Key, operation: &'static str) -> Result<String, KayakoError> {
    let mut path = schema.controller.to_string();
    if let Some(parent) = schema.parent.filter(|p| p.in_path) {
        let value = key
            .parent()
            .ok_or_else(|| KayakoError::missing_identifier(schema.entity, operation, parent.field))?;
        path.push('/');
        path.push_str(&value.to_string());
    }
    path.push('/');
    path.push_str(&key.id().to_string());
    path.push('/');
    Ok(path)
}

/// `{controller}[/{list action}][/{segment}]*`
fn collection_path(schema: &Schema, scope: &Scope) -> String {
    let mut path = schema.controller.to_string();
    if let Some(action) = schema.list_action {
        path.push('/');
        path.push_str(action);
    }
    for segment in scope.segments() {
        path.push('/');
        path.push_str(segment);
    }
    path
}

fn hydrate_response(record: &Record, root: &Element) -> Result<Record, KayakoError> {
    let schema = record.schema();
    let node = locate(root, schema.tag).ok_or_else(|| {
        KayakoError::response_format(
            schema.tag,
            root.tag(),
            format!("response has no <{}> element", schema.tag),
        )
    })?;
    hydrate(record, node)
}

/// Records the parent identifier a child was fetched under, unless the
/// response already supplied one.
fn adopt_parent(record: &mut Record, parent: Option<&Value>) -> Result<(), KayakoError> {
    let (Some(field), Some(value)) = (record.schema().parent.map(|p| p.field), parent) else {
        return Ok(());
    };
    if record.get(field)?.is_unset() {
        record.set(field, value.clone())?;
    }
    Ok(())
}
