//! The exchange seam between entities and the network.
//!
//! Entities never talk HTTP directly. Every lifecycle operation hands a
//! path, a method and a parameter map to a [`Transport`] and receives the
//! parsed response document back. [`KayakoClient`](crate::client::KayakoClient)
//! is the production implementation; tests substitute recording doubles.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

pub use reqwest::Method;

use crate::error::KayakoError;
use crate::registry::{Slot, Value};
use crate::xml::Element;

/// One outbound parameter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// A single text value. Explicit nulls are sent as the empty string.
    Single(String),
    /// A multi-valued parameter, built from list attributes.
    Multi(Vec<String>),
}

impl ParamValue {
    /// Joins the parameter into one wire string, comma separated for lists.
    pub fn joined(&self) -> String {
        match self {
            ParamValue::Single(v) => v.clone(),
            ParamValue::Multi(values) => values.join(","),
        }
    }
}

impl From<&Slot> for ParamValue {
    fn from(slot: &Slot) -> Self {
        match slot {
            Slot::Set(Value::List(items)) => {
                ParamValue::Multi(items.iter().map(ToString::to_string).collect())
            }
            Slot::Set(value) => ParamValue::Single(value.to_string()),
            Slot::Null | Slot::Unset => ParamValue::Single(String::new()),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Single(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Single(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Single(v.to_string())
    }
}

/// Outbound parameters, keyed by attribute name.
pub type Parameters = BTreeMap<String, ParamValue>;

/// Converts a selection of slots into outbound parameters.
pub fn to_parameters(selection: &BTreeMap<&'static str, Slot>) -> Parameters {
    selection
        .iter()
        .map(|(name, slot)| ((*name).to_string(), ParamValue::from(slot)))
        .collect()
}

/// Performs one request/response exchange with the helpdesk.
///
/// Implementations report HTTP failures as [`KayakoError`] transport
/// variants; a missing resource must satisfy
/// [`KayakoError::is_not_found`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `parameters` to `path` with `method` and returns the parsed
    /// response document.
    async fn exchange(
        &self,
        path: &str,
        method: Method,
        parameters: &Parameters,
    ) -> Result<Element, KayakoError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn exchange(
        &self,
        path: &str,
        method: Method,
        parameters: &Parameters,
    ) -> Result<Element, KayakoError> {
        (**self).exchange(path, method, parameters).await
    }
}
