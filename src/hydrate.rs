//! Response hydration.
//!
//! Copies the observable attributes present in a response node into a record,
//! coercing each text value to the attribute's declared wire type. Attributes
//! absent from the node keep their current value.

use chrono::DateTime;

use crate::error::KayakoError;
use crate::registry::{FieldDef, Record, Scalar, Slot, Value, WireType, TEXT_TAG};
use crate::xml::XmlNode;

/// Returns a copy of `record` updated from `node`.
///
/// A scalar attribute is read from the child element named by its tag, or
/// from an XML attribute of the same name when no such child exists. A list
/// attribute is replaced by the values of its container's item elements.
///
/// # Errors
///
/// Returns `KayakoError::ResponseFormat` if any present value cannot be
/// coerced. `record` itself is never modified.
pub fn hydrate<N: XmlNode>(record: &Record, node: &N) -> Result<Record, KayakoError> {
    let mut hydrated = record.clone();
    for field in record.schema().fields.iter().filter(|f| f.observed) {
        if let Some(slot) = read_field(field, node)? {
            hydrated.set(field.name, slot)?;
        }
    }
    Ok(hydrated)
}

/// Finds the entity node in a response: the root itself when its tag
/// matches, otherwise the root's first child with that tag.
pub fn locate<'a, N: XmlNode>(root: &'a N, tag: &str) -> Option<&'a N> {
    if root.tag() == tag {
        Some(root)
    } else {
        root.child(tag)
    }
}

fn read_field<N: XmlNode>(field: &FieldDef, node: &N) -> Result<Option<Slot>, KayakoError> {
    match field.wire {
        WireType::One(scalar) => {
            let raw = if field.tag == TEXT_TAG {
                match node.text() {
                    Some(raw) => raw,
                    None => return Ok(None),
                }
            } else {
                match node.child(field.tag) {
                    Some(child) => child.text().unwrap_or(""),
                    None => match node.attribute(field.tag) {
                        Some(raw) => raw,
                        None => return Ok(None),
                    },
                }
            };
            coerce(field.name, scalar, raw).map(Some)
        }
        WireType::List { item, of, key } => {
            let Some(container) = node.child(field.tag) else {
                return Ok(None);
            };
            let mut values = Vec::new();
            for element in container.children(item) {
                let raw = match key {
                    Some(key) => element.child(key).and_then(|c| c.text()),
                    None => element.text(),
                };
                if let Slot::Set(value) = coerce(field.name, of, raw.unwrap_or(""))? {
                    values.push(value);
                }
            }
            Ok(Some(Slot::Set(Value::List(values))))
        }
    }
}

fn coerce(name: &str, scalar: Scalar, raw: &str) -> Result<Slot, KayakoError> {
    match scalar {
        Scalar::Str => Ok(Slot::from(raw)),
        Scalar::Int => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                return Ok(Slot::Null);
            }
            trimmed
                .parse::<i64>()
                .map(Slot::from)
                .map_err(|e| KayakoError::response_format(name, raw, e.to_string()))
        }
        Scalar::Bool => match raw.trim() {
            "1" => Ok(Slot::from(true)),
            "0" => Ok(Slot::from(false)),
            "" => Ok(Slot::Null),
            _ => Err(KayakoError::response_format(name, raw, "expected 1 or 0")),
        },
        Scalar::Date => {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed == "0" {
                return Ok(Slot::Null);
            }
            let seconds = trimmed
                .parse::<i64>()
                .map_err(|e| KayakoError::response_format(name, raw, e.to_string()))?;
            DateTime::from_timestamp(seconds, 0)
                .map(Slot::from)
                .ok_or_else(|| KayakoError::response_format(name, raw, "timestamp out of range"))
        }
    }
}
