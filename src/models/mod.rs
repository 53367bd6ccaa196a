//! Helpdesk entity types.
//!
//! One module per helpdesk area. Every type is declared with
//! [`entity!`](crate::entity!) and gets its remote operations from
//! [`Lifecycle`](crate::lifecycle::Lifecycle).

mod custom_field;
mod department;
mod knowledgebase;
mod news;
mod tickets;
mod troubleshooter;

pub use custom_field::*;
pub use department::*;
pub use knowledgebase::*;
pub use news::*;
pub use tickets::*;
pub use troubleshooter::*;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::entity::{Attr, Entity};
use crate::error::KayakoError;
use crate::registry::{Record, Slot, Value};

/// Longest excerpt of undecodable contents quoted in an error.
const MAX_EXCERPT_LEN: usize = 40;

/// File attachments, whose contents travel base64 encoded.
pub trait AttachmentContents: Entity {
    /// The attribute holding the encoded contents.
    const PAYLOAD: Attr<Self>;

    /// Decodes the attachment contents. Returns `Ok(None)` when no contents
    /// are held.
    ///
    /// # Errors
    ///
    /// Returns `KayakoError::ResponseFormat` if the held text is not valid
    /// base64.
    fn contents(&self) -> Result<Option<Vec<u8>>, KayakoError> {
        let text = match self.attr(Self::PAYLOAD).as_str() {
            None | Some("") => return Ok(None),
            Some(text) => text,
        };
        BASE64.decode(text.trim()).map(Some).map_err(|e| {
            let excerpt: String = text.chars().take(MAX_EXCERPT_LEN).collect();
            KayakoError::response_format(Self::PAYLOAD.name(), excerpt, e.to_string())
        })
    }

    /// Encodes `bytes` into the contents attribute. Empty input stores an
    /// explicit null.
    fn set_contents(&mut self, bytes: &[u8]) -> &mut Self {
        let slot = if bytes.is_empty() {
            Slot::Null
        } else {
            Slot::from(BASE64.encode(bytes))
        };
        self.set(Self::PAYLOAD, slot)
    }
}

/// Add-time check that exactly one of two attributes was supplied.
fn exactly_one_of(
    record: &Record,
    first: &'static str,
    second: &'static str,
) -> Result<(), KayakoError> {
    let entity = record.schema().entity;
    match (!record.get(first)?.is_unset(), !record.get(second)?.is_unset()) {
        (true, false) | (false, true) => Ok(()),
        (true, true) => Err(KayakoError::ConflictingFields {
            entity,
            operation: "add",
            first,
            second,
        }),
        (false, false) => Err(KayakoError::missing_required(
            entity,
            "add",
            format!("{first} or {second}"),
        )),
    }
}

/// The identifier of `entity`, for operations that scope a listing by it.
fn identifier<E: Entity>(entity: &E, operation: &'static str) -> Result<Value, KayakoError> {
    entity
        .id()
        .value()
        .cloned()
        .ok_or_else(|| KayakoError::missing_identifier(E::SCHEMA.entity, operation, E::SCHEMA.identifier))
}
