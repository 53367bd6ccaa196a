//! # Kayako
//!
//! A typed client library for the Kayako helpdesk REST API.
//!
//! Helpdesk objects (tickets, knowledgebase articles, news items,
//! troubleshooter steps, departments, custom fields) are declared once as
//! entity types. Each type carries a registry of its attributes, which of
//! them may be sent when creating or updating, and which are required. The
//! library validates an instance against that registry before any request
//! is made, sends only what the caller actually assigned, and hydrates the
//! instance from the XML the server returns.
//!
//! ## Features
//!
//! - **Tri-state attributes**: unset, explicitly null, or set. Unset
//!   attributes are never sent; null ones are sent as empty values
//! - **Lifecycle operations**: `add`, `save`, `delete`, `get` and `get_all`
//!   on every entity type through [`Lifecycle`]
//! - **Early validation**: missing required fields, duplicate creates and
//!   missing identifiers fail before any network I/O
//! - **Signed requests**: every request carries a fresh salt and its
//!   HMAC-SHA256 signature
//! - **Error handling**: automatic retry for transient failures with
//!   exponential backoff
//! - **Security**: API and secret keys are never logged and are sanitized
//!   from error messages
//!
//! ## Architecture
//!
//! - [`config`] - Configuration loading from environment variables
//! - [`error`] - Error types with security-conscious message sanitization
//! - [`registry`] - Attribute schemas, values and tri-state slots
//! - [`entity`] - The typed entity facade and the [`entity!`] declaration macro
//! - [`hydrate`] - Response-to-record hydration and wire coercion
//! - [`lifecycle`] - Remote operations shared by every entity type
//! - [`transport`] - The exchange seam between entities and HTTP
//! - [`client`] - Signed HTTP transport for the Kayako REST API
//! - [`xml`] - Response document parsing
//! - [`models`] - The helpdesk entity types
//!
//! ## Configuration
//!
//! - `KAYAKO_API_URL`: REST endpoint, e.g. `https://support.example.com/api/index.php`
//! - `KAYAKO_API_KEY`: API key
//! - `KAYAKO_SECRET_KEY`: Secret key used to sign requests
//!
//! Optional:
//! - `KAYAKO_TIMEOUT_SECS`: Request timeout in seconds (default 30)
//! - `RUST_LOG`: Log level (e.g., `kayako=debug`)
//!
//! ## Example
//!
//! ```ignore
//! use kayako::{Config, Entity, KayakoClient, Lifecycle};
//! use kayako::models::Ticket;
//!
//! async fn example() -> Result<(), kayako::KayakoError> {
//!     let config = Config::from_env()?;
//!     let client = KayakoClient::new(&config)?;
//!
//!     let mut ticket = Ticket::new();
//!     ticket
//!         .set(Ticket::SUBJECT, "Printer on fire")
//!         .set(Ticket::FULLNAME, "Ann Example")
//!         .set(Ticket::EMAIL, "ann@example.com")
//!         .set(Ticket::CONTENTS, "Smoke everywhere")
//!         .set(Ticket::DEPARTMENTID, 1)
//!         .set(Ticket::TICKETSTATUSID, 1)
//!         .set(Ticket::TICKETPRIORITYID, 1)
//!         .set(Ticket::TICKETTYPEID, 1)
//!         .set(Ticket::USERID, 7);
//!     ticket.add(&client).await?;
//!     println!("created {ticket}");
//!
//!     if let Some(mut found) = Ticket::get(&client, 42).await? {
//!         found.set(Ticket::SUBJECT, "Printer no longer on fire");
//!         found.save(&client).await?;
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod hydrate;
pub mod lifecycle;
pub mod models;
pub mod registry;
pub mod transport;
pub mod xml;

pub use client::KayakoClient;
pub use config::Config;
pub use entity::{Attr, Entity};
pub use error::KayakoError;
pub use lifecycle::{Key, Lifecycle, Scope};
pub use registry::{Slot, Value, UNSET};
pub use transport::Transport;
