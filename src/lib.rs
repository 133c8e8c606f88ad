//! Data entry service for a GS1 resolver.
//!
//! Resolver documents are addressed by GS1 anchors such as
//! `/01/05392000229648` and stored under an underscore-delimited key.

pub mod anchor;
pub mod config;
pub mod documents;
pub mod envelope;
pub mod error;
pub mod server;
pub mod store;

pub use anchor::{to_external, to_internal};
pub use documents::{DocumentService, ID_FIELD};
pub use envelope::Envelope;
pub use error::DataEntryError;
pub use store::{Document, DocumentStore, MemoryStore, SqliteStore, StoreError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
