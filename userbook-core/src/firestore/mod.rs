//! Firestore REST document store.
//!
//! Records live in a single Firestore collection and are exchanged as REST
//! documents:
//!
//! ```json
//! {
//!   "name": "projects/p/databases/(default)/documents/Users/<id>",
//!   "fields": {
//!     "name":  { "stringValue": "Ann" },
//!     "email": { "stringValue": "a@x.com" },
//!     "age":   { "integerValue": "30" }
//!   }
//! }
//! ```
//!
//! The final `/` segment of `name` is the record id.

mod client;
mod document;
mod error;

pub use client::FirestoreClient;
pub use document::{document_id, record_fields, Document, ListDocumentsResponse, Value};
pub use error::{MappingError, StoreError};
