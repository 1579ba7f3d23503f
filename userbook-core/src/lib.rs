//! Userbook Core Library
//!
//! Record model, Firestore REST store and the record sync layer shared by
//! Userbook front ends.

pub mod firestore;
pub mod models;
pub mod sync;

pub use firestore::{Document, FirestoreClient, MappingError, StoreError, Value};
pub use models::Record;
pub use sync::{
    Confirm, Field, Form, Notice, NoticeKind, NoticeReceiver, RecordStore, SyncError, SyncLayer,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
