//! Record sync layer.
//!
//! Keeps the local record collection consistent with a remote document
//! store. The presentation layer reads state through [`SyncLayer`]'s
//! accessors and changes it only through its operations:
//!
//! - `fetch_all`: replace the collection with the remote listing
//! - `create`: append a new record
//! - `select_for_edit` / `update`: edit a record in place
//! - `delete`: remove a record after confirmation
//!
//! Outcomes are published as [`Notice`]s on an unbounded channel, and the
//! busy flag is observable through a `watch` channel.

mod error;
mod form;
mod layer;
mod notice;
mod store;

pub use error::SyncError;
pub use form::{Draft, Field, Form};
pub use layer::{Confirm, SyncLayer};
pub use notice::{Notice, NoticeKind, NoticeReceiver};
pub use store::RecordStore;
