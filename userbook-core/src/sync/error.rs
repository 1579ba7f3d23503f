//! Sync layer error types.

use thiserror::Error;

use crate::firestore::StoreError;

/// Errors returned by sync layer operations.
///
/// Everything except `Remote` is detected before any remote call is made.
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Please fill in the {0} field.")]
    MissingField(&'static str),

    #[error("Age must be a whole number, got '{0}'.")]
    InvalidAge(String),

    #[error("User {0} is not selected for editing.")]
    NotEditing(String),

    #[error("Finish or reset the edit of user {0} before adding a new one.")]
    EditInProgress(String),

    #[error("User {0} not found.")]
    NotFound(String),

    #[error(transparent)]
    Remote(#[from] StoreError),
}

impl SyncError {
    /// Returns true for input problems caught before any remote call.
    pub fn is_validation(&self) -> bool {
        !matches!(self, SyncError::Remote(_))
    }
}
