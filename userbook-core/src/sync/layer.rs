//! The sync layer state object.

use std::collections::HashSet;

use tokio::sync::{mpsc, watch};

use super::error::SyncError;
use super::form::{Draft, Field, Form};
use super::notice::{Notice, NoticeKind, NoticeReceiver};
use super::store::RecordStore;
use crate::firestore::{record_fields, Document, StoreError};
use crate::models::Record;

/// Asks the user whether a record may be deleted.
pub trait Confirm {
    fn confirm(&mut self, record: &Record) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Record) -> bool,
{
    fn confirm(&mut self, record: &Record) -> bool {
        self(record)
    }
}

/// Holds the busy flag up for as long as it lives.
struct BusyGuard<'a> {
    busy: &'a watch::Sender<bool>,
}

impl<'a> BusyGuard<'a> {
    fn raise(busy: &'a watch::Sender<bool>) -> Self {
        busy.send_replace(true);
        Self { busy }
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.busy.send_replace(false);
    }
}

/// Canonical local state for one collection plus the operations that keep it
/// in step with the remote store.
///
/// Operations take `&mut self`, so calls on one layer never overlap. A failed
/// remote call never mutates the collection.
#[derive(Debug)]
pub struct SyncLayer<S> {
    store: S,
    records: Vec<Record>,
    form: Form,
    editing: Option<String>,
    busy: watch::Sender<bool>,
    notices: mpsc::UnboundedSender<Notice>,
}

impl<S> SyncLayer<S> {
    /// Creates an empty layer and the receiver for its notices.
    pub fn new(store: S) -> (Self, NoticeReceiver) {
        let (notices, receiver) = mpsc::unbounded_channel();
        let (busy, _) = watch::channel(false);
        let layer = Self {
            store,
            records: Vec::new(),
            form: Form::default(),
            editing: None,
            busy,
            notices,
        };
        (layer, receiver)
    }

    /// Current record collection, in display order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Current input fields.
    pub fn form(&self) -> &Form {
        &self.form
    }

    /// Id of the record being edited, if any.
    pub fn edit_selection(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_busy(&self) -> bool {
        *self.busy.borrow()
    }

    /// Subscribes to busy flag changes.
    pub fn busy_watch(&self) -> watch::Receiver<bool> {
        self.busy.subscribe()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Sets one input field.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Copies `record` into the inputs and makes it the edit target,
    /// replacing any previous selection.
    pub fn select_for_edit(&mut self, record: &Record) {
        tracing::debug!("Editing user {}", record.id);
        self.form = Form::from(record);
        self.editing = Some(record.id.clone());
    }

    /// Clears the inputs and the edit target.
    pub fn reset(&mut self) {
        self.form.clear();
        self.editing = None;
    }

    fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        // The presentation layer may have dropped its receiver.
        let _ = self.notices.send(Notice::new(kind, message));
    }

    fn reject(&self, err: SyncError) -> SyncError {
        tracing::debug!("Rejected input: {}", err);
        self.notify(NoticeKind::Validation, err.to_string());
        err
    }

    fn remote_failure(&self, action: &str, err: StoreError) -> SyncError {
        tracing::error!("{}: {}", action, err);
        self.notify(NoticeKind::Error, format!("{}: {}", action, err));
        SyncError::Remote(err)
    }
}

impl<S: RecordStore> SyncLayer<S> {
    /// Replaces the collection with the remote listing, in store order.
    ///
    /// On failure the previous collection is kept and the error is logged;
    /// no notice is published.
    pub async fn fetch_all(&mut self) -> Result<&[Record], SyncError> {
        let fetched = {
            let _busy = BusyGuard::raise(&self.busy);
            self.load().await
        };

        match fetched {
            Ok(records) => {
                tracing::info!("Loaded {} user(s)", records.len());
                self.records = records;
                Ok(self.records.as_slice())
            }
            Err(e) => {
                tracing::error!("Failed to fetch users: {}", e);
                Err(SyncError::Remote(e))
            }
        }
    }

    async fn load(&self) -> Result<Vec<Record>, StoreError> {
        let documents = self.store.list().await?;

        let mut seen = HashSet::with_capacity(documents.len());
        let mut records = Vec::with_capacity(documents.len());
        for doc in &documents {
            let record = doc.to_record()?;
            if !seen.insert(record.id.clone()) {
                tracing::warn!("Skipping duplicate user {}", record.id);
                continue;
            }
            records.push(record);
        }
        Ok(records)
    }

    /// Creates a record remotely and appends it to the collection.
    pub async fn create(
        &mut self,
        name: &str,
        email: &str,
        age: &str,
    ) -> Result<Record, SyncError> {
        if let Some(id) = &self.editing {
            return Err(self.reject(SyncError::EditInProgress(id.clone())));
        }
        let draft = Draft::parse(name, email, age).map_err(|e| self.reject(e))?;

        let fields = record_fields(&draft.name, &draft.email, draft.age);
        let created = {
            let _busy = BusyGuard::raise(&self.busy);
            self.store.create(&fields).await
        };

        let id = match created.and_then(|doc: Document| Ok(doc.id()?.to_string())) {
            Ok(id) => id,
            Err(e) => return Err(self.remote_failure("Could not add user", e)),
        };

        let record = draft.into_record(id);
        tracing::info!("Created user {}", record.id);
        self.records.push(record.clone());
        self.notify(
            NoticeKind::Info,
            format!("User {} was added.", record.name),
        );
        Ok(record)
    }

    /// Patches the record currently selected for editing and replaces it in
    /// place. The edit selection survives a failed call so it can be retried.
    pub async fn update(
        &mut self,
        id: &str,
        name: &str,
        email: &str,
        age: &str,
    ) -> Result<Record, SyncError> {
        if self.editing.as_deref() != Some(id) {
            return Err(self.reject(SyncError::NotEditing(id.to_string())));
        }
        let draft = Draft::parse(name, email, age).map_err(|e| self.reject(e))?;

        let fields = record_fields(&draft.name, &draft.email, draft.age);
        let patched = {
            let _busy = BusyGuard::raise(&self.busy);
            self.store.patch(id, &fields).await
        };
        if let Err(e) = patched {
            return Err(self.remote_failure("Could not update user", e));
        }

        let record = draft.into_record(id);
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(existing) => *existing = record.clone(),
            None => {
                tracing::warn!("User {} was not in the local list; appending", id);
                self.records.push(record.clone());
            }
        }
        tracing::info!("Updated user {}", id);

        self.reset();
        self.notify(
            NoticeKind::Info,
            format!("User {} was updated.", record.name),
        );
        Ok(record)
    }

    /// Deletes a record after `confirm` approves it.
    ///
    /// Returns `Ok(false)` without touching the store when confirmation is
    /// declined.
    pub async fn delete(&mut self, id: &str, mut confirm: impl Confirm) -> Result<bool, SyncError> {
        let Some(record) = self.find(id) else {
            return Err(self.reject(SyncError::NotFound(id.to_string())));
        };
        if !confirm.confirm(record) {
            tracing::debug!("Delete of user {} declined", id);
            return Ok(false);
        }
        let name = record.name.clone();

        let deleted = {
            let _busy = BusyGuard::raise(&self.busy);
            self.store.delete(id).await
        };
        if let Err(e) = deleted {
            return Err(self.remote_failure("Could not delete user", e));
        }

        self.records.retain(|r| r.id != id);
        if self.editing.as_deref() == Some(id) {
            self.reset();
        }
        tracing::info!("Deleted user {}", id);
        self.notify(NoticeKind::Info, format!("User {} was deleted.", name));
        Ok(true)
    }

    /// Submits the inputs: updates the edit target when editing, creates a
    /// new record otherwise.
    pub async fn submit(&mut self) -> Result<Record, SyncError> {
        let Form { name, email, age } = self.form.clone();
        match self.editing.clone() {
            Some(id) => self.update(&id, &name, &email, &age).await,
            None => self.create(&name, &email, &age).await,
        }
    }
}
