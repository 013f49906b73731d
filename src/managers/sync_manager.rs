//! Synchronization of bookmark edits against a path-oriented remote store.
//!
//! Implements the per-record session protocol: fetch the stored blob, keep
//! it verbatim, diff the edited record against the decoded original, then
//! issue at most one backend call — an in-place update, a rename (move with
//! content), a delete, or a create. Conflict on rename is reported
//! distinctly from generic failure so the UI can point at the URL field.
//!
//! The manager holds no durable state beyond the session values it hands
//! out. Callers serialize operations per address (one in-flight session per
//! record); distinct addresses may run concurrently. Nothing here retries,
//! times out, or cancels — completion is whatever the store reports.

use async_trait::async_trait;

use crate::services::addressing::address_of;
use crate::services::codec;
use crate::services::diff::{self, ChangeSet, Field};
use crate::types::bookmark::Bookmark;
use crate::types::errors::{BackendError, CodecError, SyncError};

/// Outcome of a create call: the file was written, or the path was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Outcome of a move call: the rename committed, or the target path is
/// already occupied. The occupied case is a distinguished signal, not a
/// generic error, and must stay that way through every layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    TargetExists,
}

/// The capability set a path-oriented backend provides. All operations are
/// asynchronous and single-attempt; retrying is the caller's decision. The
/// commit message carries the operation intent and the bookmark URL.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Reads the transport-encoded blob stored at `path`.
    async fn fetch(&self, path: &str) -> Result<String, BackendError>;

    /// Creates a new file at `path`.
    async fn create(&self, path: &str, blob: &str, message: &str)
        -> Result<CreateOutcome, BackendError>;

    /// Replaces the content of the existing file at `path`.
    async fn update(&self, path: &str, blob: &str, message: &str) -> Result<(), BackendError>;

    /// Removes the file at `path`.
    async fn delete(&self, path: &str, message: &str) -> Result<(), BackendError>;

    /// Renames `from` to `to` and replaces the content in the same commit.
    async fn move_with_content(&self, from: &str, to: &str, blob: &str, message: &str)
        -> Result<MoveOutcome, BackendError>;
}

/// State captured when an edit dialog opens: the address being edited, the
/// stored blob exactly as fetched (never mutated during the session), and
/// its decoded form.
#[derive(Debug, Clone)]
pub struct EditSession {
    pub address: String,
    pub original_blob: String,
    pub original: Bookmark,
}

/// How a save concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The dialog result equals the stored record; nothing was sent.
    Unchanged,
    /// The record was rewritten in place.
    Updated { address: String },
    /// The URL changed, so the record moved to a new address.
    Moved { from: String, to: String },
}

/// A deletion held for undo: the address, the bookmark URL for commit
/// messages, and the blob captured at the moment deletion was requested.
/// Undo re-creates exactly this blob, byte for byte.
#[derive(Debug, Clone)]
pub struct DeleteTicket {
    pub address: String,
    pub url: String,
    pub blob: String,
}

/// Drives one bookmark collection against a remote store. The store is an
/// explicit constructor argument; there is no global backend selection.
pub struct SyncManager<B: RemoteStore> {
    store: B,
    collection: String,
}

impl<B: RemoteStore> SyncManager<B> {
    pub fn new(store: B, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    fn repo_path(&self, address: &str) -> String {
        format!("{}/{}", self.collection, address)
    }

    /// Opens an edit session by fetching and decoding the stored record.
    pub async fn begin_edit(&self, address: &str) -> Result<EditSession, SyncError> {
        let blob = self.store.fetch(&self.repo_path(address)).await?;
        let original = codec::decode(&blob)?;
        Ok(EditSession {
            address: address.to_string(),
            original_blob: blob,
            original,
        })
    }

    /// Applies the result of an edit dialog.
    ///
    /// `locally_present` answers whether the caller already has a record
    /// materialized at a given address; it lets a rename fail fast without
    /// a network call. The remote conflict signal stays authoritative
    /// either way.
    pub async fn save_edit<F>(
        &self,
        session: &EditSession,
        edited: Bookmark,
        locally_present: F,
    ) -> Result<SaveOutcome, SyncError>
    where
        F: Fn(&str) -> bool,
    {
        let edited = edited.normalized();
        let changes = diff::diff_bookmarks(Some(&session.original), Some(&edited));
        if changes == ChangeSet::Inconsistent {
            return Err(SyncError::Inconsistent);
        }
        if changes.is_empty() {
            tracing::debug!(address = %session.address, "save: bookmark unchanged");
            return Ok(SaveOutcome::Unchanged);
        }
        let blob = codec::encode(&edited);
        let url = edited.url.clone().unwrap_or_default();
        if changes.contains(Field::Url) {
            let target = address_of(&url);
            // a URL edit that normalizes to the same address is a plain update
            if target != session.address {
                return self
                    .move_record(session, &url, &target, &blob, locally_present)
                    .await;
            }
        }
        self.store
            .update(
                &self.repo_path(&session.address),
                &blob,
                &format!("Update metadata of {} [gitmarks]", url),
            )
            .await?;
        tracing::debug!(address = %session.address, "save: updated in place");
        Ok(SaveOutcome::Updated {
            address: session.address.clone(),
        })
    }

    async fn move_record<F>(
        &self,
        session: &EditSession,
        url: &str,
        target: &str,
        blob: &str,
        locally_present: F,
    ) -> Result<SaveOutcome, SyncError>
    where
        F: Fn(&str) -> bool,
    {
        if locally_present(target) {
            tracing::debug!(from = %session.address, to = %target, "save: target address already materialized");
            return Err(SyncError::UrlExists);
        }
        let outcome = self
            .store
            .move_with_content(
                &self.repo_path(&session.address),
                &self.repo_path(target),
                blob,
                &format!("Change 'url' to {} [gitmarks]", url),
            )
            .await?;
        match outcome {
            MoveOutcome::Moved => {
                tracing::debug!(from = %session.address, to = %target, "save: moved");
                Ok(SaveOutcome::Moved {
                    from: session.address.clone(),
                    to: target.to_string(),
                })
            }
            MoveOutcome::TargetExists => Err(SyncError::UrlExists),
        }
    }

    /// Creates a brand-new bookmark at the address derived from its URL.
    /// Returns the address on success; an occupied address is the URL
    /// conflict, never a silent overwrite.
    pub async fn create_bookmark(&self, bookmark: Bookmark) -> Result<String, SyncError> {
        let bookmark = bookmark.normalized();
        let url = match &bookmark.url {
            Some(u) => u.clone(),
            None => {
                return Err(SyncError::Codec(CodecError::Malformed(
                    "bookmark has no url".to_string(),
                )))
            }
        };
        let address = address_of(&url);
        let blob = codec::encode(&bookmark);
        let outcome = self
            .store
            .create(
                &self.repo_path(&address),
                &blob,
                &format!("Add {} [gitmarks]", url),
            )
            .await?;
        match outcome {
            CreateOutcome::Created => Ok(address),
            CreateOutcome::AlreadyExists => Err(SyncError::UrlExists),
        }
    }

    /// Deletes a record, first capturing its stored blob so the deletion
    /// can be undone byte-for-byte.
    pub async fn delete_bookmark(&self, address: &str) -> Result<DeleteTicket, SyncError> {
        let path = self.repo_path(address);
        let blob = self.store.fetch(&path).await?;
        let record = codec::decode(&blob)?;
        let url = record.url.unwrap_or_default();
        self.store
            .delete(&path, &format!("Remove {} [gitmarks]", url))
            .await?;
        Ok(DeleteTicket {
            address: address.to_string(),
            url,
            blob,
        })
    }

    /// Re-creates a deleted record from its ticket. A failure here means
    /// the deletion effectively stands; nothing is re-attempted.
    pub async fn undo_delete(&self, ticket: &DeleteTicket) -> Result<(), SyncError> {
        let outcome = self
            .store
            .create(
                &self.repo_path(&ticket.address),
                &ticket.blob,
                &format!("Undo removal of {} [gitmarks]", ticket.url),
            )
            .await?;
        match outcome {
            CreateOutcome::Created => Ok(()),
            CreateOutcome::AlreadyExists => {
                tracing::warn!(address = %ticket.address, "undo: address reoccupied since deletion");
                Err(SyncError::UrlExists)
            }
        }
    }
}
