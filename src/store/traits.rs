//! Core trait for document store backends.

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::DocumentId;
use crate::store::{DocumentStream, Filter, FindOptions, RawDocument};

/// A document database a repository can be backed by.
///
/// Collections are created lazily: writing to or reading from an unknown
/// collection behaves as if it existed and was empty. Every method is a single
/// round trip; the trait adds no batching, retry or coordination between
/// concurrent calls.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for diagnostics (`memory`, `postgres`).
    fn backend(&self) -> &'static str;

    /// Checks that the store is reachable.
    async fn ping(&self) -> Result<(), AppError>;

    /// Inserts documents, each of which must carry an `_id`.
    ///
    /// Fails with [`AppError::DuplicateId`] if an id already exists. Not
    /// atomic across documents.
    async fn insert(&self, collection: &str, documents: Vec<RawDocument>) -> Result<(), AppError>;

    /// Finds documents matching the filter.
    ///
    /// The returned stream yields documents on demand where the backend
    /// supports it.
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<DocumentStream<'_>, AppError>;

    /// Counts documents matching the filter.
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, AppError>;

    /// Replaces the document with the given id, returning how many were
    /// replaced (0 or 1). A missing id is a no-op.
    async fn replace(
        &self,
        collection: &str,
        id: &DocumentId,
        document: RawDocument,
    ) -> Result<u64, AppError>;

    /// Deletes all documents matching the filter, returning how many.
    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, AppError>;

    /// Creates the collection if it does not exist.
    async fn ensure_collection(&self, collection: &str) -> Result<(), AppError>;

    /// Names of existing collections, sorted.
    async fn list_collections(&self) -> Result<Vec<String>, AppError>;

    /// Drops the collection and all its documents.
    async fn drop_collection(&self, collection: &str) -> Result<(), AppError>;
}
