//! Generic repository over any document entity.

use std::fmt;

use async_stream::try_stream;
use futures::TryStreamExt;

use crate::context::DatabaseContext;
use crate::di::FromRef;
use crate::error::AppError;
use crate::models::{Document, DocumentId};
use crate::store::{Collection, EntityStream, Filter, FindOptions};

/// CRUD and query operations for entity type `T`, bound to one collection.
///
/// Every operation is a single `async fn`. The repository holds nothing but
/// its collection binding, so it is cheap to clone and safe to share; move a
/// clone into `tokio::spawn` to run an operation in the background.
///
/// Store failures propagate unchanged. Deleting or updating a missing id is a
/// no-op reporting zero affected documents; only [`Repository::get`] turns
/// absence into [`AppError::NotFound`].
///
/// # Example
///
/// ```ignore
/// let customers: Repository<Customer> = ctx.repository();
///
/// let mut ada = Customer::new("Ada");
/// let id = customers.add(&mut ada).await?;
///
/// let found = customers.select(&id).await?;
/// let adults = customers.list_where(Field::new("age").gte(18)).await?;
/// ```
pub struct Repository<T> {
    collection: Collection<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
        }
    }
}

impl<T> fmt::Debug for Repository<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("collection", &self.collection)
            .finish()
    }
}

impl<T: Document> FromRef<DatabaseContext> for Repository<T> {
    fn from_ref(ctx: &DatabaseContext) -> Self {
        Repository::new(ctx)
    }
}

impl<T: Document> Repository<T> {
    /// Binds to `T`'s default collection.
    pub fn new(ctx: &DatabaseContext) -> Self {
        Self::with_collection(ctx, T::collection_name())
    }

    /// Binds to an explicitly named collection.
    pub fn with_collection(ctx: &DatabaseContext, name: &str) -> Self {
        Self {
            collection: ctx.collection(name),
        }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }

    pub fn collection(&self) -> &Collection<T> {
        &self.collection
    }

    // ------------------------------------------------------------------
    // Writes
    // ------------------------------------------------------------------

    /// Inserts one entity, assigning a fresh id if it has none.
    ///
    /// Fails with [`AppError::DuplicateId`] if the id is already stored.
    pub async fn add(&self, entity: &mut T) -> Result<DocumentId, AppError> {
        let id = entity.ensure_id();
        tracing::debug!(collection = %self.collection_name(), %id, "add");
        self.collection
            .insert_many(std::slice::from_ref(entity))
            .await?;
        Ok(id)
    }

    /// Inserts several entities in one batch, assigning ids where missing.
    ///
    /// Not atomic: on failure some entities may already be stored.
    pub async fn add_range(&self, entities: &mut [T]) -> Result<Vec<DocumentId>, AppError> {
        let ids: Vec<DocumentId> = entities.iter_mut().map(|e| e.ensure_id()).collect();
        tracing::debug!(collection = %self.collection_name(), count = ids.len(), "add_range");
        if !ids.is_empty() {
            self.collection.insert_many(entities).await?;
        }
        Ok(ids)
    }

    /// Deletes the entity with the given id, returning how many were removed.
    pub async fn delete(&self, id: &DocumentId) -> Result<u64, AppError> {
        tracing::debug!(collection = %self.collection_name(), %id, "delete");
        self.collection.delete(&Filter::id(*id)).await
    }

    /// Deletes every entity matching the filter, returning how many.
    pub async fn delete_where(&self, filter: Filter) -> Result<u64, AppError> {
        tracing::debug!(collection = %self.collection_name(), %filter, "delete_where");
        self.collection.delete(&filter).await
    }

    /// Replaces the stored entity with id `id` by `entity`.
    ///
    /// Returns 1 if a document was replaced and 0 if `id` is not stored.
    /// Whatever id `entity` carries, the stored document keeps `id`.
    pub async fn update(&self, entity: &T, id: &DocumentId) -> Result<u64, AppError> {
        tracing::debug!(collection = %self.collection_name(), %id, "update");
        self.collection.replace(*id, entity).await
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn select(&self, id: &DocumentId) -> Result<Option<T>, AppError> {
        tracing::debug!(collection = %self.collection_name(), %id, "select");
        self.first(&Filter::id(*id)).await
    }

    /// Like [`Repository::select`], but absence is an error.
    pub async fn get(&self, id: &DocumentId) -> Result<T, AppError> {
        self.select(id).await?.ok_or_else(|| AppError::NotFound {
            collection: self.collection_name().to_string(),
            id: id.to_string(),
        })
    }

    pub async fn list(&self) -> Result<Vec<T>, AppError> {
        self.list_where(Filter::All).await
    }

    pub async fn list_where(&self, filter: Filter) -> Result<Vec<T>, AppError> {
        self.find(filter, FindOptions::default()).await
    }

    /// Matching entities with sorting and paging applied.
    pub async fn find(&self, filter: Filter, options: FindOptions) -> Result<Vec<T>, AppError> {
        tracing::debug!(collection = %self.collection_name(), %filter, ?options, "find");
        self.collection
            .find(&filter, &options)
            .await?
            .try_collect()
            .await
    }

    /// Lazily streams matching entities.
    ///
    /// Nothing touches the store until the stream is first polled, and each
    /// call returns an independent stream that re-runs the query.
    pub fn stream(&self, filter: Filter) -> EntityStream<'static, T> {
        let collection = self.collection.clone();
        Box::pin(try_stream! {
            tracing::debug!(collection = %collection.name(), %filter, "stream");
            let mut entities = collection.find(&filter, &FindOptions::default()).await?;
            while let Some(entity) = entities.try_next().await? {
                yield entity;
            }
        })
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        self.count_where(Filter::All).await
    }

    pub async fn count_where(&self, filter: Filter) -> Result<u64, AppError> {
        tracing::debug!(collection = %self.collection_name(), %filter, "count");
        self.collection.count(&filter).await
    }

    pub async fn any(&self) -> Result<bool, AppError> {
        self.any_where(Filter::All).await
    }

    /// True if at least one entity matches. Probes with a limit of one
    /// rather than counting.
    pub async fn any_where(&self, filter: Filter) -> Result<bool, AppError> {
        tracing::debug!(collection = %self.collection_name(), %filter, "any");
        let probe = self
            .collection
            .find(&filter, &FindOptions::new().limit(1))
            .await?
            .try_next()
            .await?;
        Ok(probe.is_some())
    }

    /// First matching entity in store order, if any.
    pub async fn first_or_default(&self, filter: Filter) -> Result<Option<T>, AppError> {
        tracing::debug!(collection = %self.collection_name(), %filter, "first_or_default");
        self.first(&filter).await
    }

    /// The only matching entity, if any.
    ///
    /// Fails with [`AppError::MultipleResults`] when two or more match.
    pub async fn single_or_default(&self, filter: Filter) -> Result<Option<T>, AppError> {
        tracing::debug!(collection = %self.collection_name(), %filter, "single_or_default");
        let mut matches: Vec<T> = self
            .collection
            .find(&filter, &FindOptions::new().limit(2))
            .await?
            .try_collect()
            .await?;

        if matches.len() > 1 {
            return Err(AppError::MultipleResults {
                collection: self.collection_name().to_string(),
                filter: filter.to_string(),
            });
        }
        Ok(matches.pop())
    }

    async fn first(&self, filter: &Filter) -> Result<Option<T>, AppError> {
        self.collection
            .find(filter, &FindOptions::new().limit(1))
            .await?
            .try_next()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Customer;
    use crate::store::Field;

    async fn repo() -> Repository<Customer> {
        DatabaseContext::connect("memory://localhost/test")
            .await
            .unwrap()
            .repository()
    }

    #[tokio::test]
    async fn test_add_assigns_id_once() {
        let repo = repo().await;
        let mut ada = Customer::new("Ada");
        let id = repo.add(&mut ada).await.unwrap();
        assert_eq!(ada.id, Some(id));

        let err = repo.add(&mut ada).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateId { .. }));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_add_keeps_existing_id() {
        let repo = repo().await;
        let preset = DocumentId::new();
        let mut c = Customer::new("Grace");
        c.id = Some(preset);
        assert_eq!(repo.add(&mut c).await.unwrap(), preset);
        assert!(repo.select(&preset).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_add_range_empty_is_noop() {
        let repo = repo().await;
        let ids = repo.add_range(&mut []).await.unwrap();
        assert!(ids.is_empty());
        assert!(!repo.any().await.unwrap());
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let repo = repo().await;
        let err = repo.get(&DocumentId::new()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { ref collection, .. } if collection == "Customer"));
    }

    #[tokio::test]
    async fn test_update_missing_is_noop() {
        let repo = repo().await;
        let ghost = Customer::new("Ghost");
        assert_eq!(repo.update(&ghost, &DocumentId::new()).await.unwrap(), 0);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_forces_stored_id() {
        let repo = repo().await;
        let mut ada = Customer::new("Ada");
        let id = repo.add(&mut ada).await.unwrap();

        let mut imposter = ada.clone();
        imposter.id = Some(DocumentId::new());
        imposter.name = "Ada L.".into();
        assert_eq!(repo.update(&imposter, &id).await.unwrap(), 1);

        let stored = repo.get(&id).await.unwrap();
        assert_eq!(stored.id, Some(id));
        assert_eq!(stored.name, "Ada L.");
    }

    #[tokio::test]
    async fn test_with_collection() {
        let ctx = DatabaseContext::connect("memory://localhost/test").await.unwrap();
        let archived: Repository<Customer> = Repository::with_collection(&ctx, "archived");
        let live: Repository<Customer> = Repository::from_ref(&ctx);

        archived.add(&mut Customer::new("Old")).await.unwrap();
        assert_eq!(archived.collection_name(), "archived");
        assert_eq!(archived.count().await.unwrap(), 1);
        assert_eq!(live.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_single_or_default() {
        let repo = repo().await;
        repo.add_range(&mut [Customer::new("A"), Customer::new("B"), Customer::new("B")])
            .await
            .unwrap();

        let one = repo
            .single_or_default(Field::new("name").eq("A"))
            .await
            .unwrap();
        assert_eq!(one.map(|c| c.name), Some("A".to_string()));

        let none = repo
            .single_or_default(Field::new("name").eq("Z"))
            .await
            .unwrap();
        assert!(none.is_none());

        let err = repo
            .single_or_default(Field::new("name").eq("B"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::MultipleResults { .. }));
    }
}
