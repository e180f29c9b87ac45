//! In-process document store.
//!
//! Keeps every collection as an insertion-ordered list of JSON documents
//! behind a `tokio` read/write lock. Intended for tests, demos and the
//! `memory://` connection scheme; nothing is persisted.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::{DocumentId, ID_FIELD};
use crate::store::{
    lookup, sort_cmp, DocumentStore, DocumentStream, Filter, FindOptions, RawDocument, SortOrder,
};

type Collections = HashMap<String, Vec<RawDocument>>;

/// In-memory [`DocumentStore`].
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn document_id(document: &RawDocument) -> Result<&str, AppError> {
    document
        .get(ID_FIELD)
        .and_then(|v| v.as_str())
        .ok_or_else(|| AppError::Serialization(format!("document has no string '{}'", ID_FIELD)))
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert(&self, collection: &str, documents: Vec<RawDocument>) -> Result<(), AppError> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();

        let mut seen: HashSet<&str> = docs
            .iter()
            .filter_map(|d| d.get(ID_FIELD).and_then(|v| v.as_str()))
            .collect();
        for document in &documents {
            let id = document_id(document)?;
            if !seen.insert(id) {
                return Err(AppError::DuplicateId {
                    collection: collection.to_string(),
                    detail: format!("{} = {}", ID_FIELD, id),
                });
            }
        }

        docs.extend(documents);
        Ok(())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<DocumentStream<'_>, AppError> {
        let mut matched: Vec<RawDocument> = {
            let collections = self.collections.read().await;
            collections
                .get(collection)
                .map(|docs| docs.iter().filter(|d| filter.matches(d)).cloned().collect())
                .unwrap_or_default()
        };

        if let Some((field, order)) = &options.sort {
            matched.sort_by(|a, b| {
                let null = serde_json::Value::Null;
                let ord = sort_cmp(
                    lookup(a, field).unwrap_or(&null),
                    lookup(b, field).unwrap_or(&null),
                );
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let skip = options.skip.unwrap_or(0) as usize;
        let limit = options.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        let page: Vec<_> = matched.into_iter().skip(skip).take(limit).map(Ok).collect();

        Ok(Box::pin(futures::stream::iter(page)))
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, AppError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| filter.matches(d)).count() as u64)
            .unwrap_or(0))
    }

    async fn replace(
        &self,
        collection: &str,
        id: &DocumentId,
        document: RawDocument,
    ) -> Result<u64, AppError> {
        let id = id.to_string();
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };

        match docs
            .iter_mut()
            .find(|d| d.get(ID_FIELD).and_then(|v| v.as_str()) == Some(id.as_str()))
        {
            Some(slot) => {
                *slot = document;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, collection: &str, filter: &Filter) -> Result<u64, AppError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d));
        Ok((before - docs.len()) as u64)
    }

    async fn ensure_collection(&self, collection: &str) -> Result<(), AppError> {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default();
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        let mut names: Vec<String> = self.collections.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), AppError> {
        self.collections.write().await.remove(collection);
        Ok(())
    }
}
