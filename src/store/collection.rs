//! Typed collection handle.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use futures::StreamExt;
use serde_json::Value as JsonValue;

use crate::error::AppError;
use crate::models::{Document, DocumentId, ID_FIELD};
use crate::store::{AppStore, EntityStream, Filter, FindOptions, RawDocument};

/// A named collection in a store, typed for entity `T`.
///
/// Converts entities to and from raw JSON documents and forwards to the
/// store. Cheap to clone; handles for the same name are interchangeable.
pub struct Collection<T> {
    store: AppStore,
    name: Arc<str>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            name: self.name.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("backend", &self.store.backend())
            .finish()
    }
}

impl<T: Document> Collection<T> {
    pub fn new(store: AppStore, name: &str) -> Self {
        Self {
            store,
            name: Arc::from(name),
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &AppStore {
        &self.store
    }

    /// Inserts entities; each must already carry an id.
    pub async fn insert_many(&self, entities: &[T]) -> Result<(), AppError> {
        let documents = entities
            .iter()
            .map(to_raw)
            .collect::<Result<Vec<_>, _>>()?;
        self.store.insert(&self.name, documents).await
    }

    pub async fn find(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<EntityStream<'_, T>, AppError> {
        let stream = self.store.find(&self.name, filter, options).await?;
        Ok(Box::pin(
            stream.map(|result| result.and_then(from_raw::<T>)),
        ))
    }

    pub async fn count(&self, filter: &Filter) -> Result<u64, AppError> {
        self.store.count(&self.name, filter).await
    }

    /// Replaces the document stored under `id`; the stored `_id` is always
    /// `id`, whatever the entity carries.
    pub async fn replace(&self, id: DocumentId, entity: &T) -> Result<u64, AppError> {
        let mut document = to_raw(entity)?;
        document.insert(ID_FIELD.to_string(), id.into());
        self.store.replace(&self.name, &id, document).await
    }

    pub async fn delete(&self, filter: &Filter) -> Result<u64, AppError> {
        self.store.delete(&self.name, filter).await
    }
}

/// Serializes an entity into a raw document.
pub fn to_raw<T: Document>(entity: &T) -> Result<RawDocument, AppError> {
    match serde_json::to_value(entity)? {
        JsonValue::Object(map) => Ok(map),
        other => Err(AppError::Serialization(format!(
            "expected a JSON object for a document, got {}",
            json_kind(&other)
        ))),
    }
}

/// Deserializes a raw document into an entity.
pub fn from_raw<T: Document>(document: RawDocument) -> Result<T, AppError> {
    Ok(serde_json::from_value(JsonValue::Object(document))?)
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}
