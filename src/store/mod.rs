//! Document store abstraction for backend-agnostic database access.
//!
//! # Architecture
//!
//! - [`DocumentStore`] - Async trait a backend implements (insert, find,
//!   count, replace, delete, collection management)
//! - [`Filter`] - Serializable predicate every backend translates natively
//! - [`Collection`] - Typed handle converting entities to and from raw JSON
//!   documents for one named collection
//!
//! # Usage
//!
//! ```ignore
//! use docrepo::store::{backends::memory::MemoryStore, AppStore, Collection, Field};
//!
//! let store: AppStore = Arc::new(MemoryStore::new());
//! let customers: Collection<Customer> = Collection::new(store, "Customer");
//!
//! customers.insert_many(&[customer]).await?;
//! let count = customers.count(&Field::new("name").eq("Ada")).await?;
//! ```

mod collection;
mod filter;
mod options;
mod parser;
mod traits;

pub mod backends;

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use serde_json::{Map, Value as JsonValue};

use crate::error::AppError;

pub use collection::Collection;
pub use filter::{field_path, lookup, sort_cmp, CompareOp, Field, Filter};
pub use options::{FindOptions, SortOrder};
pub use parser::parse_filter;
pub use traits::DocumentStore;

/// A document as the store sees it: a JSON object including the `_id` key.
pub type RawDocument = Map<String, JsonValue>;

/// A stream of raw documents from a find.
///
/// Rows are fetched on demand where the backend supports it.
pub type DocumentStream<'a> = Pin<Box<dyn Stream<Item = Result<RawDocument, AppError>> + Send + 'a>>;

/// A stream of typed entities.
pub type EntityStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T, AppError>> + Send + 'a>>;

/// Shared, type-erased store handle.
pub type AppStore = Arc<dyn DocumentStore>;
