//! docrepo - generic async repository over document databases.
//!
//! A [`Repository<T>`](repositories::Repository) gives any [`Document`] entity
//! the same CRUD and query surface (add, delete, update, select, list, count,
//! any, first/single-or-default) on top of a pluggable
//! [`DocumentStore`](store::DocumentStore) backend: in-memory or PostgreSQL.
//!
//! ```ignore
//! use docrepo::{DatabaseContext, repositories::CustomerRepository, models::Customer};
//!
//! let ctx = DatabaseContext::connect("postgresql://localhost/shop").await?;
//! let customers = CustomerRepository::new(&ctx);
//! let id = customers.add(&mut Customer::new("Ada")).await?;
//! ```

// Lets derive output name `::docrepo::...` inside this crate too
extern crate self as docrepo;

pub mod cli;
pub mod config;
pub mod context;
pub mod di;
pub mod error;
pub mod models;
pub mod repositories;
pub mod store;

// Re-exported at the crate root for docrepo-macros generated code
pub use context::DatabaseContext;
pub use di::FromRef;
pub use docrepo_macros::Document;
pub use models::{Document, DocumentId, ExtraElements};
