//! Data access layer.
//!
//! [`Repository`] provides the generic CRUD/query API for any
//! [`Document`](crate::Document); entity-specific repositories wrap it and
//! are built from the context with the `FromContext` derive macro.

mod customer;
mod repository;

pub use customer::{CustomerQueries, CustomerRepository};
pub use repository::Repository;
