//! Backend implementations of [`DocumentStore`](crate::store::DocumentStore).
//!
//! | Backend | Module | URI scheme |
//! |---------|--------|------------|
//! | In-process | [`memory`] | `memory://` |
//! | PostgreSQL (JSONB tables) | [`postgres`] | `postgres://`, `postgresql://` |
//!
//! # Implementing a Backend
//!
//! 1. Create a store struct that is cheap to clone (`Arc` or pool inside)
//! 2. Implement `DocumentStore`, translating [`Filter`](crate::store::Filter)
//!    into the backend's native query form
//! 3. Add its scheme to [`ConnectionString`](crate::context::ConnectionString)

pub mod memory;
pub mod postgres;
