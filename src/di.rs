//! Dependency injection infrastructure.
//!
//! Repositories are resolved from the [`DatabaseContext`](crate::DatabaseContext)
//! at compile time through the `FromRef` trait and the derive macros from
//! `docrepo-macros`.
//!
//! # Overview
//!
//! - `FromRef<T>`: Trait for extracting a value from a reference to `T`
//! - `#[derive(Context)]`: Makes each field of a struct extractable via `FromRef`
//! - `#[derive(FromContext)]`: Generates `FromRef` impl by resolving each field
//!
//! # Example
//!
//! ```ignore
//! use docrepo::di::{FromContext, FromRef};
//!
//! #[derive(FromContext, Clone)]
//! pub struct OrderRepository {
//!     orders: Repository<Order>, // resolved via FromRef<DatabaseContext>
//! }
//!
//! let ctx = DatabaseContext::connect("memory://localhost/shop").await?;
//! let repo = OrderRepository::from_ref(&ctx);
//! ```

/// Trait for extracting a value from a reference to another type.
///
/// Types that implement `FromRef<T>` can be built from `&T`.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

pub use docrepo_macros::{Context, FromContext};
