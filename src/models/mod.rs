//! Document contract and domain entities.

mod customer;
mod document;
mod id;

pub use customer::Customer;
pub use document::{short_type_name, Document, ExtraElements, ID_FIELD};
pub use id::DocumentId;
