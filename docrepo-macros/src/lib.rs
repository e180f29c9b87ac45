//! Derive macros for docrepo.
//!
//! This crate provides:
//! - `#[derive(Context)]` to make a context struct's fields extractable
//! - `#[derive(FromContext)]` to auto-resolve a repository's fields from a context
//! - `#[derive(Document)]` to implement the document contract for an entity
//!
//! Generated code references `::docrepo::FromRef`, `::docrepo::Document`,
//! `::docrepo::DocumentId` and `::docrepo::ExtraElements`, which the docrepo
//! crate re-exports at its root. The derives work in downstream crates as well
//! as inside docrepo itself.

use proc_macro::TokenStream;

mod context;
mod document;
mod fields;
mod from_context;

/// Derive macro for creating a DI context.
///
/// Generates `FromRef` implementations for each field type, allowing them to
/// be extracted from the context.
///
/// # Example
///
/// ```ignore
/// #[derive(Context, Clone)]
/// pub struct DatabaseContext {
///     pub store: AppStore,
///     pub database: Arc<str>,
/// }
///
/// // Generated implementations:
/// // impl FromRef<DatabaseContext> for AppStore { ... }
/// // impl FromRef<DatabaseContext> for Arc<str> { ... }
/// ```
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    context::derive_context_impl(input)
}

/// Derive macro for types that can be constructed from a context.
///
/// Generates a `FromRef<DatabaseContext>` implementation that resolves each
/// field by calling `FromRef::from_ref` on the context. The context type can
/// be overridden with `#[from_context(Context = "MyContext")]`.
///
/// # Example
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct CustomerRepository {
///     customers: Repository<Customer>, // resolved via Repository::<Customer>::from_ref(ctx)
/// }
/// ```
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    from_context::derive_from_context_impl(input)
}

/// Derive macro implementing the `Document` contract.
///
/// The identifier field is the one marked `#[document(id)]`, or the field named
/// `id`; it must be an `Option<DocumentId>`. The extra-elements field is the one
/// marked `#[document(extra)]`, or the field named `extra_elements`. The
/// collection name defaults to the type name and can be set with
/// `#[document(collection = "customers")]`.
///
/// # Example
///
/// ```ignore
/// #[derive(Document, Serialize, Deserialize)]
/// #[document(collection = "customers")]
/// pub struct Customer {
///     #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
///     pub id: Option<DocumentId>,
///     pub name: String,
///     #[serde(flatten)]
///     pub extra_elements: ExtraElements,
/// }
/// ```
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document_impl(input)
}
