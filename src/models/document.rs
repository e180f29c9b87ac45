//! The document contract every stored entity satisfies.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::models::DocumentId;

/// Fields of a stored document that are not part of the entity's declared
/// schema.
///
/// Entities capture them with `#[serde(flatten)]` so schema-less documents
/// survive a read-modify-write cycle without data loss.
pub type ExtraElements = Map<String, JsonValue>;

/// Key under which the identifier is stored in every document.
pub const ID_FIELD: &str = "_id";

/// Capability set required of any type stored through a repository.
///
/// An entity exposes its identifier (unset until first stored) and its
/// extra-elements bag, and serializes to a JSON object whose [`ID_FIELD`] key
/// holds the identifier. Usually implemented with `#[derive(Document)]`.
pub trait Document: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The identifier, if one has been assigned.
    fn id(&self) -> Option<&DocumentId>;

    /// Assigns the identifier.
    fn set_id(&mut self, id: DocumentId);

    fn extra_elements(&self) -> &ExtraElements;

    fn extra_elements_mut(&mut self) -> &mut ExtraElements;

    /// Name of the collection holding this entity type.
    ///
    /// Defaults to the unqualified type name (`Customer` for
    /// `my_app::models::Customer`).
    fn collection_name() -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Returns the identifier, generating and assigning one if unset.
    fn ensure_id(&mut self) -> DocumentId {
        match self.id() {
            Some(id) => *id,
            None => {
                let id = DocumentId::new();
                self.set_id(id);
                id
            }
        }
    }
}

/// Strips module path and generic arguments from a type name.
pub fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}
