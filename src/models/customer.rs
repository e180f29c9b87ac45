//! Customer entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DocumentId, ExtraElements};
use crate::Document;

/// A customer record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Document)]
pub struct Customer {
    /// Unique identifier, assigned on first insert.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    /// Display name.
    pub name: String,
    /// Contact email (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Creation timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Fields not declared above.
    #[serde(flatten)]
    pub extra_elements: ExtraElements,
}

impl Customer {
    /// Creates an unsaved customer stamped with the current time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: None,
            created_at: Some(Utc::now()),
            extra_elements: ExtraElements::new(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
