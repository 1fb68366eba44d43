//! # Entity Read Model and Payloads
//!
//! The entity's structure is open: beyond its identifier, an entity is an
//! arbitrary JSON object. Drafts and changes carry those attributes through
//! to the backend untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::EntityId;

/// An entity as returned by a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
}

impl Entity {
    pub fn new(id: EntityId) -> Self {
        Self { id }
    }
}

/// Attributes for a new entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityDraft {
    pub attributes: Map<String, Value>,
}

/// Replacement attributes for an existing entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityChanges {
    pub attributes: Map<String, Value>,
}

/// Parameters of a list query.
///
/// Paging, searching, filtering, sorting and shaping are accepted and passed
/// to the backend as-is. No backend in this crate interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityQuery {
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    pub search_query: Option<String>,
    pub filter: Option<String>,
    pub order_by: Option<String>,
    /// Comma-separated list of attributes to include in each result.
    pub fields: Option<String>,
}

impl EntityQuery {
    /// Whether no parameter was supplied.
    pub fn is_unconstrained(&self) -> bool {
        *self == Self::default()
    }
}
