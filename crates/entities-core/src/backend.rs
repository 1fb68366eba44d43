//! # Entity Backend
//!
//! The seam between the HTTP controller and the system that manages
//! entities. Methods are synchronous: no backend in this workspace performs
//! I/O, and handlers never hold state across requests.
//!
//! [`StubBackend`] stores nothing. Reads find nothing, creation fabricates a
//! fresh identifier, updates echo the target identifier and deletion always
//! succeeds. It never reports [`EntityError::NotFound`] or
//! [`EntityError::Unprocessable`].

use crate::entity::{Entity, EntityChanges, EntityDraft, EntityQuery};
use crate::error::EntityError;
use crate::identity::EntityId;
use crate::patch::PatchDocument;

/// Operations the entity controller delegates to.
///
/// Implementations must reject the nil identifier with
/// [`EntityError::MissingId`].
pub trait EntityBackend: Send + Sync + std::fmt::Debug {
    /// Entities matching the query. An empty vector means none matched.
    fn list(&self, query: &EntityQuery) -> Result<Vec<Entity>, EntityError>;

    /// The entity with the given identifier, if any.
    fn get(&self, id: EntityId) -> Result<Option<Entity>, EntityError>;

    /// Create an entity. The returned entity carries a newly generated
    /// identifier, never one derived from the draft.
    fn create(&self, draft: &EntityDraft) -> Result<Entity, EntityError>;

    /// Replace every attribute of an existing entity.
    fn replace(&self, id: EntityId, changes: &EntityChanges) -> Result<Entity, EntityError>;

    /// Apply a patch document to an existing entity.
    fn patch(&self, id: EntityId, document: &PatchDocument) -> Result<Entity, EntityError>;

    /// Delete an existing entity.
    fn delete(&self, id: EntityId) -> Result<(), EntityError>;
}

fn require_id(id: EntityId) -> Result<EntityId, EntityError> {
    if id.is_nil() {
        return Err(EntityError::MissingId);
    }
    Ok(id)
}

/// Backend that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubBackend;

impl StubBackend {
    pub fn new() -> Self {
        Self
    }
}

impl EntityBackend for StubBackend {
    fn list(&self, query: &EntityQuery) -> Result<Vec<Entity>, EntityError> {
        tracing::debug!(unconstrained = query.is_unconstrained(), "stub backend: list");
        Ok(Vec::new())
    }

    fn get(&self, id: EntityId) -> Result<Option<Entity>, EntityError> {
        let id = require_id(id)?;
        tracing::debug!(entity_id = %id, "stub backend: get");
        Ok(None)
    }

    fn create(&self, draft: &EntityDraft) -> Result<Entity, EntityError> {
        let entity = Entity::new(EntityId::new());
        tracing::debug!(
            entity_id = %entity.id,
            attributes = draft.attributes.len(),
            "stub backend: create"
        );
        Ok(entity)
    }

    fn replace(&self, id: EntityId, changes: &EntityChanges) -> Result<Entity, EntityError> {
        let id = require_id(id)?;
        tracing::debug!(
            entity_id = %id,
            attributes = changes.attributes.len(),
            "stub backend: replace"
        );
        Ok(Entity::new(id))
    }

    fn patch(&self, id: EntityId, document: &PatchDocument) -> Result<Entity, EntityError> {
        let id = require_id(id)?;
        tracing::debug!(
            entity_id = %id,
            operations = document.len(),
            "stub backend: patch"
        );
        Ok(Entity::new(id))
    }

    fn delete(&self, id: EntityId) -> Result<(), EntityError> {
        let id = require_id(id)?;
        tracing::debug!(entity_id = %id, "stub backend: delete");
        Ok(())
    }
}
