//! # Error Types
//!
//! Errors a backend may report and errors raised while building a
//! [`PatchDocument`](crate::PatchDocument). All use `thiserror`.
//!
//! The stub backend only ever produces [`EntityError::MissingId`]. The other
//! variants exist so a real backend can report them without changing the
//! HTTP contract.

use thiserror::Error;

use crate::identity::EntityId;

/// Error returned by an [`EntityBackend`](crate::EntityBackend).
#[derive(Error, Debug)]
pub enum EntityError {
    /// The nil identifier reached the backend.
    #[error("entity identifier must not be the nil UUID")]
    MissingId,

    /// No entity has the given identifier.
    #[error("entity {0} not found")]
    NotFound(EntityId),

    /// The patch document could not be applied to the entity.
    #[error("patch could not be applied to entity {id}: {reason}")]
    Unprocessable {
        /// The entity the patch targeted.
        id: EntityId,
        /// Why the patch was rejected.
        reason: String,
    },

    /// The backend failed for reasons unrelated to the request.
    #[error("backend failure: {0}")]
    Internal(String),
}

/// Error building a patch document from client input.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PatchError {
    /// The `op` member names no RFC 6902 operation.
    #[error("unknown patch operation \"{0}\"")]
    UnknownOperation(String),

    /// A `path` or `from` member is not a JSON Pointer.
    #[error("invalid JSON pointer \"{0}\": must be empty or start with '/'")]
    InvalidPointer(String),

    /// A JSON Pointer contains a `~` not followed by `0` or `1`.
    #[error("invalid escape in JSON pointer \"{0}\"")]
    InvalidEscape(String),

    /// A member required by the operation is absent.
    #[error("\"{op}\" operation requires a \"{member}\" member")]
    MissingMember {
        /// The operation name.
        op: &'static str,
        /// The missing member name.
        member: &'static str,
    },
}
