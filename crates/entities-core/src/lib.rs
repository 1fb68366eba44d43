//! # entities-core: Domain Types for the Entities API
//!
//! Defines the types that flow between the HTTP layer and whatever system
//! actually manages entities. The HTTP layer (`entities-api`) owns request
//! binding, status codes and documentation; this crate owns everything the
//! backend sees.
//!
//! ## Key Types
//!
//! - [`EntityId`]: newtype over `Uuid`. The nil UUID is the "no identifier
//!   supplied" sentinel and is rejected at every boundary.
//! - [`Entity`], [`EntityDraft`], [`EntityChanges`], [`EntityQuery`]: the
//!   read model and the three inbound payload shapes.
//! - [`PatchDocument`]: an ordered list of RFC 6902 operations with
//!   validated JSON Pointers.
//! - [`EntityBackend`]: the seam the controller delegates to, and
//!   [`StubBackend`], the placeholder implementation that stores nothing.
//!
//! ## Crate Policy
//!
//! - No dependencies on other workspace crates (this is the leaf of the DAG).
//! - No HTTP or OpenAPI types; those live in `entities-api`.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod backend;
pub mod entity;
pub mod error;
pub mod identity;
pub mod patch;

pub use backend::{EntityBackend, StubBackend};
pub use entity::{Entity, EntityChanges, EntityDraft, EntityQuery};
pub use error::{EntityError, PatchError};
pub use identity::EntityId;
pub use patch::{JsonPointer, PatchDocument, PatchOperation};
