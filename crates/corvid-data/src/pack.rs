//! Explicit input selector for pack serializers.
//!
//! Callers either hand the serializer an id to resolve or a row they already
//! hold; the two cases are distinct variants rather than a runtime type
//! check, so the serializer's contract is visible in its signature.

use corvid_api_models::Id;

/// Input to a pack serializer.
#[derive(Debug, Clone, Copy)]
pub enum PackSource<'a, T> {
    /// Resolve the entity by id before serializing; a missing row is a
    /// typed not-found error.
    Id(&'a Id),
    /// Serialize an already-loaded row without touching the database.
    Loaded(&'a T),
}
