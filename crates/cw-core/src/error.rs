use crate::entity::EntityId;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when manipulating a world.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The handle does not refer to a live entity (never existed or already despawned).
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),
}
