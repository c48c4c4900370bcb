//! Common repository traits
//!
//! This module defines generic interfaces for document store operations.

use crate::store::StoreError;

/// Trait for creating new entities in the store
///
/// # Type Parameters
/// * `Entity` - Type of the returned entity (with its document id assigned)
/// * `CreateDTO` - Data needed for creation
pub trait Create<Entity, CreateDTO> {
    /// Creates a new entity
    ///
    /// # Returns
    /// * `Ok(Entity)` - Created entity
    /// * `Err(StoreError::AlreadyExists)` - An entity with the same id exists
    async fn create(&self, data: &CreateDTO) -> Result<Entity, StoreError>;
}

/// Trait for reading a single entity by document id
///
/// # Type Parameters
/// * `Entity` - Type of the entity to read
/// * `Id` - Type of the document id
pub trait Read<Entity, Id> {
    /// Reads an entity by its document id
    ///
    /// # Returns
    /// * `Ok(Some(Entity))` - Entity found
    /// * `Ok(None)` - No entity with that id
    /// * `Err(StoreError)` - Error during reading
    async fn read(&self, id: &Id) -> Result<Option<Entity>, StoreError>;
}

/// Trait for updating existing entities
///
/// # Type Parameters
/// * `Entity` - Type of the updated entity
/// * `UpdateDTO` - Partial update (only `Some(_)` fields are written)
/// * `Id` - Type of the document id
pub trait Update<Entity, UpdateDTO, Id> {
    /// Updates an existing entity
    ///
    /// # Returns
    /// * `Ok(Entity)` - Updated entity
    /// * `Err(StoreError::NotFound)` - Entity does not exist
    async fn update(&self, id: &Id, data: &UpdateDTO) -> Result<Entity, StoreError>;
}
