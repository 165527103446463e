use crate::actor::UserId;
use crate::workflows::store::RepositoryError;

use super::domain::{Property, PropertyId};

/// Storage abstraction for listings; other workflows read it to resolve ownership.
pub trait PropertyRepository: Send + Sync {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError>;
    fn update(&self, property: Property) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;
    fn list_for_manager(&self, manager: &UserId) -> Result<Vec<Property>, RepositoryError>;
}
