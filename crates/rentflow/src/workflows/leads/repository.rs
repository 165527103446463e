use crate::workflows::properties::PropertyId;
use crate::workflows::store::RepositoryError;

use super::domain::{Lead, LeadId};

/// Storage abstraction for leads. E-mails are unique per property.
pub trait LeadRepository: Send + Sync {
    fn insert(&self, lead: Lead) -> Result<Lead, RepositoryError>;
    fn update(&self, lead: Lead) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &LeadId) -> Result<Option<Lead>, RepositoryError>;
    fn list_for_property(&self, property: &PropertyId) -> Result<Vec<Lead>, RepositoryError>;
    fn find_by_email(
        &self,
        property: &PropertyId,
        email: &str,
    ) -> Result<Option<Lead>, RepositoryError>;
}
