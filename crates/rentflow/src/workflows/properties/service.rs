use std::sync::Arc;

use tracing::info;

use crate::actor::UserId;
use crate::workflows::store::{system_clock, Clock, IdSequence, RepositoryError};

use super::domain::{Property, PropertyDetails, PropertyId, PropertyStatus};
use super::repository::PropertyRepository;

static PROPERTY_SEQUENCE: IdSequence = IdSequence::new("prop");

/// Listing management for property managers.
pub struct PropertyService<R> {
    repository: Arc<R>,
    clock: Clock,
}

impl<R> PropertyService<R>
where
    R: PropertyRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self {
            repository,
            clock: system_clock,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// List a new vacant property owned by the acting manager.
    pub fn create(
        &self,
        manager: &UserId,
        details: PropertyDetails,
    ) -> Result<Property, PropertyServiceError> {
        let details = sanitize(details)?;
        let now = (self.clock)();
        let property = Property {
            id: PropertyId(PROPERTY_SEQUENCE.next_id()),
            manager_id: manager.clone(),
            details,
            status: PropertyStatus::Vacant,
            created_at: now,
            updated_at: now,
        };

        let stored = self.repository.insert(property)?;
        info!(property_id = %stored.id, manager = %manager, "property listed");
        Ok(stored)
    }

    pub fn list_for_manager(&self, manager: &UserId) -> Result<Vec<Property>, PropertyServiceError> {
        let mut properties = self.repository.list_for_manager(manager)?;
        properties.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(properties)
    }

    pub fn get(&self, manager: &UserId, id: &PropertyId) -> Result<Property, PropertyServiceError> {
        let property = self
            .repository
            .fetch(id)?
            .ok_or(PropertyServiceError::NotFound)?;
        if !property.is_managed_by(manager) {
            return Err(PropertyServiceError::Forbidden);
        }
        Ok(property)
    }

    pub fn update(
        &self,
        manager: &UserId,
        id: &PropertyId,
        details: PropertyDetails,
    ) -> Result<Property, PropertyServiceError> {
        let mut property = self.get(manager, id)?;
        property.details = sanitize(details)?;
        property.updated_at = (self.clock)();
        self.repository.update(property.clone())?;
        Ok(property)
    }

    pub fn set_status(
        &self,
        manager: &UserId,
        id: &PropertyId,
        status: PropertyStatus,
    ) -> Result<Property, PropertyServiceError> {
        let mut property = self.get(manager, id)?;
        if property.status != status {
            info!(property_id = %id, from = %property.status, to = %status, "property status changed");
            property.status = status;
            property.updated_at = (self.clock)();
            self.repository.update(property.clone())?;
        }
        Ok(property)
    }
}

fn sanitize(details: PropertyDetails) -> Result<PropertyDetails, PropertyServiceError> {
    let title = details.title.trim().to_string();
    let address = details.address.trim().to_string();
    if title.is_empty() {
        return Err(PropertyServiceError::InvalidDetails("title is required"));
    }
    if address.is_empty() {
        return Err(PropertyServiceError::InvalidDetails("address is required"));
    }
    if details.monthly_rent == 0 {
        return Err(PropertyServiceError::InvalidDetails(
            "monthly_rent must be greater than zero",
        ));
    }

    Ok(PropertyDetails {
        title,
        address,
        ..details
    })
}

#[derive(Debug, thiserror::Error)]
pub enum PropertyServiceError {
    #[error("property not found")]
    NotFound,
    #[error("property is managed by another user")]
    Forbidden,
    #[error("invalid property details: {0}")]
    InvalidDetails(&'static str),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryProperties {
        records: Mutex<HashMap<PropertyId, Property>>,
    }

    impl PropertyRepository for MemoryProperties {
        fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
            let mut guard = self.records.lock().expect("repository mutex poisoned");
            guard.insert(property.id.clone(), property.clone());
            Ok(property)
        }

        fn update(&self, property: Property) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("repository mutex poisoned");
            guard.insert(property.id.clone(), property);
            Ok(())
        }

        fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(guard.get(id).cloned())
        }

        fn list_for_manager(&self, manager: &UserId) -> Result<Vec<Property>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(guard
                .values()
                .filter(|property| property.is_managed_by(manager))
                .cloned()
                .collect())
        }
    }

    fn details() -> PropertyDetails {
        PropertyDetails {
            title: " Garden flat ".to_string(),
            address: "12 Elm Row".to_string(),
            monthly_rent: 1450,
            bedrooms: 2,
        }
    }

    #[test]
    fn create_lists_vacant_property_with_trimmed_details() {
        let service = PropertyService::new(Arc::new(MemoryProperties::default()));
        let manager = UserId::new("manager-1");

        let property = service.create(&manager, details()).expect("property created");

        assert_eq!(property.status, PropertyStatus::Vacant);
        assert_eq!(property.details.title, "Garden flat");
        assert!(property.id.0.starts_with("prop-"));
        assert_eq!(service.list_for_manager(&manager).expect("list").len(), 1);
    }

    #[test]
    fn create_rejects_zero_rent() {
        let service = PropertyService::new(Arc::new(MemoryProperties::default()));
        let mut invalid = details();
        invalid.monthly_rent = 0;

        match service.create(&UserId::new("manager-1"), invalid) {
            Err(PropertyServiceError::InvalidDetails(message)) => {
                assert!(message.contains("monthly_rent"))
            }
            other => panic!("expected invalid details, got {other:?}"),
        }
    }

    #[test]
    fn other_managers_cannot_read_or_change_listing() {
        let service = PropertyService::new(Arc::new(MemoryProperties::default()));
        let owner = UserId::new("manager-1");
        let intruder = UserId::new("manager-2");
        let property = service.create(&owner, details()).expect("property created");

        assert!(matches!(
            service.get(&intruder, &property.id),
            Err(PropertyServiceError::Forbidden)
        ));
        assert!(matches!(
            service.set_status(&intruder, &property.id, PropertyStatus::Inactive),
            Err(PropertyServiceError::Forbidden)
        ));

        let updated = service
            .set_status(&owner, &property.id, PropertyStatus::Maintenance)
            .expect("owner may change status");
        assert_eq!(updated.status, PropertyStatus::Maintenance);
        assert!(!updated.status.accepts_applications());
    }
}
