use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::actor::UserId;
use crate::workflows::store::{system_clock, Clock, IdSequence, RepositoryError};

use super::domain::{ProfileFields, TenantProfile, TenantProfileId};
use super::repository::ProfileRepository;

static PROFILE_SEQUENCE: IdSequence = IdSequence::new("profile");

/// Load the user's profile, creating an empty one on first use.
pub fn ensure_profile(
    repository: &dyn ProfileRepository,
    user: &UserId,
    now: DateTime<Utc>,
) -> Result<TenantProfile, RepositoryError> {
    if let Some(profile) = repository.fetch_for_user(user)? {
        return Ok(profile);
    }

    let profile = TenantProfile {
        id: TenantProfileId(PROFILE_SEQUENCE.next_id()),
        user_id: user.clone(),
        fields: ProfileFields::default(),
        created_at: now,
        updated_at: now,
    };
    repository.upsert(profile.clone())?;
    debug!(profile_id = %profile.id, user = %user, "created tenant profile");
    Ok(profile)
}

pub struct ProfileService<R> {
    repository: Arc<R>,
    clock: Clock,
}

impl<R> ProfileService<R>
where
    R: ProfileRepository + 'static,
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

    pub fn get_for_user(&self, user: &UserId) -> Result<TenantProfile, ProfileServiceError> {
        self.repository
            .fetch_for_user(user)?
            .ok_or(ProfileServiceError::NotFound)
    }

    pub fn ensure_for_user(&self, user: &UserId) -> Result<TenantProfile, ProfileServiceError> {
        Ok(ensure_profile(self.repository.as_ref(), user, (self.clock)())?)
    }

    /// Merge the supplied fields into the user's profile.
    pub fn upsert_for_user(
        &self,
        user: &UserId,
        update: ProfileFields,
    ) -> Result<TenantProfile, ProfileServiceError> {
        let now = (self.clock)();
        let mut profile = ensure_profile(self.repository.as_ref(), user, now)?;
        profile.fields.merge(update);
        profile.updated_at = now;
        self.repository.upsert(profile.clone())?;
        Ok(profile)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileServiceError {
    #[error("tenant profile not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryProfiles {
        records: Mutex<HashMap<UserId, TenantProfile>>,
    }

    impl ProfileRepository for MemoryProfiles {
        fn upsert(&self, profile: TenantProfile) -> Result<(), RepositoryError> {
            let mut guard = self.records.lock().expect("repository mutex poisoned");
            guard.insert(profile.user_id.clone(), profile);
            Ok(())
        }

        fn fetch_for_user(&self, user: &UserId) -> Result<Option<TenantProfile>, RepositoryError> {
            let guard = self.records.lock().expect("repository mutex poisoned");
            Ok(guard.get(user).cloned())
        }
    }

    #[test]
    fn get_reports_missing_profile() {
        let service = ProfileService::new(Arc::new(MemoryProfiles::default()));
        assert!(matches!(
            service.get_for_user(&UserId::new("tenant-1")),
            Err(ProfileServiceError::NotFound)
        ));
    }

    #[test]
    fn upsert_creates_then_merges() {
        let service = ProfileService::new(Arc::new(MemoryProfiles::default()));
        let tenant = UserId::new("tenant-1");

        let created = service
            .upsert_for_user(
                &tenant,
                ProfileFields {
                    first_name: Some("Noor".to_string()),
                    ..ProfileFields::default()
                },
            )
            .expect("profile created");
        let updated = service
            .upsert_for_user(
                &tenant,
                ProfileFields {
                    email: Some("noor@example.com".to_string()),
                    ..ProfileFields::default()
                },
            )
            .expect("profile updated");

        assert_eq!(created.id, updated.id);
        assert_eq!(updated.fields.first_name.as_deref(), Some("Noor"));
        assert_eq!(updated.fields.email.as_deref(), Some("noor@example.com"));
    }

    #[test]
    fn ensure_is_idempotent() {
        let service = ProfileService::new(Arc::new(MemoryProfiles::default()));
        let tenant = UserId::new("tenant-2");
        let first = service.ensure_for_user(&tenant).expect("created");
        let second = service.ensure_for_user(&tenant).expect("loaded");
        assert_eq!(first.id, second.id);
    }
}
