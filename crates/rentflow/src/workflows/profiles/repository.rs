use crate::actor::UserId;
use crate::workflows::store::RepositoryError;

use super::domain::TenantProfile;

/// One profile per tenant user.
pub trait ProfileRepository: Send + Sync {
    fn upsert(&self, profile: TenantProfile) -> Result<(), RepositoryError>;
    fn fetch_for_user(&self, user: &UserId) -> Result<Option<TenantProfile>, RepositoryError>;
}
