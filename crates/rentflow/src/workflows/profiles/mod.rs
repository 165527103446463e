//! Reusable tenant identity and financial data.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{ProfileFields, ProfileSnapshot, TenantProfile, TenantProfileId};
pub use repository::ProfileRepository;
pub use router::profile_router;
pub use service::{ensure_profile, ProfileService, ProfileServiceError};
