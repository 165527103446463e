//! Property listings owned by managers.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{Property, PropertyDetails, PropertyId, PropertyStatus};
pub use repository::PropertyRepository;
pub use router::property_router;
pub use service::{PropertyService, PropertyServiceError};
