pub mod applications;
pub mod leads;
pub mod messaging;
pub mod profiles;
pub mod properties;
pub mod store;

pub use store::{Clock, RepositoryError};
