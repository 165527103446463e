//! Rental application intake: multi-step wizard drafts, the manager review workflow,
//! and the property, lead, and messaging surfaces around it.

pub mod actor;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
