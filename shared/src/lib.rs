//! Shared types for the triage workspace
//!
//! Incident and user models, API payloads, the error body shape returned by
//! the backend, create-form validation and small display helpers.

pub mod models;
pub mod response;
pub mod util;
pub mod validation;

// Re-exports
pub use models::{
    CreateIncidentInput, Incident, IncidentStatus, Severity, StatusChange, UpdateIncidentInput,
    User,
};
pub use response::{ErrorBody, request_failed_message};
pub use serde::{Deserialize, Serialize};
pub use validation::{CreateIncidentForm, FieldError};
