//! Create-form validation
//!
//! Turns raw create-form input into a [`CreateIncidentInput`] or a list of
//! field errors. The mutation layer only ever receives validated payloads.

use crate::models::{CreateIncidentInput, Severity};
use thiserror::Error;

/// A single field-level validation failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    const TITLE_REQUIRED: Self = Self {
        field: "title",
        message: "Title is required.",
    };
    const SEVERITY_REQUIRED: Self = Self {
        field: "severity",
        message: "Severity is required.",
    };
}

/// Raw create-form input, as typed by the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateIncidentForm {
    pub title: String,
    pub description: String,
    pub severity: Option<Severity>,
    /// Empty string means "unassigned"
    pub assignee_id: String,
}

impl Default for CreateIncidentForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            severity: Some(Severity::Low),
            assignee_id: String::new(),
        }
    }
}

impl CreateIncidentForm {
    /// Validate the form, collecting every failure rather than stopping at
    /// the first one.
    pub fn validate(&self) -> Result<CreateIncidentInput, Vec<FieldError>> {
        let mut errors = Vec::new();
        let title = self.title.trim();
        if title.is_empty() {
            errors.push(FieldError::TITLE_REQUIRED);
        }
        let Some(severity) = self.severity else {
            errors.push(FieldError::SEVERITY_REQUIRED);
            return Err(errors);
        };
        if !errors.is_empty() {
            return Err(errors);
        }

        let assignee = self.assignee_id.trim();
        Ok(CreateIncidentInput {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            severity,
            assignee_id: (!assignee.is_empty()).then(|| assignee.to_string()),
        })
    }
}
