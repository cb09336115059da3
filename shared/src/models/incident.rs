//! Incident Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Incident severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, lowest first
    pub const ALL: [Severity; 4] = [Self::Low, Self::Medium, Self::High, Self::Critical];

    /// Ordering rank: Low=1 < Medium=2 < High=3 < Critical=4
    pub fn rank(self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
            Self::Critical => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown severity: {s}"))
    }
}

/// Incident workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncidentStatus {
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl IncidentStatus {
    /// All statuses in workflow order
    pub const ALL: [IncidentStatus; 3] = [Self::Open, Self::InProgress, Self::Resolved];

    /// Workflow rank: Open=1 < In Progress=2 < Resolved=3
    pub fn rank(self) -> u8 {
        match self {
            Self::Open => 1,
            Self::InProgress => 2,
            Self::Resolved => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "Open",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = String;

    /// Accepts the wire form ("In Progress") as well as CLI-friendly
    /// spellings ("in-progress", "in_progress").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|v| v.as_str().to_ascii_lowercase() == normalized)
            .ok_or_else(|| format!("unknown status: {s}"))
    }
}

/// One entry of an incident's status history, as recorded by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: IncidentStatus,
    pub changed_at: DateTime<Utc>,
    /// User id of whoever made the change
    pub changed_by: String,
}

/// Incident entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    #[serde(default)]
    pub assignee_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Append-only, chronological. Never synthesized client-side.
    #[serde(default)]
    pub status_history: Vec<StatusChange>,
}

impl Incident {
    /// Shallow-merge the fields present in `patch`.
    ///
    /// Only `status` and `assignee_id` are touched; `status_history` and
    /// `updated_at` stay as last observed from the backend.
    pub fn apply(&mut self, patch: &UpdateIncidentInput) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(assignee) = &patch.assignee_id {
            self.assignee_id = assignee.clone();
        }
    }
}

/// Create incident payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIncidentInput {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub assignee_id: Option<String>,
}

/// Update incident payload (PATCH)
///
/// `assignee_id` is tri-state: `None` leaves the assignee alone,
/// `Some(None)` unassigns, `Some(Some(id))` assigns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIncidentInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_field"
    )]
    pub assignee_id: Option<Option<String>>,
}

impl UpdateIncidentInput {
    pub fn status(status: IncidentStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn assignee(assignee_id: Option<String>) -> Self {
        Self {
            assignee_id: Some(assignee_id),
            ..Default::default()
        }
    }

    /// Build a patch holding only the fields that differ from `incident`.
    ///
    /// Returns `None` when the requested values match the incident, so the
    /// caller can skip the save entirely.
    pub fn between(
        incident: &Incident,
        status: IncidentStatus,
        assignee_id: Option<String>,
    ) -> Option<Self> {
        let patch = Self {
            status: (status != incident.status).then_some(status),
            assignee_id: (assignee_id != incident.assignee_id).then_some(assignee_id),
        };
        (!patch.is_empty()).then_some(patch)
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.assignee_id.is_none()
    }
}

/// Distinguishes an explicit `null` from an absent field.
fn present_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}
