//! View Pipeline - filtered, sorted projection of the collection
//!
//! [`derive_view`] is a pure function; the dashboard recomputes it on every
//! read instead of caching a derived copy.

use shared::{Incident, IncidentStatus, Severity};
use std::fmt;
use std::str::FromStr;

/// Sort order for the incident queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Newest `created_at` first
    #[default]
    CreatedDesc,
    /// Oldest `created_at` first
    CreatedAsc,
    /// Critical first
    SeverityDesc,
    /// Workflow order: Open, In Progress, Resolved
    Status,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        Self::CreatedDesc,
        Self::CreatedAsc,
        Self::SeverityDesc,
        Self::Status,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedDesc => "created-desc",
            Self::CreatedAsc => "created-asc",
            Self::SeverityDesc => "severity-desc",
            Self::Status => "status",
        }
    }

    /// Operator-facing label
    pub fn label(self) -> &'static str {
        match self {
            Self::CreatedDesc => "Created: newest",
            Self::CreatedAsc => "Created: oldest",
            Self::SeverityDesc => "Severity: high to low",
            Self::Status => "Status: open to resolved",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}

/// Assignee filter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AssigneeFilter {
    #[default]
    Any,
    Unassigned,
    User(String),
}

impl AssigneeFilter {
    fn matches(&self, assignee_id: Option<&str>) -> bool {
        match self {
            Self::Any => true,
            Self::Unassigned => assignee_id.is_none(),
            Self::User(id) => assignee_id == Some(id.as_str()),
        }
    }
}

impl FromStr for AssigneeFilter {
    type Err = std::convert::Infallible;

    /// `""`/`"any"` → Any, `"unassigned"` → Unassigned, anything else is a user id
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "" | "any" => Self::Any,
            "unassigned" => Self::Unassigned,
            id => Self::User(id.to_string()),
        })
    }
}

/// Filter and sort criteria
///
/// A plain value: edits replace it wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewCriteria {
    /// Case-insensitive title substring; blank matches everything
    pub search: String,
    pub status: Option<IncidentStatus>,
    pub severity: Option<Severity>,
    pub assignee: AssigneeFilter,
    pub sort: SortKey,
}

impl ViewCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_status(mut self, status: Option<IncidentStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_severity(mut self, severity: Option<Severity>) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_assignee(mut self, assignee: AssigneeFilter) -> Self {
        self.assignee = assignee;
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// The incident queue as shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueueView {
    /// Matching incidents in display order
    pub incidents: Vec<Incident>,
    /// Size of the unfiltered collection ("Showing N of M")
    pub total: usize,
}

impl QueueView {
    pub fn shown(&self) -> usize {
        self.incidents.len()
    }
}

/// Filter and sort `incidents` according to `criteria`.
///
/// Deterministic and side-effect free. The sort is stable, so ties keep
/// their relative input order.
pub fn derive_view(incidents: &[Incident], criteria: &ViewCriteria) -> Vec<Incident> {
    let search = criteria.search.trim().to_lowercase();

    let mut view: Vec<Incident> = incidents
        .iter()
        .filter(|i| search.is_empty() || i.title.to_lowercase().contains(&search))
        .filter(|i| criteria.status.is_none_or(|s| s == i.status))
        .filter(|i| criteria.severity.is_none_or(|s| s == i.severity))
        .filter(|i| criteria.assignee.matches(i.assignee_id.as_deref()))
        .cloned()
        .collect();

    match criteria.sort {
        SortKey::CreatedDesc => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        SortKey::CreatedAsc => view.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
        SortKey::SeverityDesc => view.sort_by(|a, b| b.severity.rank().cmp(&a.severity.rank())),
        SortKey::Status => view.sort_by_key(|i| i.status.rank()),
    }

    view
}
