//! Selection & Detail Resolver
//!
//! Tracks the selected incident and the best-known detail record for it.
//!
//! ```text
//!   Empty ──select(id)──▶ Optimistic ──resolve(Ok)──▶ Confirmed
//!     ▲                      │
//!     │                      └──resolve(Err)──▶ Failed
//!     └───────select(None) from any phase
//! ```
//!
//! Responses can arrive in any order. Every confirmation fetch carries a
//! [`DetailTicket`]; a ticket stops being current as soon as the selection
//! changes (or is re-issued), and outcomes for non-current tickets are
//! dropped without touching any state.

use shared::{Incident, UpdateIncidentInput};

/// Phase of the detail panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailPhase {
    /// Nothing selected
    #[default]
    Empty,
    /// Selection set; showing the local copy (if any) while a fetch is pending
    Optimistic,
    /// Authoritative record shown
    Confirmed,
    /// Fetch failed; any local copy stays visible next to the error
    Failed,
}

/// Tag for an in-flight detail fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailTicket {
    id: String,
    generation: u64,
}

impl DetailTicket {
    /// Incident id the fetch was issued for
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Read-only copy of the detail panel state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DetailView {
    pub selected_id: Option<String>,
    pub incident: Option<Incident>,
    pub error: Option<String>,
    pub phase: DetailPhase,
}

impl DetailView {
    /// A confirmation fetch is still outstanding
    pub fn is_loading(&self) -> bool {
        self.phase == DetailPhase::Optimistic
    }
}

#[derive(Debug, Default)]
pub struct DetailResolver {
    selected: Option<String>,
    detail: Option<Incident>,
    error: Option<String>,
    phase: DetailPhase,
    generation: u64,
}

impl DetailResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the selection.
    ///
    /// `local` is the locally held copy of the incident, shown immediately.
    /// Returns the ticket for the confirmation fetch to issue, or `None` when
    /// the selection was cleared.
    pub fn select(&mut self, id: Option<String>, local: Option<Incident>) -> Option<DetailTicket> {
        self.generation = self.generation.wrapping_add(1);
        self.error = None;

        let Some(id) = id else {
            self.selected = None;
            self.detail = None;
            self.phase = DetailPhase::Empty;
            return None;
        };

        self.detail = local.filter(|i| i.id == id);
        self.phase = DetailPhase::Optimistic;
        self.selected = Some(id.clone());
        Some(DetailTicket {
            id,
            generation: self.generation,
        })
    }

    /// Re-issue the confirmation fetch for the current selection.
    ///
    /// Keeps whatever detail is shown; supersedes any fetch still in flight.
    pub fn retry(&mut self) -> Option<DetailTicket> {
        let id = self.selected.clone()?;
        self.generation = self.generation.wrapping_add(1);
        self.error = None;
        self.phase = DetailPhase::Optimistic;
        Some(DetailTicket {
            id,
            generation: self.generation,
        })
    }

    /// Whether an outcome for `ticket` would still be applied
    pub fn is_current(&self, ticket: &DetailTicket) -> bool {
        ticket.generation == self.generation && self.selected.as_deref() == Some(ticket.id.as_str())
    }

    /// Apply the outcome of a confirmation fetch.
    ///
    /// Returns `false` (and changes nothing) for a stale ticket.
    pub fn resolve(&mut self, ticket: &DetailTicket, outcome: Result<Incident, String>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        match outcome {
            Ok(incident) => {
                self.detail = Some(incident);
                self.error = None;
                self.phase = DetailPhase::Confirmed;
            }
            Err(message) => {
                self.error = Some(message);
                self.phase = DetailPhase::Failed;
            }
        }
        true
    }

    // =========================================================================
    // Hooks for the mutation coordinator
    // =========================================================================

    /// Optimistically merge `patch` into the detail if it shows `id`
    pub fn patch_detail(&mut self, id: &str, patch: &UpdateIncidentInput) -> bool {
        match &mut self.detail {
            Some(detail) if detail.id == id => {
                detail.apply(patch);
                true
            }
            _ => false,
        }
    }

    /// Show an authoritative record if its incident is still selected.
    ///
    /// The record is newer than anything a pending fetch could return, so
    /// pending fetches are superseded.
    pub fn confirm_with(&mut self, incident: Incident) -> bool {
        if self.selected.as_deref() != Some(incident.id.as_str()) {
            return false;
        }
        self.generation = self.generation.wrapping_add(1);
        self.detail = Some(incident);
        self.error = None;
        self.phase = DetailPhase::Confirmed;
        true
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn detail(&self) -> Option<&Incident> {
        self.detail.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> DetailPhase {
        self.phase
    }

    pub fn view(&self) -> DetailView {
        DetailView {
            selected_id: self.selected.clone(),
            incident: self.detail.clone(),
            error: self.error.clone(),
            phase: self.phase,
        }
    }
}
