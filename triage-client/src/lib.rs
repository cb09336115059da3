//! Triage Client - view-model layer for the incident dashboard
//!
//! Keeps a local incident collection consistent with the incident REST API
//! under overlapping asynchronous requests, and derives the filtered,
//! sorted queue shown to operators.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod http;
pub mod mutation;
pub mod selection;
pub mod store;
pub mod view;

pub use config::ClientConfig;
pub use dashboard::{Dashboard, LoadState};
pub use error::{ClientError, ClientResult};
pub use gateway::IncidentApi;
pub use http::NetworkHttpClient;
pub use mutation::{MutationCoordinator, SaveState};
pub use selection::{DetailPhase, DetailResolver, DetailTicket, DetailView};
pub use store::IncidentStore;
pub use view::{AssigneeFilter, QueueView, SortKey, ViewCriteria, derive_view};

// Re-export shared types for convenience
pub use shared::{
    CreateIncidentForm, CreateIncidentInput, Incident, IncidentStatus, Severity, StatusChange,
    UpdateIncidentInput, User,
};
