//! Dashboard - the view-model facade a rendering layer drives
//!
//! Wires the gateway, the collection store, the view pipeline, the detail
//! resolver and the mutation coordinator together. Failures are recorded as
//! state (page error, detail error, save states) and also returned to the
//! caller; nothing here panics or tears down previously loaded data.
//!
//! No lock is ever held across an `.await`. Lock order: page load, then
//! in-flight edit, then detail resolver, then store.

use crate::mutation::{MutationCoordinator, SaveState};
use crate::selection::{DetailResolver, DetailTicket, DetailView};
use crate::view::{QueueView, ViewCriteria, derive_view};
use crate::{ClientConfig, ClientResult, IncidentApi, IncidentStore, NetworkHttpClient};
use parking_lot::{Mutex, RwLock};
use shared::{CreateIncidentInput, Incident, UpdateIncidentInput, User};
use std::sync::Arc;

/// Page-level load state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadState {
    pub loading: bool,
    /// Retryable error from the last load; previously loaded data stays
    pub error: Option<String>,
    /// At least one load has succeeded
    pub loaded: bool,
}

#[derive(Debug, Default)]
struct LoadTracker {
    state: LoadState,
    /// Bumped on every load so an overtaken reload cannot clobber a newer one
    generation: u64,
}

/// Incident dashboard view-model
pub struct Dashboard<A> {
    api: Arc<A>,
    store: Arc<IncidentStore>,
    resolver: Arc<Mutex<DetailResolver>>,
    mutations: MutationCoordinator<A>,
    criteria: RwLock<ViewCriteria>,
    load: Mutex<LoadTracker>,
}

impl Dashboard<NetworkHttpClient> {
    /// Dashboard backed by the HTTP gateway described by `config`
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Ok(Self::new(config.build_http_client()?))
    }
}

impl<A: IncidentApi> Dashboard<A> {
    pub fn new(api: A) -> Self {
        let api = Arc::new(api);
        let store = Arc::new(IncidentStore::new());
        let resolver = Arc::new(Mutex::new(DetailResolver::new()));
        let mutations = MutationCoordinator::new(api.clone(), store.clone(), resolver.clone());
        Self {
            api,
            store,
            resolver,
            mutations,
            criteria: RwLock::new(ViewCriteria::default()),
            load: Mutex::new(LoadTracker::default()),
        }
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Fetch incidents and users and replace the local collection.
    ///
    /// On failure the previous collection is kept and the error is recorded
    /// for a retry.
    pub async fn load_all(&self) -> ClientResult<()> {
        let generation = {
            let mut load = self.load.lock();
            load.generation = load.generation.wrapping_add(1);
            load.state.loading = true;
            load.state.error = None;
            load.generation
        };
        tracing::debug!("Loading incidents and users");

        let result = tokio::try_join!(self.api.list_incidents(), self.api.list_users());

        let mut load = self.load.lock();
        if load.generation != generation {
            tracing::debug!("Discarding overtaken load result");
            return result.map(|_| ());
        }
        load.state.loading = false;
        match result {
            Ok((mut incidents, users)) => {
                tracing::info!(
                    incidents = incidents.len(),
                    users = users.len(),
                    "Dashboard loaded"
                );
                let mut in_flight = self.mutations.in_flight();
                if let Some(edit) = in_flight.as_mut() {
                    for incident in &mut incidents {
                        if edit.overlay_entry(incident) {
                            break;
                        }
                    }
                }
                self.store.replace_all(incidents, users);
                load.state.loaded = true;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Dashboard load failed");
                load.state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.load.lock().state.clone()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select an incident (or clear with `None`) and confirm it remotely.
    ///
    /// Returns the confirmed record, or `Ok(None)` when the selection was
    /// cleared or changed before the response arrived. A fetch failure for
    /// the still-current selection is recorded and returned as `Err`.
    pub async fn select(&self, id: Option<&str>) -> ClientResult<Option<Incident>> {
        match self.begin_select(id) {
            Some(ticket) => self.confirm(ticket).await,
            None => Ok(None),
        }
    }

    /// Synchronous half of [`select`](Self::select): switch the selection and
    /// surface the local copy right away.
    ///
    /// The returned ticket must be passed to [`confirm`](Self::confirm).
    pub fn begin_select(&self, id: Option<&str>) -> Option<DetailTicket> {
        let local = id.and_then(|id| self.store.get(id));
        self.resolver.lock().select(id.map(str::to_string), local)
    }

    /// Asynchronous half of [`select`](Self::select): fetch the authoritative
    /// record and apply it if `ticket` is still current.
    pub async fn confirm(&self, ticket: DetailTicket) -> ClientResult<Option<Incident>> {
        tracing::debug!(incident_id = %ticket.id(), "Fetching incident detail");
        let result = self.api.get_incident(ticket.id()).await;

        let mut in_flight = self.mutations.in_flight();
        let mut resolver = self.resolver.lock();
        if !resolver.is_current(&ticket) {
            tracing::debug!(incident_id = %ticket.id(), "Discarding stale detail response");
            return Ok(None);
        }
        match result {
            Ok(mut incident) => {
                if let Some(edit) = in_flight.as_mut()
                    && edit.overlay_detail(&mut incident)
                {
                    tracing::debug!(
                        incident_id = %incident.id,
                        "Kept in-flight edit over fetched detail"
                    );
                }
                resolver.resolve(&ticket, Ok(incident.clone()));
                self.store.upsert(incident.clone());
                Ok(Some(incident))
            }
            Err(e) => {
                tracing::warn!(incident_id = %ticket.id(), error = %e, "Detail fetch failed");
                resolver.resolve(&ticket, Err(e.to_string()));
                Err(e)
            }
        }
    }

    /// Re-fetch the detail of the current selection (e.g. after a failure)
    pub async fn retry_detail(&self) -> ClientResult<Option<Incident>> {
        let ticket = self.resolver.lock().retry();
        match ticket {
            Some(ticket) => self.confirm(ticket).await,
            None => Ok(None),
        }
    }

    pub fn clear_selection(&self) {
        self.resolver.lock().select(None, None);
    }

    pub fn detail(&self) -> DetailView {
        self.resolver.lock().view()
    }

    pub fn selected_id(&self) -> Option<String> {
        self.resolver.lock().selected().map(str::to_string)
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create an incident from a validated payload; it becomes the selection
    pub async fn create(&self, input: &CreateIncidentInput) -> ClientResult<Incident> {
        self.mutations.create(input).await
    }

    /// Optimistically update an incident's status and/or assignee
    pub async fn update(&self, id: &str, patch: &UpdateIncidentInput) -> ClientResult<Incident> {
        self.mutations.update(id, patch).await
    }

    pub fn create_state(&self) -> SaveState {
        self.mutations.create_state()
    }

    pub fn update_state(&self) -> SaveState {
        self.mutations.update_state()
    }

    pub fn reset_create_state(&self) {
        self.mutations.reset_create_state();
    }

    // =========================================================================
    // View
    // =========================================================================

    pub fn criteria(&self) -> ViewCriteria {
        self.criteria.read().clone()
    }

    pub fn set_criteria(&self, criteria: ViewCriteria) {
        *self.criteria.write() = criteria;
    }

    /// Back to the defaults: no filters, newest first
    pub fn reset_criteria(&self) {
        self.set_criteria(ViewCriteria::default());
    }

    /// The incident queue under the current criteria, recomputed on every call
    pub fn view(&self) -> QueueView {
        let incidents = self.store.incidents();
        let criteria = self.criteria.read().clone();
        QueueView {
            total: incidents.len(),
            incidents: derive_view(&incidents, &criteria),
        }
    }

    pub fn users(&self) -> Vec<User> {
        self.store.users()
    }

    pub fn store(&self) -> &IncidentStore {
        &self.store
    }
}
