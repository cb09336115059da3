//! Mutation Coordinator - create and update flows
//!
//! Updates are optimistic: the change is applied to the store (and to the
//! detail panel when it shows the same incident) before the backend call,
//! then either superseded by the server's record or rolled back.
//!
//! While an update is saving, the edit is kept as an in-flight record.
//! Records of the same incident that arrive in the meantime (a detail
//! fetch, a reload) get the pending patch laid over them, so the optimistic
//! values stay visible until the save settles. Their fetched values become
//! what a rollback restores.
//!
//! Rollback is scoped to the fields the update touched. Concurrent edits to
//! *other* fields of the same record are left alone.
//!
//! Lock order: in-flight edit, then detail resolver, then store.

use crate::selection::DetailResolver;
use crate::{ClientError, ClientResult, IncidentApi, IncidentStore};
use parking_lot::{Mutex, MutexGuard};
use shared::{CreateIncidentInput, Incident, UpdateIncidentInput};
use std::sync::Arc;

/// Save state of a create or update flow
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveState {
    #[default]
    Idle,
    Saving,
    Error(String),
}

impl SaveState {
    pub fn is_saving(&self) -> bool {
        matches!(self, Self::Saving)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Holds a save flow in `Saving` until settled.
///
/// Dropping an unsettled slot (the caller abandoned the future) returns the
/// flow to `Idle` so it cannot stay locked forever.
struct SaveSlot<'a> {
    state: &'a Mutex<SaveState>,
    settled: bool,
}

impl<'a> SaveSlot<'a> {
    fn acquire(state: &'a Mutex<SaveState>) -> ClientResult<Self> {
        let mut current = state.lock();
        if current.is_saving() {
            return Err(ClientError::Busy);
        }
        *current = SaveState::Saving;
        Ok(Self {
            state,
            settled: false,
        })
    }

    fn settle(mut self, outcome: SaveState) {
        *self.state.lock() = outcome;
        self.settled = true;
    }
}

impl Drop for SaveSlot<'_> {
    fn drop(&mut self) {
        if !self.settled {
            *self.state.lock() = SaveState::Idle;
        }
    }
}

/// Prior values of the fields an update touches
#[derive(Debug)]
struct MutationSnapshot {
    id: String,
    /// `None` when the store did not hold the incident
    entry: Option<UpdateIncidentInput>,
    /// `None` when the detail panel was not showing the incident
    detail: Option<UpdateIncidentInput>,
}

impl MutationSnapshot {
    fn restore(self, store: &IncidentStore, resolver: &Mutex<DetailResolver>) {
        if let Some(entry) = &self.entry {
            store.patch_local(&self.id, entry);
        }
        if let Some(detail) = &self.detail {
            resolver.lock().patch_detail(&self.id, detail);
        }
    }
}

/// The update currently saving: the patch and what to put back
#[derive(Debug)]
pub(crate) struct InFlight {
    patch: UpdateIncidentInput,
    snapshot: MutationSnapshot,
}

impl InFlight {
    fn capture(
        store: &IncidentStore,
        resolver: &DetailResolver,
        id: &str,
        patch: &UpdateIncidentInput,
    ) -> Self {
        let mut in_flight = Self {
            patch: patch.clone(),
            snapshot: MutationSnapshot {
                id: id.to_string(),
                entry: None,
                detail: None,
            },
        };
        in_flight.snapshot.entry = store.get(id).map(|i| in_flight.prior(&i));
        in_flight.snapshot.detail = resolver
            .detail()
            .filter(|d| d.id == id)
            .map(|d| in_flight.prior(d));
        in_flight
    }

    fn prior(&self, incident: &Incident) -> UpdateIncidentInput {
        UpdateIncidentInput {
            status: self.patch.status.map(|_| incident.status),
            assignee_id: self
                .patch
                .assignee_id
                .as_ref()
                .map(|_| incident.assignee_id.clone()),
        }
    }

    /// Lay the pending patch over a fetched record headed for the store.
    ///
    /// Returns `false` for records of other incidents.
    pub(crate) fn overlay_entry(&mut self, incident: &mut Incident) -> bool {
        if incident.id != self.snapshot.id {
            return false;
        }
        self.snapshot.entry = Some(self.prior(incident));
        incident.apply(&self.patch);
        true
    }

    /// Like [`overlay_entry`](Self::overlay_entry), for a record headed for
    /// both the store and the detail panel.
    pub(crate) fn overlay_detail(&mut self, incident: &mut Incident) -> bool {
        if incident.id != self.snapshot.id {
            return false;
        }
        let prior = self.prior(incident);
        self.snapshot.detail = Some(prior.clone());
        self.snapshot.entry = Some(prior);
        incident.apply(&self.patch);
        true
    }
}

/// An optimistic update awaiting confirmation.
///
/// Rolls back on drop unless settled, so an abandoned future never leaves
/// the optimistic edit visible.
struct PendingUpdate<'a> {
    in_flight: &'a Mutex<Option<InFlight>>,
    store: &'a IncidentStore,
    resolver: &'a Mutex<DetailResolver>,
    settled: bool,
}

impl PendingUpdate<'_> {
    /// Adopt the server's record and drop the snapshot.
    ///
    /// The store entry is replaced only if it is still held; a reload that
    /// dropped the incident meanwhile wins.
    fn commit(mut self, updated: &Incident) {
        self.settled = true;
        let mut in_flight = self.in_flight.lock();
        in_flight.take();
        if !self.store.replace(updated.clone()) {
            tracing::debug!(incident_id = %updated.id, "Updated incident no longer loaded");
        }
        self.resolver.lock().confirm_with(updated.clone());
    }

    fn rollback(mut self) {
        self.restore();
    }

    fn restore(&mut self) -> bool {
        self.settled = true;
        let mut in_flight = self.in_flight.lock();
        match in_flight.take() {
            Some(edit) => {
                edit.snapshot.restore(self.store, self.resolver);
                true
            }
            None => false,
        }
    }
}

impl Drop for PendingUpdate<'_> {
    fn drop(&mut self) {
        if !self.settled && self.restore() {
            tracing::warn!("Update abandoned in flight, rolled back");
        }
    }
}

/// Orchestrates create and update against the store and the backend
pub struct MutationCoordinator<A> {
    api: Arc<A>,
    store: Arc<IncidentStore>,
    resolver: Arc<Mutex<DetailResolver>>,
    in_flight: Mutex<Option<InFlight>>,
    create_state: Mutex<SaveState>,
    update_state: Mutex<SaveState>,
}

impl<A: IncidentApi> MutationCoordinator<A> {
    pub fn new(
        api: Arc<A>,
        store: Arc<IncidentStore>,
        resolver: Arc<Mutex<DetailResolver>>,
    ) -> Self {
        Self {
            api,
            store,
            resolver,
            in_flight: Mutex::new(None),
            create_state: Mutex::new(SaveState::Idle),
            update_state: Mutex::new(SaveState::Idle),
        }
    }

    pub fn create_state(&self) -> SaveState {
        self.create_state.lock().clone()
    }

    pub fn update_state(&self) -> SaveState {
        self.update_state.lock().clone()
    }

    /// Clear a recorded create error (e.g. when the create form is reopened)
    pub fn reset_create_state(&self) {
        let mut state = self.create_state.lock();
        if !state.is_saving() {
            *state = SaveState::Idle;
        }
    }

    /// The update currently saving, if any.
    ///
    /// Take this before the resolver or store locks.
    pub(crate) fn in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        self.in_flight.lock()
    }

    /// Create an incident.
    ///
    /// Never optimistic: there is no id to key a rollback on until the
    /// backend returns one. On success the record is prepended to the store
    /// and becomes the selection.
    pub async fn create(&self, input: &CreateIncidentInput) -> ClientResult<Incident> {
        let slot = SaveSlot::acquire(&self.create_state)?;
        tracing::debug!(title = %input.title, severity = %input.severity, "Creating incident");

        match self.api.create_incident(input).await {
            Ok(created) => {
                self.store.upsert(created.clone());
                {
                    let mut resolver = self.resolver.lock();
                    resolver.select(Some(created.id.clone()), Some(created.clone()));
                    resolver.confirm_with(created.clone());
                }
                slot.settle(SaveState::Idle);
                tracing::info!(incident_id = %created.id, "Incident created");
                Ok(created)
            }
            Err(e) => {
                slot.settle(SaveState::Error(e.to_string()));
                tracing::warn!(error = %e, "Create incident failed");
                Err(e)
            }
        }
    }

    /// Update status and/or assignee, optimistically.
    ///
    /// Only one update may be in flight; a second call while saving fails
    /// with [`ClientError::Busy`] and changes nothing.
    pub async fn update(&self, id: &str, patch: &UpdateIncidentInput) -> ClientResult<Incident> {
        let slot = SaveSlot::acquire(&self.update_state)?;
        let pending = self.apply_optimistic(id, patch);
        tracing::debug!(incident_id = %id, ?patch, "Updating incident");

        match self.api.update_incident(id, patch).await {
            Ok(updated) => {
                pending.commit(&updated);
                slot.settle(SaveState::Idle);
                tracing::info!(incident_id = %id, status = %updated.status, "Incident updated");
                Ok(updated)
            }
            Err(e) => {
                pending.rollback();
                slot.settle(SaveState::Error(e.to_string()));
                tracing::warn!(incident_id = %id, error = %e, "Update failed, rolled back");
                Err(e)
            }
        }
    }

    fn apply_optimistic(&self, id: &str, patch: &UpdateIncidentInput) -> PendingUpdate<'_> {
        let mut in_flight = self.in_flight.lock();
        let mut resolver = self.resolver.lock();
        *in_flight = Some(InFlight::capture(&self.store, &resolver, id, patch));
        self.store.patch_local(id, patch);
        resolver.patch_detail(id, patch);
        PendingUpdate {
            in_flight: &self.in_flight,
            store: self.store.as_ref(),
            resolver: self.resolver.as_ref(),
            settled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use shared::{IncidentStatus, Severity, StatusChange, User};

    fn incident(id: &str) -> Incident {
        let ts = Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap();
        Incident {
            id: id.into(),
            title: format!("Incident {id}"),
            description: String::new(),
            severity: Severity::High,
            status: IncidentStatus::Open,
            assignee_id: Some("u-1".into()),
            created_at: ts,
            updated_at: ts,
            status_history: vec![StatusChange {
                status: IncidentStatus::Open,
                changed_at: ts,
                changed_by: "u-1".into(),
            }],
        }
    }

    /// Answers every update with `reply` (Err = status code)
    struct StubApi {
        reply: Result<Incident, u16>,
    }

    #[async_trait]
    impl IncidentApi for StubApi {
        async fn list_incidents(&self) -> ClientResult<Vec<Incident>> {
            Ok(Vec::new())
        }

        async fn list_users(&self) -> ClientResult<Vec<User>> {
            Ok(Vec::new())
        }

        async fn get_incident(&self, id: &str) -> ClientResult<Incident> {
            Ok(incident(id))
        }

        async fn create_incident(&self, _input: &CreateIncidentInput) -> ClientResult<Incident> {
            self.reply
                .clone()
                .map_err(|status| ClientError::request(status, "Title is required."))
        }

        async fn update_incident(
            &self,
            _id: &str,
            _input: &UpdateIncidentInput,
        ) -> ClientResult<Incident> {
            self.reply.clone().map_err(|status| {
                ClientError::request(status, format!("Request failed ({status})"))
            })
        }
    }

    fn coordinator(reply: Result<Incident, u16>) -> MutationCoordinator<StubApi> {
        let store = Arc::new(IncidentStore::new());
        store.replace_all(vec![incident("a"), incident("b")], Vec::new());
        let resolver = Arc::new(Mutex::new(DetailResolver::new()));
        resolver.lock().select(Some("a".into()), store.get("a"));
        MutationCoordinator::new(Arc::new(StubApi { reply }), store, resolver)
    }

    #[tokio::test]
    async fn test_update_success_adopts_server_record() {
        let mut server = incident("a");
        server.status = IncidentStatus::Resolved;
        server.updated_at = server.updated_at + Duration::minutes(5);
        server.status_history.push(StatusChange {
            status: IncidentStatus::Resolved,
            changed_at: server.updated_at,
            changed_by: "u-2".into(),
        });
        let c = coordinator(Ok(server.clone()));

        let updated = c
            .update("a", &UpdateIncidentInput::status(IncidentStatus::Resolved))
            .await
            .unwrap();
        assert_eq!(updated, server);
        assert_eq!(c.store.get("a").unwrap(), server);
        assert_eq!(c.resolver.lock().detail(), Some(&server));
        assert_eq!(c.update_state(), SaveState::Idle);
    }

    #[tokio::test]
    async fn test_update_failure_restores_touched_fields() {
        let c = coordinator(Err(500));
        let before_entry = c.store.get("a").unwrap();
        let before_detail = c.resolver.lock().detail().cloned();

        let patch = UpdateIncidentInput {
            status: Some(IncidentStatus::Resolved),
            assignee_id: Some(None),
        };
        let err = c.update("a", &patch).await.unwrap_err();
        assert_eq!(err.to_string(), "Request failed (500)");

        assert_eq!(c.store.get("a").unwrap(), before_entry);
        assert_eq!(c.resolver.lock().detail().cloned(), before_detail);
        assert_eq!(c.update_state(), SaveState::Error("Request failed (500)".into()));
    }

    #[tokio::test]
    async fn test_update_of_unselected_incident_leaves_detail_alone() {
        let c = coordinator(Err(503));
        let detail_before = c.resolver.lock().view();

        c.update("b", &UpdateIncidentInput::assignee(None)).await.unwrap_err();
        assert_eq!(c.resolver.lock().view(), detail_before);
        assert_eq!(c.store.get("b").unwrap().assignee_id.as_deref(), Some("u-1"));
    }

    #[tokio::test]
    async fn test_dropped_update_rolls_back_and_frees_slot() {
        let c = coordinator(Err(500));
        {
            let _slot = SaveSlot::acquire(&c.update_state).unwrap();
            let patch = UpdateIncidentInput::status(IncidentStatus::Resolved);
            let pending = c.apply_optimistic("a", &patch);
            assert_eq!(c.store.get("a").unwrap().status, IncidentStatus::Resolved);
            assert!(c.update_state().is_saving());
            drop(pending);
        }
        assert_eq!(c.store.get("a").unwrap().status, IncidentStatus::Open);
        assert_eq!(c.resolver.lock().detail().unwrap().status, IncidentStatus::Open);
        assert_eq!(c.update_state(), SaveState::Idle);
    }

    #[tokio::test]
    async fn test_overlay_keeps_edit_and_rebases_rollback() {
        let c = coordinator(Err(500));
        let patch = UpdateIncidentInput::assignee(None);
        let pending = c.apply_optimistic("a", &patch);

        let mut other = incident("b");
        assert!(!c.in_flight().as_mut().unwrap().overlay_entry(&mut other));
        assert_eq!(other.assignee_id.as_deref(), Some("u-1"));

        // Someone else reassigned "a" while our edit was saving
        let mut fetched = incident("a");
        fetched.assignee_id = Some("u-2".into());
        fetched.title = "Renamed".into();
        assert!(c.in_flight().as_mut().unwrap().overlay_entry(&mut fetched));
        assert_eq!(fetched.assignee_id, None);
        assert_eq!(fetched.title, "Renamed");
        assert!(c.store.replace(fetched));

        pending.rollback();
        let entry = c.store.get("a").unwrap();
        assert_eq!(entry.assignee_id.as_deref(), Some("u-2"));
        assert_eq!(entry.title, "Renamed");
        assert!(c.in_flight().is_none());
    }

    #[tokio::test]
    async fn test_busy_slot_rejects_second_save() {
        let c = coordinator(Err(500));
        let _slot = SaveSlot::acquire(&c.update_state).unwrap();
        let err = c
            .update("a", &UpdateIncidentInput::status(IncidentStatus::Resolved))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Busy));
        assert_eq!(c.store.get("a").unwrap().status, IncidentStatus::Open);
    }

    #[tokio::test]
    async fn test_create_failure_leaves_collection_untouched() {
        let c = coordinator(Err(400));
        let before = c.store.incidents();
        let input = CreateIncidentInput {
            title: "X".into(),
            description: String::new(),
            severity: Severity::Low,
            assignee_id: None,
        };

        c.create(&input).await.unwrap_err();
        assert_eq!(c.store.incidents(), before);
        assert_eq!(c.create_state().error(), Some("Title is required."));

        c.reset_create_state();
        assert_eq!(c.create_state(), SaveState::Idle);
    }

    #[tokio::test]
    async fn test_create_success_prepends_and_selects() {
        let c = coordinator(Ok(incident("new")));
        let input = CreateIncidentInput {
            title: "Incident new".into(),
            description: String::new(),
            severity: Severity::High,
            assignee_id: None,
        };

        c.create(&input).await.unwrap();
        assert_eq!(c.store.incidents()[0].id, "new");
        let resolver = c.resolver.lock();
        assert_eq!(resolver.selected(), Some("new"));
        assert_eq!(resolver.phase(), crate::selection::DetailPhase::Confirmed);
    }
}
