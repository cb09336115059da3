//! Collection Store - local copy of incidents and users
//!
//! The only mutable shared resource of the client. Every write goes through
//! one of the entry points below and happens under a single write
//! lock, so readers observe a collection either before or after an update,
//! never in between.

use parking_lot::RwLock;
use shared::{Incident, UpdateIncidentInput, User};

#[derive(Debug, Default)]
struct Collections {
    /// Display order: backend order after a load, newest creations first
    incidents: Vec<Incident>,
    users: Vec<User>,
}

impl Collections {
    fn position(&self, id: &str) -> Option<usize> {
        self.incidents.iter().position(|i| i.id == id)
    }
}

/// Authoritative local copy of incidents and users
#[derive(Debug, Default)]
pub struct IncidentStore {
    inner: RwLock<Collections>,
}

impl IncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Replace both collections wholesale (after a successful list load)
    pub fn replace_all(&self, incidents: Vec<Incident>, users: Vec<User>) {
        let mut inner = self.inner.write();
        inner.incidents = incidents;
        inner.users = users;
        tracing::debug!(
            incidents = inner.incidents.len(),
            users = inner.users.len(),
            "Store replaced"
        );
    }

    /// Replace the incident in place, or prepend it when absent
    pub fn upsert(&self, incident: Incident) {
        let mut inner = self.inner.write();
        match inner.position(&incident.id) {
            Some(index) => inner.incidents[index] = incident,
            None => inner.incidents.insert(0, incident),
        }
    }

    /// Replace the incident only if it is held; never inserts.
    ///
    /// Returns `false` when `id` is not held, e.g. after a reload dropped it.
    pub fn replace(&self, incident: Incident) -> bool {
        let mut inner = self.inner.write();
        match inner.position(&incident.id) {
            Some(index) => {
                inner.incidents[index] = incident;
                true
            }
            None => false,
        }
    }

    /// Shallow-merge `patch` into an existing incident without a round trip.
    ///
    /// Returns `false` without touching anything when `id` is not held, e.g.
    /// after a concurrent reload dropped it.
    pub fn patch_local(&self, id: &str, patch: &UpdateIncidentInput) -> bool {
        let mut inner = self.inner.write();
        match inner.position(id) {
            Some(index) => {
                inner.incidents[index].apply(patch);
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All incidents in display order
    pub fn incidents(&self) -> Vec<Incident> {
        self.inner.read().incidents.clone()
    }

    /// Get incident by ID
    pub fn get(&self, id: &str) -> Option<Incident> {
        let inner = self.inner.read();
        inner.position(id).map(|index| inner.incidents[index].clone())
    }

    /// All users in backend order
    pub fn users(&self) -> Vec<User> {
        self.inner.read().users.clone()
    }

    /// Get user by ID
    pub fn user(&self, id: &str) -> Option<User> {
        self.inner.read().users.iter().find(|u| u.id == id).cloned()
    }

    /// Number of incidents held
    pub fn len(&self) -> usize {
        self.inner.read().incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().incidents.is_empty()
    }
}
