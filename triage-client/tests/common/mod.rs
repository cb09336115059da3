// triage-client/tests/common/mod.rs
// Test doubles for IncidentApi

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use shared::request_failed_message;
use std::collections::HashMap;
use tokio::sync::oneshot;
use triage_client::{
    ClientError, ClientResult, CreateIncidentInput, Incident, IncidentApi, IncidentStatus, Severity,
    StatusChange, UpdateIncidentInput, User,
};

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn incident(id: &str, title: &str, created_minute: i64) -> Incident {
    Incident {
        id: id.into(),
        title: title.into(),
        description: String::new(),
        severity: Severity::Medium,
        status: IncidentStatus::Open,
        assignee_id: None,
        created_at: at(created_minute),
        updated_at: at(created_minute),
        status_history: vec![StatusChange {
            status: IncidentStatus::Open,
            changed_at: at(created_minute),
            changed_by: "u-1".into(),
        }],
    }
}

pub fn users() -> Vec<User> {
    vec![
        User {
            id: "u-1".into(),
            name: "Ada Lovelace".into(),
        },
        User {
            id: "u-2".into(),
            name: "Grace Hopper".into(),
        },
    ]
}

/// Yield to the other joined futures until `condition` holds
pub async fn until(mut condition: impl FnMut() -> bool) {
    while !condition() {
        tokio::task::yield_now().await;
    }
}

fn failure(status: u16, message: Option<&str>) -> ClientError {
    ClientError::request(
        status,
        message.map(str::to_string).unwrap_or_else(|| request_failed_message(status)),
    )
}

// ============================================================================
// InMemoryApi - answers immediately, behaves like a small backend
// ============================================================================

#[derive(Default)]
pub struct InMemoryApi {
    incidents: Mutex<Vec<Incident>>,
    users: Mutex<Vec<User>>,
    /// Operation name -> (status, optional `{error}` message)
    failures: Mutex<HashMap<&'static str, (u16, Option<String>)>>,
    clock: Mutex<i64>,
    calls: Mutex<Vec<String>>,
}

impl InMemoryApi {
    pub fn new(incidents: Vec<Incident>, users: Vec<User>) -> Self {
        Self {
            incidents: Mutex::new(incidents),
            users: Mutex::new(users),
            clock: Mutex::new(1_000),
            ..Default::default()
        }
    }

    /// Make every call of `operation` fail until [`recover`](Self::recover)
    pub fn fail(&self, operation: &'static str, status: u16, message: Option<&str>) {
        self.failures
            .lock()
            .insert(operation, (status, message.map(str::to_string)));
    }

    pub fn recover(&self, operation: &'static str) {
        self.failures.lock().remove(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn server_copy(&self, id: &str) -> Option<Incident> {
        self.incidents.lock().iter().find(|i| i.id == id).cloned()
    }

    fn enter(&self, operation: &'static str, detail: &str) -> ClientResult<()> {
        self.calls.lock().push(format!("{operation}{detail}"));
        match self.failures.lock().get(operation) {
            Some((status, message)) => Err(failure(*status, message.as_deref())),
            None => Ok(()),
        }
    }

    fn tick(&self) -> DateTime<Utc> {
        let mut clock = self.clock.lock();
        *clock += 1;
        at(*clock)
    }
}

#[async_trait]
impl IncidentApi for InMemoryApi {
    async fn list_incidents(&self) -> ClientResult<Vec<Incident>> {
        self.enter("list_incidents", "")?;
        Ok(self.incidents.lock().clone())
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.enter("list_users", "")?;
        Ok(self.users.lock().clone())
    }

    async fn get_incident(&self, id: &str) -> ClientResult<Incident> {
        self.enter("get", &format!(":{id}"))?;
        self.server_copy(id)
            .ok_or_else(|| failure(404, Some("Incident not found")))
    }

    async fn create_incident(&self, input: &CreateIncidentInput) -> ClientResult<Incident> {
        self.enter("create", "")?;
        let now = self.tick();
        let mut incidents = self.incidents.lock();
        let created = Incident {
            id: format!("inc-{}", incidents.len() + 1),
            title: input.title.clone(),
            description: input.description.clone(),
            severity: input.severity,
            status: IncidentStatus::Open,
            assignee_id: input.assignee_id.clone(),
            created_at: now,
            updated_at: now,
            status_history: vec![StatusChange {
                status: IncidentStatus::Open,
                changed_at: now,
                changed_by: "u-1".into(),
            }],
        };
        incidents.insert(0, created.clone());
        Ok(created)
    }

    async fn update_incident(
        &self,
        id: &str,
        input: &UpdateIncidentInput,
    ) -> ClientResult<Incident> {
        self.enter("update", &format!(":{id}"))?;
        let now = self.tick();
        let mut incidents = self.incidents.lock();
        let incident = incidents
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| failure(404, Some("Incident not found")))?;
        if let Some(status) = input.status
            && status != incident.status
        {
            incident.status_history.push(StatusChange {
                status,
                changed_at: now,
                changed_by: "u-2".into(),
            });
        }
        incident.apply(input);
        incident.updated_at = now;
        Ok(incident.clone())
    }
}

// ============================================================================
// GatedApi - every call waits until the test replies to it
// ============================================================================

struct Pending {
    key: String,
    reply: oneshot::Sender<ClientResult<serde_json::Value>>,
}

/// Lets a test decide the order in which responses arrive.
///
/// Requests are identified by keys: `list_incidents`, `list_users`,
/// `get:<id>`, `create`, `update:<id>`.
#[derive(Default)]
pub struct GatedApi {
    pending: Mutex<Vec<Pending>>,
}

impl GatedApi {
    async fn call<T: DeserializeOwned>(&self, key: String) -> ClientResult<T> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().push(Pending { key, reply: tx });
        let value = rx
            .await
            .map_err(|_| ClientError::InvalidResponse("reply dropped".into()))??;
        serde_json::from_value(value).map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }

    /// Wait until at least `n` requests are outstanding
    pub async fn wait_for(&self, n: usize) {
        loop {
            let outstanding = self.pending.lock().len();
            if outstanding >= n {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    pub fn outstanding(&self) -> Vec<String> {
        self.pending.lock().iter().map(|p| p.key.clone()).collect()
    }

    fn reply(&self, key: &str, newest: bool, result: ClientResult<serde_json::Value>) {
        let pending = {
            let mut pending = self.pending.lock();
            let mut matching = pending.iter().enumerate().filter(|(_, p)| p.key == key);
            let found = if newest { matching.last() } else { matching.next() };
            let index = found
                .map(|(index, _)| index)
                .unwrap_or_else(|| panic!("no outstanding request {key}"));
            pending.remove(index)
        };
        let _ = pending.reply.send(result);
    }

    /// Answer the oldest outstanding request with this key
    pub fn reply_ok<T: Serialize>(&self, key: &str, body: &T) {
        self.reply(key, false, Ok(serde_json::to_value(body).unwrap()));
    }

    /// Answer the most recent outstanding request with this key
    pub fn reply_newest_ok<T: Serialize>(&self, key: &str, body: &T) {
        self.reply(key, true, Ok(serde_json::to_value(body).unwrap()));
    }

    pub fn reply_err(&self, key: &str, status: u16, message: Option<&str>) {
        self.reply(key, false, Err(failure(status, message)));
    }
}

#[async_trait]
impl IncidentApi for GatedApi {
    async fn list_incidents(&self) -> ClientResult<Vec<Incident>> {
        self.call("list_incidents".into()).await
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.call("list_users".into()).await
    }

    async fn get_incident(&self, id: &str) -> ClientResult<Incident> {
        self.call(format!("get:{id}")).await
    }

    async fn create_incident(&self, _input: &CreateIncidentInput) -> ClientResult<Incident> {
        self.call("create".into()).await
    }

    async fn update_incident(
        &self,
        id: &str,
        _input: &UpdateIncidentInput,
    ) -> ClientResult<Incident> {
        self.call(format!("update:{id}")).await
    }
}
