//! Remote gateway: the request/response boundary to the incident API

use crate::{ClientResult, NetworkHttpClient};
use async_trait::async_trait;
use shared::{CreateIncidentInput, Incident, UpdateIncidentInput, User};
use std::sync::Arc;

/// Incident API operations
///
/// Every call either returns the parsed resource(s) or a
/// [`ClientError`](crate::ClientError) carrying a human-readable message.
#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// `GET /api/incidents`
    async fn list_incidents(&self) -> ClientResult<Vec<Incident>>;

    /// `GET /api/users`
    async fn list_users(&self) -> ClientResult<Vec<User>>;

    /// `GET /api/incidents/{id}`
    async fn get_incident(&self, id: &str) -> ClientResult<Incident>;

    /// `POST /api/incidents`
    async fn create_incident(&self, input: &CreateIncidentInput) -> ClientResult<Incident>;

    /// `PATCH /api/incidents/{id}`
    async fn update_incident(
        &self,
        id: &str,
        input: &UpdateIncidentInput,
    ) -> ClientResult<Incident>;
}

#[async_trait]
impl IncidentApi for NetworkHttpClient {
    async fn list_incidents(&self) -> ClientResult<Vec<Incident>> {
        self.get(&["api", "incidents"]).await
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.get(&["api", "users"]).await
    }

    async fn get_incident(&self, id: &str) -> ClientResult<Incident> {
        self.get(&["api", "incidents", id]).await
    }

    async fn create_incident(&self, input: &CreateIncidentInput) -> ClientResult<Incident> {
        self.post(&["api", "incidents"], input).await
    }

    async fn update_incident(
        &self,
        id: &str,
        input: &UpdateIncidentInput,
    ) -> ClientResult<Incident> {
        self.patch(&["api", "incidents", id], input).await
    }
}

#[async_trait]
impl<T: IncidentApi + ?Sized> IncidentApi for Arc<T> {
    async fn list_incidents(&self) -> ClientResult<Vec<Incident>> {
        (**self).list_incidents().await
    }

    async fn list_users(&self) -> ClientResult<Vec<User>> {
        (**self).list_users().await
    }

    async fn get_incident(&self, id: &str) -> ClientResult<Incident> {
        (**self).get_incident(id).await
    }

    async fn create_incident(&self, input: &CreateIncidentInput) -> ClientResult<Incident> {
        (**self).create_incident(input).await
    }

    async fn update_incident(
        &self,
        id: &str,
        input: &UpdateIncidentInput,
    ) -> ClientResult<Incident> {
        (**self).update_incident(id, input).await
    }
}
