use common::models::{ActionAck, ActionPayload, Filter, ListParams, Signal, SignalId};
use serde_json::Value;
use tracing::{error, info};

use crate::{error::ApiError, remote::http_client::ApiClient};

/// One call per signal endpoint. Results come back in backend order and
/// errors are passed through untouched.
#[derive(Debug, Clone)]
pub struct SignalsApi {
    client: ApiClient,
}

impl SignalsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, filter: Filter) -> Result<Vec<Signal>, ApiError> {
        match filter {
            Filter::Pending => self.list_pending().await,
            Filter::Active => self.list_active().await,
            Filter::All => self.list_all(&ListParams::default()).await,
        }
    }

    pub async fn list_pending(&self) -> Result<Vec<Signal>, ApiError> {
        self.fetch_list("/signals/pending", None).await
    }

    pub async fn list_active(&self) -> Result<Vec<Signal>, ApiError> {
        self.fetch_list("/signals/active", None).await
    }

    pub async fn list_all(&self, params: &ListParams) -> Result<Vec<Signal>, ApiError> {
        self.fetch_list("/signals", Some(params)).await
    }

    pub async fn get_one(&self, id: SignalId) -> Result<Signal, ApiError> {
        self.client
            .get::<Signal, ()>(&format!("/signals/{}", id), None)
            .await
    }

    pub async fn approve(&self, id: SignalId, payload: &ActionPayload) -> Result<ActionAck, ApiError> {
        let ack = self
            .client
            .post(&format!("/signals/{}/approve", id), payload)
            .await?;
        info!("Signal {} approved", id);
        Ok(ack)
    }

    pub async fn reject(&self, id: SignalId, payload: &ActionPayload) -> Result<ActionAck, ApiError> {
        let ack = self
            .client
            .post(&format!("/signals/{}/reject", id), payload)
            .await?;
        info!("Signal {} rejected", id);
        Ok(ack)
    }

    /// Triggers the backend's active-signal update. No batch is sent: the
    /// backend replaces the whole active set with whatever it receives, so
    /// an empty list would deactivate everything. A backend that insists on
    /// a body answers with a validation error, returned as `Rejected`.
    pub async fn update_active(&self) -> Result<Value, ApiError> {
        self.client
            .post_empty::<Value>("/signals/update_active")
            .await
            .inspect_err(|e| error!("Error updating active signals: {}", e))
    }

    async fn fetch_list(
        &self,
        path: &str,
        params: Option<&ListParams>,
    ) -> Result<Vec<Signal>, ApiError> {
        let signals = self
            .client
            .get::<Option<Vec<Signal>>, ListParams>(path, params)
            .await?;
        Ok(signals.unwrap_or_default())
    }
}
