use async_trait::async_trait;
use backend::{ApiError, SignalsApi};
use common::models::{ActionAck, ActionPayload, Filter, Signal, SignalId};

#[cfg(test)]
use mockall::automock;

/// The slice of the backend the review workflow depends on.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SignalSource: Send + Sync {
    async fn list(&self, filter: Filter) -> Result<Vec<Signal>, ApiError>;

    async fn get_one(&self, id: SignalId) -> Result<Signal, ApiError>;

    async fn approve(&self, id: SignalId, payload: &ActionPayload) -> Result<ActionAck, ApiError>;

    async fn reject(&self, id: SignalId, payload: &ActionPayload) -> Result<ActionAck, ApiError>;
}

#[async_trait]
impl SignalSource for SignalsApi {
    async fn list(&self, filter: Filter) -> Result<Vec<Signal>, ApiError> {
        SignalsApi::list(self, filter).await
    }

    async fn get_one(&self, id: SignalId) -> Result<Signal, ApiError> {
        SignalsApi::get_one(self, id).await
    }

    async fn approve(&self, id: SignalId, payload: &ActionPayload) -> Result<ActionAck, ApiError> {
        SignalsApi::approve(self, id, payload).await
    }

    async fn reject(&self, id: SignalId, payload: &ActionPayload) -> Result<ActionAck, ApiError> {
        SignalsApi::reject(self, id, payload).await
    }
}
