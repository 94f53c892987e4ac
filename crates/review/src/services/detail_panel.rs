use backend::ApiError;
use common::models::{ActionAck, ActionPayload, Signal, SignalId};

use crate::{services::review_controller::ReviewController, traits::SignalSource};

/// One signal's full context plus the operator's note. Decisions go back
/// through the controller; the panel closes itself when one succeeds.
pub struct DetailPanel<S> {
    controller: ReviewController<S>,
    signal: Signal,
    reason: String,
    open: bool,
}

impl<S> DetailPanel<S>
where
    S: SignalSource + 'static,
{
    /// `None` when the signal can neither be fetched nor found in the list.
    pub async fn open(controller: ReviewController<S>, id: SignalId) -> Option<Self> {
        let signal = controller.open_detail(id).await?;
        Some(Self {
            controller,
            signal,
            reason: String::new(),
            open: true,
        })
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn set_reason(&mut self, reason: impl Into<String>) {
        self.reason = reason.into();
    }

    pub fn actions_visible(&self) -> bool {
        self.open && self.signal.status.is_actionable()
    }

    pub fn context_pretty(&self) -> Option<String> {
        let context = self.signal.context()?;
        match context {
            serde_json::Value::String(raw) => Some(raw),
            other => serde_json::to_string_pretty(&other).ok(),
        }
    }

    pub async fn approve(&mut self) -> Result<ActionAck, ApiError> {
        let result = self
            .controller
            .approve(self.signal.id, self.payload())
            .await;
        self.close_on_success(result).await
    }

    pub async fn reject(&mut self) -> Result<ActionAck, ApiError> {
        let result = self
            .controller
            .reject(self.signal.id, self.payload())
            .await;
        self.close_on_success(result).await
    }

    pub async fn close(&mut self) {
        self.open = false;
        self.controller.close_detail().await;
    }

    fn payload(&self) -> ActionPayload {
        ActionPayload::with_reason(self.reason.clone())
    }

    async fn close_on_success(
        &mut self,
        result: Result<ActionAck, ApiError>,
    ) -> Result<ActionAck, ApiError> {
        if result.is_ok() {
            self.close().await;
        }
        result
    }
}
