use std::{sync::Arc, time::Duration};

use backend::ApiError;
use common::models::{ActionAck, ActionPayload, Filter, Signal, SignalId};
use tokio::sync::{RwLock, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    services::poller::PollHandle,
    traits::SignalSource,
    transitions::{self, Decision},
};

/// What the desk currently shows. The list is a view copy and may briefly
/// disagree with the backend while a decision is in flight.
#[derive(Debug, Clone, Default)]
pub struct ReviewState {
    pub filter: Filter,
    pub signals: Vec<Signal>,
    pub loading: bool,
    pub last_error: Option<String>,
    pub selected: Option<Signal>,
    issued_seq: u64,
    applied_seq: u64,
    in_flight: usize,
}

impl ReviewState {
    pub fn find(&self, id: SignalId) -> Option<&Signal> {
        self.signals.iter().find(|s| s.id == id)
    }
}

/// Owns the review list: polling, filter switching and the optimistic
/// approve/reject workflow. Cheap to clone; clones share state.
pub struct ReviewController<S> {
    source: Arc<S>,
    state: Arc<RwLock<ReviewState>>,
    revision: Arc<watch::Sender<u64>>,
}

impl<S> Clone for ReviewController<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            state: self.state.clone(),
            revision: self.revision.clone(),
        }
    }
}

impl<S> ReviewController<S>
where
    S: SignalSource + 'static,
{
    pub fn new(source: Arc<S>) -> Self {
        Self::with_filter(source, Filter::default())
    }

    pub fn with_filter(source: Arc<S>, filter: Filter) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            source,
            state: Arc::new(RwLock::new(ReviewState {
                filter,
                ..Default::default()
            })),
            revision: Arc::new(revision),
        }
    }

    pub async fn snapshot(&self) -> ReviewState {
        self.state.read().await.clone()
    }

    pub async fn filter(&self) -> Filter {
        self.state.read().await.filter
    }

    /// Bumped every time the visible state changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Fetches the current filter's list. Fetch errors are not returned: the
    /// list empties and `last_error` is set. Returns whether the response was
    /// applied (stale or cancelled responses are dropped).
    pub async fn refresh(&self) -> bool {
        self.fetch_and_apply(None).await
    }

    /// Switches the collection and fetches it immediately. A running poller
    /// follows the new filter on its next tick.
    pub async fn set_filter(&self, filter: Filter) -> bool {
        {
            let mut state = self.state.write().await;
            if state.filter != filter {
                info!("Filter changed: {} -> {}", state.filter, filter);
                state.filter = filter;
                state.signals.clear();
                state.last_error = None;
            }
        }
        self.bump();
        self.refresh().await
    }

    pub fn start_polling(&self, interval: Duration) -> PollHandle {
        let controller = self.clone();
        PollHandle::spawn(interval, move |token| {
            let controller = controller.clone();
            async move {
                controller.fetch_and_apply(Some(token)).await;
            }
        })
    }

    pub async fn approve(&self, id: SignalId, payload: ActionPayload) -> Result<ActionAck, ApiError> {
        self.decide(id, Decision::Approve, payload).await
    }

    pub async fn reject(&self, id: SignalId, payload: ActionPayload) -> Result<ActionAck, ApiError> {
        self.decide(id, Decision::Reject, payload).await
    }

    /// Loads one signal for the detail view, falling back to the list copy
    /// when the single fetch fails.
    pub async fn open_detail(&self, id: SignalId) -> Option<Signal> {
        let fetched = self.source.get_one(id).await;

        let selected = {
            let mut state = self.state.write().await;
            let selected = match fetched {
                Ok(signal) => Some(signal),
                Err(e) => {
                    debug!("Detail fetch for {} failed, using list copy: {}", id, e);
                    state.find(id).cloned()
                }
            };
            state.selected = selected.clone();
            selected
        };

        self.bump();
        selected
    }

    pub async fn close_detail(&self) {
        self.state.write().await.selected = None;
        self.bump();
    }

    async fn decide(
        &self,
        id: SignalId,
        decision: Decision,
        payload: ActionPayload,
    ) -> Result<ActionAck, ApiError> {
        let (transition, baseline_seq) = {
            let mut state = self.state.write().await;
            let transition =
                transitions::apply_optimistic(&mut state.signals, id, decision.target_status());
            (transition, state.applied_seq)
        };
        self.bump();
        debug!(
            "Signal {} optimistically {} (was {:?})",
            id, transition.target, transition.previous
        );

        let result = match decision {
            Decision::Approve => self.source.approve(id, &payload).await,
            Decision::Reject => self.source.reject(id, &payload).await,
        };

        match result {
            Ok(ack) => {
                self.refresh().await;
                Ok(ack)
            }
            Err(e) => {
                warn!("{:?} of signal {} failed, reverting: {}", decision, id, e);
                // A list applied since the optimistic change is backend truth
                // and already supersedes it.
                let reverted = {
                    let mut state = self.state.write().await;
                    if state.applied_seq == baseline_seq {
                        transitions::revert(&mut state.signals, &transition)
                    } else {
                        debug!("Signal {} reconciled while in flight, keeping fetched status", id);
                        false
                    }
                };
                if reverted {
                    self.bump();
                }
                Err(e)
            }
        }
    }

    async fn fetch_and_apply(&self, cancel: Option<CancellationToken>) -> bool {
        let is_cancelled = || cancel.as_ref().is_some_and(CancellationToken::is_cancelled);

        let (seq, filter) = {
            let mut state = self.state.write().await;
            if is_cancelled() {
                debug!("Poller stopped, skipping fetch");
                return false;
            }
            state.issued_seq += 1;
            state.in_flight += 1;
            state.loading = true;
            (state.issued_seq, state.filter)
        };
        self.bump();

        let result = self.source.list(filter).await;

        let applied = {
            let mut state = self.state.write().await;
            state.in_flight -= 1;
            state.loading = state.in_flight > 0;

            if is_cancelled() {
                debug!("Dropping response #{} from a stopped poller", seq);
                false
            } else if seq <= state.applied_seq || filter != state.filter {
                debug!(
                    "Dropping stale response #{} ({}), latest applied #{}",
                    seq, filter, state.applied_seq
                );
                false
            } else {
                state.applied_seq = seq;
                match result {
                    Ok(signals) => {
                        debug!("Fetched {} {} signals", signals.len(), filter);
                        transitions::reconcile(&mut state.signals, signals);
                        state.last_error = None;
                    }
                    Err(e) => {
                        warn!("Failed to fetch {} signals: {}", filter, e);
                        state.signals.clear();
                        state.last_error = Some(e.to_string());
                    }
                }
                true
            }
        };

        self.bump();
        applied
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }
}
