use std::{future::Future, time::Duration};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

/// A running poll loop. Stopping (or dropping) the handle cancels its token;
/// fetches already in flight see the cancelled token and must not apply
/// their result.
#[derive(Debug)]
pub struct PollHandle {
    id: Uuid,
    token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Fires `tick` right away and then every `interval`. Ticks are spawned,
    /// so a slow fetch never holds back the next one.
    pub fn spawn<F, Fut>(interval: Duration, tick: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = Uuid::new_v4();
        let token = CancellationToken::new();
        let loop_token = token.clone();
        let interval = interval.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            info!("Poller {} started, interval {:?}", id, interval);

            loop {
                tokio::select! {
                    biased;
                    _ = loop_token.cancelled() => break,
                    _ = ticker.tick() => {
                        tokio::spawn(tick(loop_token.clone()));
                    }
                }
            }

            debug!("Poller {} stopped", id);
        });

        Self {
            id,
            token,
            task: Some(task),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn is_running(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Cancels the loop and waits for it to exit. No tick fires afterwards.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
