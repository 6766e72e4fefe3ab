use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::models::SessionToken;

/// Interval between poll ticks when none is given.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1500;

/// Handle on a running poll. Dropping it leaves the poll running; call
/// [`PollHandle::stop`] to abandon it.
pub struct PollHandle {
    cancel: CancellationToken,
    task: JoinHandle<Option<SessionToken>>,
}

impl PollHandle {
    /// Cancels the poll. No tick starts after this returns, and a tick in
    /// flight is dropped at its next suspension point.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// A token that cancels this poll, for wiring into a parent lifecycle.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Waits for the poll to end. `Some` when a token was found, `None`
    /// when it was stopped first.
    pub async fn wait(self) -> Option<SessionToken> {
        match self.task.await {
            Ok(found) => found,
            Err(e) => {
                warn!("Poll task ended abnormally: {}", e);
                None
            }
        }
    }
}

/// Runs `tick` every `delay`, the first time one `delay` after the call,
/// until a tick yields a token or `cancel` fires.
pub fn spawn_poll<F, Fut>(delay: Duration, cancel: CancellationToken, mut tick: F) -> PollHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Option<SessionToken>> + Send + 'static,
{
    // tokio intervals reject a zero period.
    let delay = delay.max(Duration::from_millis(1));
    let task_cancel = cancel.clone();

    let task = tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + delay, delay);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticks: u64 = 0;

        loop {
            tokio::select! {
                biased;
                _ = task_cancel.cancelled() => {
                    debug!(ticks, "Poll stopped before a token was found");
                    return None;
                }
                _ = ticker.tick() => {}
            }

            ticks += 1;
            let found = tokio::select! {
                biased;
                _ = task_cancel.cancelled() => {
                    debug!(ticks, "Poll stopped during a tick");
                    return None;
                }
                found = tick() => found,
            };

            if let Some(token) = found {
                info!(
                    event_name = "handler.poll.found",
                    event_domain = "handler",
                    ticks,
                    "Poll discovered a session token"
                );
                task_cancel.cancel();
                return Some(token);
            }
        }
    });

    PollHandle { cancel, task }
}
