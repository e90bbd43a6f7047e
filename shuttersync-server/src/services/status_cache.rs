use std::sync::{Arc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use shuttersync_api::DeviceStatus;
use tokio::sync::{Mutex, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::configs::Polling;
use crate::errors::DeviceError;
use crate::services::RollerDevice;

pub type StatusResult = Result<DeviceStatus, DeviceError>;

/// Called with every status that was actually fetched from the device,
/// before any waiter is resolved. Cache hits and failures are not reported.
#[async_trait]
pub trait StatusListener: Send + Sync {
    async fn on_status(&self, status: &DeviceStatus);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStrategy {
    /// A timer refreshes the status, faster while the roller moves
    Poll,
    /// The device pushes notifications, no timer is scheduled
    Push,
}

#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub moving_interval: Duration,
    pub idle_interval: Duration,
    pub strategy: RefreshStrategy,
}

impl CachePolicy {
    pub fn from_settings(polling: &Polling, strategy: RefreshStrategy) -> Self {
        Self {
            moving_interval: polling.moving_interval(),
            idle_interval: polling.idle_interval(),
            strategy,
        }
    }

    /// Maximum age of a cached status, and the delay until the next
    /// scheduled refresh.
    pub fn freshness_window(&self, status: Option<&DeviceStatus>) -> Duration {
        match status {
            Some(status) if !status.is_stopped() => self.moving_interval,
            _ => self.idle_interval,
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::from_settings(&Polling::default(), RefreshStrategy::Poll)
    }
}

struct ScheduledRefresh {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Default)]
struct CacheState {
    status: Option<DeviceStatus>,
    fetched_at: Option<Instant>,
    /// Non-empty exactly while a fetch is in flight
    waiters: Vec<oneshot::Sender<StatusResult>>,
    timer: Option<ScheduledRefresh>,
    generation: u64,
}

impl CacheState {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.handle.abort();
        }
    }
}

/// Single source of truth for the last known roller status.
///
/// Concurrent readers share one outbound fetch, and a fetch never runs
/// while another one is in flight.
pub struct StatusCache {
    device: Arc<dyn RollerDevice>,
    policy: CachePolicy,
    listener: Option<Arc<dyn StatusListener>>,
    state: Mutex<CacheState>,
    this: Weak<StatusCache>,
}

impl StatusCache {
    pub fn new(
        device: Arc<dyn RollerDevice>,
        policy: CachePolicy,
        listener: Option<Arc<dyn StatusListener>>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            device,
            policy,
            listener,
            state: Mutex::new(CacheState::default()),
            this: this.clone(),
        })
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Last fetched status without any I/O.
    pub async fn cached(&self) -> Option<DeviceStatus> {
        self.state.lock().await.status.clone()
    }

    pub async fn get_status(&self, forced: bool) -> StatusResult {
        let receiver = {
            let mut state = self.state.lock().await;

            if !state.waiters.is_empty() {
                debug!("Pushing status waiter to queue - updating");
                let (sender, receiver) = oneshot::channel();
                state.waiters.push(sender);
                receiver
            } else {
                if !forced {
                    if let (Some(status), Some(fetched_at)) = (&state.status, state.fetched_at) {
                        if fetched_at.elapsed() < self.policy.freshness_window(Some(status)) {
                            debug!("Returning cached status");
                            return Ok(status.clone());
                        }
                    }
                }

                state.cancel_timer();

                debug!("Executing update, forced: {}", forced);
                let (sender, receiver) = oneshot::channel();
                state.waiters.push(sender);
                self.spawn_fetch();
                receiver
            }
        };

        receiver
            .await
            .unwrap_or_else(|_| Err(DeviceError::Transport("status fetch was abandoned".into())))
    }

    /// Fetches the status and swallows the error, which the fetch already
    /// logged.
    pub async fn refresh(&self, forced: bool) -> Option<DeviceStatus> {
        debug!("Updating roller status");
        match self.get_status(forced).await {
            Ok(status) => Some(status),
            Err(e) => {
                debug!("Roller status update skipped: {}", e);
                None
            }
        }
    }

    /// Push notification from the device.
    pub async fn notify(&self) -> Option<DeviceStatus> {
        debug!("Status update notification received");
        self.refresh(true).await
    }

    pub async fn shutdown(&self) {
        self.state.lock().await.cancel_timer();
    }

    fn spawn_fetch(&self) {
        if let Some(cache) = self.this.upgrade() {
            tokio::spawn(async move { cache.fetch().await });
        }
    }

    async fn fetch(self: Arc<Self>) {
        let result = self.device.status().await;

        let mut state = self.state.lock().await;

        match &result {
            Ok(status) => {
                debug!("Done executing update");
                state.status = Some(status.clone());
                state.fetched_at = Some(Instant::now());

                if let Some(listener) = &self.listener {
                    listener.on_status(status).await;
                }
            }
            Err(e) => error!("Error fetching current status: {}", e),
        }

        let waiters = std::mem::take(&mut state.waiters);
        debug!("Resolving {} queued status waiters", waiters.len());
        for waiter in waiters {
            // The caller may have gone away, the others still get the result
            let _ = waiter.send(result.clone());
        }

        self.schedule_refresh(&mut state);
    }

    fn schedule_refresh(&self, state: &mut CacheState) {
        if self.policy.strategy == RefreshStrategy::Push {
            return;
        }

        state.cancel_timer();

        let delay = self.policy.freshness_window(state.status.as_ref());
        state.generation += 1;
        let generation = state.generation;
        let cache = self.this.clone();

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let Some(cache) = cache.upgrade() else {
                return;
            };

            {
                let mut state = cache.state.lock().await;
                if state.timer.as_ref().map(|timer| timer.generation) != Some(generation) {
                    return;
                }
                // Dropping our own handle detaches instead of aborting
                state.timer = None;
            }

            cache.refresh(true).await;
        });

        debug!("Next status refresh in {:?}", delay);
        state.timer = Some(ScheduledRefresh { generation, handle });
    }
}

impl Drop for StatusCache {
    fn drop(&mut self) {
        self.state.get_mut().cancel_timer();
    }
}
