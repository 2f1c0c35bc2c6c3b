//! Status poller: tracks one backend job from submission to a terminal state.
//!
//! A [`PollerSession`] is constructed per task and owned by the caller. It
//! yields a finite stream of [`JobStatus`] snapshots:
//! 1. Fetch immediately, then once per `interval` after the previous fetch settles
//! 2. End after a `completed` snapshot
//! 3. After a `failed` snapshot, yield [`PollError::JobFailed`] and end
//! 4. A 404 yields [`PollError::TaskNotFound`] and ends
//! 5. Other fetch failures are logged and retried on the next tick
//! 6. Once `max_wait` has elapsed, yield [`PollError::Timeout`] and end
//!
//! Stopping the session (or dropping its stream) prevents any further ticks
//! and callbacks. An in-flight request is not aborted, its outcome is discarded.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::crisis::TaskHandle;
use crate::error::{PollError, TransportError};

use super::aggregator::GENERIC_FAILURE;
use super::model::{JobState, JobStatus};

/// Anything that can fetch a status snapshot for a task.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, handle: &TaskHandle) -> Result<JobStatus, TransportError>;
}

/// Polling cadence and overall bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(2000),
            max_wait: Duration::from_millis(300_000),
        }
    }
}

impl From<&ClientConfig> for PollOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            interval: config.poll_interval,
            max_wait: config.max_wait,
        }
    }
}

/// Handle that stops a polling session. Cheap to clone; `stop` is idempotent.
#[derive(Debug, Clone)]
pub struct PollStopper {
    token: CancellationToken,
}

impl PollStopper {
    pub fn stop(&self) {
        self.token.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// One polling session for one task handle.
pub struct PollerSession {
    source: Arc<dyn StatusSource>,
    handle: TaskHandle,
    options: PollOptions,
    token: CancellationToken,
}

impl PollerSession {
    pub fn new(source: Arc<dyn StatusSource>, handle: TaskHandle, options: PollOptions) -> Self {
        Self {
            source,
            handle,
            options,
            token: CancellationToken::new(),
        }
    }

    pub fn handle(&self) -> &TaskHandle {
        &self.handle
    }

    /// A handle the caller can keep to stop this session from elsewhere.
    pub fn stopper(&self) -> PollStopper {
        PollStopper {
            token: self.token.clone(),
        }
    }

    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Turn the session into its stream of snapshots.
    ///
    /// The clock starts on the first poll of the stream. Dropping the stream
    /// stops the session.
    pub fn into_stream(self) -> impl Stream<Item = Result<JobStatus, PollError>> + Send + 'static {
        let ticker = Ticker {
            source: self.source,
            handle: self.handle,
            options: self.options,
            token: self.token.clone(),
            _guard: self.token.drop_guard(),
            started: None,
            pending_error: None,
            done: false,
        };

        futures::stream::unfold(ticker, |mut ticker| async move {
            let item = ticker.next_item().await?;
            Some((item, ticker))
        })
    }

    /// Poll until a terminal state, calling `on_update` with every snapshot
    /// (including the one that ends polling) before acting on it.
    ///
    /// Resolves with the `completed` snapshot; the full result must be
    /// fetched separately.
    pub async fn run<F>(self, mut on_update: F) -> Result<JobStatus, PollError>
    where
        F: FnMut(&JobStatus),
    {
        let mut stream = std::pin::pin!(self.into_stream());
        while let Some(item) = stream.next().await {
            let status = item?;
            on_update(&status);
            if status.status == JobState::Completed {
                return Ok(status);
            }
        }
        Err(PollError::Cancelled)
    }
}

struct Ticker {
    source: Arc<dyn StatusSource>,
    handle: TaskHandle,
    options: PollOptions,
    token: CancellationToken,
    _guard: DropGuard,
    started: Option<Instant>,
    pending_error: Option<PollError>,
    done: bool,
}

impl Ticker {
    async fn next_item(&mut self) -> Option<Result<JobStatus, PollError>> {
        loop {
            if self.done {
                return None;
            }
            if let Some(err) = self.pending_error.take() {
                self.done = true;
                return Some(Err(err));
            }
            if self.token.is_cancelled() {
                debug!(task_id = %self.handle, "Polling stopped");
                self.done = true;
                return None;
            }

            let started = match self.started {
                None => *self.started.insert(Instant::now()),
                Some(started) => {
                    tokio::select! {
                        _ = self.token.cancelled() => {
                            debug!(task_id = %self.handle, "Polling stopped");
                            self.done = true;
                            return None;
                        }
                        _ = tokio::time::sleep(self.options.interval) => {}
                    }
                    started
                }
            };

            let waited = started.elapsed();
            if waited > self.options.max_wait {
                warn!(task_id = %self.handle, ?waited, "Plan generation timed out");
                self.done = true;
                return Some(Err(PollError::Timeout { waited }));
            }

            let fetched = self.source.fetch_status(&self.handle).await;

            if self.token.is_cancelled() {
                debug!(task_id = %self.handle, "Polling stopped, discarding in-flight result");
                self.done = true;
                return None;
            }

            match fetched {
                Ok(status) => {
                    debug!(
                        task_id = %self.handle,
                        status = ?status.status,
                        progress = status.progress(),
                        agents = status.agents.len(),
                        "Status update"
                    );
                    match status.status {
                        JobState::Completed => {
                            info!(task_id = %self.handle, "Plan generation completed");
                            self.done = true;
                        }
                        JobState::Failed => {
                            let message = status
                                .error
                                .clone()
                                .filter(|e| !e.is_empty())
                                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                            warn!(task_id = %self.handle, "Plan generation failed: {message}");
                            self.pending_error = Some(PollError::JobFailed { message });
                        }
                        _ => {}
                    }
                    return Some(Ok(status));
                }
                Err(e) if e.is_not_found() => {
                    warn!(task_id = %self.handle, "Task not found, stopping");
                    self.done = true;
                    return Some(Err(PollError::TaskNotFound {
                        task_id: self.handle.to_string(),
                    }));
                }
                Err(e) => {
                    warn!(task_id = %self.handle, status = ?e.status, "Polling error (will retry): {e}");
                }
            }
        }
    }
}
