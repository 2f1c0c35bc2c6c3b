//! Plan tracker: drives a polling session, feeds every snapshot through the
//! aggregator, and fetches the finished plan once the job completes.

use std::sync::Arc;

use tracing::{info, warn};

use crate::api::ResultSource;
use crate::crisis::TaskHandle;
use crate::error::{Error, ResultError};
use crate::plan::PlanResult;
use crate::session::{SessionStore, keys};

use super::aggregator::{DisplayModel, StatusAggregator};
use super::poller::{PollOptions, PollerSession, StatusSource};

/// How many times a `202 Not Ready` from the result endpoint is retried
/// after the status endpoint already reported completion.
const RESULT_RETRIES: u32 = 3;

pub struct PlanTracker<B> {
    backend: Arc<B>,
    options: PollOptions,
}

impl<B> PlanTracker<B>
where
    B: StatusSource + ResultSource + 'static,
{
    pub fn new(backend: Arc<B>, options: PollOptions) -> Self {
        Self { backend, options }
    }

    /// Create the polling session for a task. Keep its stopper to cancel
    /// tracking, e.g. when the user navigates away.
    pub fn session(&self, handle: TaskHandle) -> PollerSession {
        let source: Arc<dyn StatusSource> = self.backend.clone();
        PollerSession::new(source, handle, self.options)
    }

    /// Run `session` to completion, calling `on_display` with the initial
    /// model and after every snapshot, then fetch the plan.
    pub async fn track<F>(&self, session: PollerSession, mut on_display: F) -> Result<PlanResult, Error>
    where
        F: FnMut(&DisplayModel),
    {
        let handle = session.handle().clone();
        let mut aggregator = StatusAggregator::new();
        on_display(aggregator.current());

        session
            .run(|status| on_display(aggregator.update(status)))
            .await?;

        info!(task_id = %handle, "Plan ready, fetching result");
        self.fetch_result(&handle).await
    }

    /// [`track`](Self::track) the task whose handle is stored in `store`.
    /// When the job is over for good (not found, failed, timed out) the
    /// stored handle is removed so the next run does not chase it again.
    /// A stopped session keeps the handle.
    pub async fn track_stored<F>(
        &self,
        store: &dyn SessionStore,
        session: PollerSession,
        on_display: F,
    ) -> Result<PlanResult, Error>
    where
        F: FnMut(&DisplayModel),
    {
        let handle = session.handle().clone();
        let outcome = self.track(session, on_display).await;
        if matches!(&outcome, Err(Error::Poll(e)) if e.ends_task()) {
            info!(task_id = %handle, "Task is over, forgetting its handle");
            if let Err(remove_err) = store.remove(keys::TASK_ID).await {
                warn!("Failed to forget task handle {}: {}", handle, remove_err);
            }
        }
        outcome
    }

    async fn fetch_result(&self, handle: &TaskHandle) -> Result<PlanResult, Error> {
        let mut attempt = 0;
        loop {
            match self.backend.fetch_result(handle).await {
                Err(ResultError::NotReady { .. }) if attempt < RESULT_RETRIES => {
                    attempt += 1;
                    warn!(task_id = %handle, attempt, "Result not ready yet, retrying");
                    tokio::time::sleep(self.options.interval).await;
                }
                other => return Ok(other?),
            }
        }
    }
}
