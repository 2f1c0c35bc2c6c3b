//! WizardManager: coordinates the wizard state machine, session persistence,
//! and task submission.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::TaskSubmitter;
use crate::crisis::{CrisisMode, TaskHandle};
use crate::error::{SessionError, WizardError};
use crate::session::{SessionStore, keys};

use super::fields::WizardStep;
use super::record;
use super::state::WizardState;

pub struct WizardManager {
    store: Arc<dyn SessionStore>,
    state: WizardState,
}

impl WizardManager {
    /// Start a fresh questionnaire.
    pub fn new(
        store: Arc<dyn SessionStore>,
        crisis_mode: CrisisMode,
        specific_threat: impl Into<String>,
    ) -> Self {
        Self {
            store,
            state: WizardState::new(crisis_mode, specific_threat),
        }
    }

    /// Restore the questionnaire saved in this session, if any. The restored
    /// wizard starts again at step 1 with its fields pre-filled. A stored
    /// record that cannot be read back is removed and `None` is returned.
    pub async fn resume(store: Arc<dyn SessionStore>) -> Result<Option<Self>, SessionError> {
        let value = match store.get(keys::FORM_DATA).await {
            Ok(Some(value)) => value,
            Ok(None) => return Ok(None),
            Err(SessionError::Serialization(e)) => {
                warn!("Discarding unreadable wizard record: {}", e);
                store.remove(keys::FORM_DATA).await?;
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        Ok(record::decode(value).map(|rec| {
            debug!(
                mode = %rec.crisis_mode,
                fields = rec.fields.len(),
                "Restored wizard record from session"
            );
            Self {
                store,
                state: WizardState::from_record(rec),
            }
        }))
    }

    /// Resume the saved questionnaire when it was for the same crisis,
    /// otherwise start over.
    pub async fn resume_or_new(
        store: Arc<dyn SessionStore>,
        crisis_mode: CrisisMode,
        specific_threat: &str,
    ) -> Result<Self, SessionError> {
        match Self::resume(store.clone()).await? {
            Some(manager)
                if manager.state.crisis_mode() == crisis_mode
                    && manager.state.record().specific_threat == specific_threat =>
            {
                Ok(manager)
            }
            _ => Ok(Self::new(store, crisis_mode, specific_threat)),
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), WizardError> {
        self.state.set_field(name, value)
    }

    /// Advance one step, saving the accumulated record on success.
    pub async fn next(&mut self) -> Result<WizardStep, WizardError> {
        let step = self.state.next()?;
        self.persist_record().await;
        Ok(step)
    }

    pub fn previous(&mut self) -> Result<WizardStep, WizardError> {
        self.state.previous()
    }

    /// Submit the reviewed profile. On success the handle is stored in the
    /// session and the wizard becomes terminal; on failure it stays on the
    /// review step so the user can retry.
    ///
    /// If the backend accepted the job but the handle could not be stored,
    /// the wizard is still terminal and the handle is returned inside
    /// [`WizardError::HandleNotPersisted`].
    pub async fn submit(&mut self, submitter: &dyn TaskSubmitter) -> Result<TaskHandle, WizardError> {
        let profile = self.state.build_profile()?;
        let handle = submitter.submit(&profile).await?;

        self.state.mark_submitted();
        info!(task_id = %handle, mode = %profile.crisis_mode, "Crisis profile submitted");

        if let Err(source) = self.store.set_task_handle(&handle).await {
            warn!("Failed to persist task handle {}: {}", handle, source);
            return Err(WizardError::HandleNotPersisted { handle, source });
        }
        Ok(handle)
    }

    async fn persist_record(&self) {
        let value = match record::encode(self.state.record()) {
            Ok(v) => v,
            Err(e) => {
                warn!("Failed to serialize wizard record: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(keys::FORM_DATA, &value).await {
            warn!("Failed to persist wizard record: {}", e);
        }
    }
}
