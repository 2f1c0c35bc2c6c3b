//! PrepSmart API client: task submission, status, result and PDF retrieval.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::config::ClientConfig;
use crate::crisis::{CrisisProfile, TaskHandle};
use crate::error::{ConfigError, ResultError, TransportError};
use crate::plan::PlanResult;
use crate::progress::model::JobStatus;
use crate::progress::poller::StatusSource;

use super::transport::{Payload, RequestOptions, Transport};

/// Default file name for a downloaded plan.
pub const DEFAULT_PDF_FILE_NAME: &str = "crisis-plan.pdf";

/// Anything that can start a plan-generation job.
#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    async fn submit(&self, profile: &CrisisProfile) -> Result<TaskHandle, TransportError>;
}

/// Anything that can fetch a finished plan.
#[async_trait]
pub trait ResultSource: Send + Sync {
    async fn fetch_result(&self, handle: &TaskHandle) -> Result<PlanResult, ResultError>;
}

#[derive(Deserialize)]
struct StartResponse {
    task_id: String,
}

/// Client for the `/api` endpoints.
#[derive(Debug, Clone)]
pub struct PrepSmartApi {
    transport: Transport,
}

impl PrepSmartApi {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            transport: Transport::new(config)?,
        })
    }

    pub fn with_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// `GET /health`. The body shape is not interpreted.
    pub async fn health(&self) -> Result<Value, TransportError> {
        self.transport
            .request("/health", RequestOptions::get())
            .await?
            .into_json()
    }

    /// `POST /crisis/start`: returns the handle of the new job.
    pub async fn start_crisis_plan(
        &self,
        profile: &CrisisProfile,
    ) -> Result<TaskHandle, TransportError> {
        let body = serde_json::to_value(profile)
            .map_err(|e| TransportError::network(format!("Failed to encode crisis profile: {e}")))?;
        let response = self
            .transport
            .request("/crisis/start", RequestOptions::post(body))
            .await?;
        let status = response.status;
        let start: StartResponse = serde_json::from_value(response.into_json()?).map_err(|e| {
            TransportError::http(status, format!("Malformed start response: {e}"))
        })?;

        let handle = TaskHandle::new(start.task_id);
        info!(task_id = %handle, mode = %profile.crisis_mode, "Crisis plan generation started");
        Ok(handle)
    }

    /// `GET /crisis/{task_id}/status`.
    pub async fn get_crisis_status(&self, handle: &TaskHandle) -> Result<JobStatus, TransportError> {
        let response = self
            .transport
            .request(&format!("/crisis/{handle}/status"), RequestOptions::get())
            .await?;
        let status = response.status;
        serde_json::from_value(response.into_json()?)
            .map_err(|e| TransportError::http(status, format!("Malformed status response: {e}")))
    }

    /// `GET /crisis/{task_id}/result`: 202 means the plan is not ready yet.
    pub async fn get_crisis_result(&self, handle: &TaskHandle) -> Result<PlanResult, ResultError> {
        let response = self
            .transport
            .request(&format!("/crisis/{handle}/result"), RequestOptions::get())
            .await?;
        if response.status == 202 {
            return Err(ResultError::NotReady {
                task_id: handle.to_string(),
            });
        }
        Ok(serde_json::from_value(response.into_json()?)?)
    }

    /// `GET /crisis/{task_id}/pdf`: the raw PDF bytes.
    pub async fn download_pdf(&self, handle: &TaskHandle) -> Result<Vec<u8>, ResultError> {
        let response = self
            .transport
            .request(&format!("/crisis/{handle}/pdf"), RequestOptions::get())
            .await?;
        if response.status == 202 {
            return Err(ResultError::NotReady {
                task_id: handle.to_string(),
            });
        }
        match response.payload {
            Payload::Binary(bytes) => Ok(bytes),
            Payload::Json(body) => Err(ResultError::UnexpectedBody(format!(
                "expected a PDF, got JSON: {body}"
            ))),
        }
    }

    /// Download the PDF and write it into `dir`, returning the written path.
    pub async fn save_pdf(
        &self,
        handle: &TaskHandle,
        dir: &Path,
        file_name: Option<&str>,
    ) -> Result<PathBuf, ResultError> {
        let bytes = self.download_pdf(handle).await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name.unwrap_or(DEFAULT_PDF_FILE_NAME));
        tokio::fs::write(&path, &bytes).await?;
        info!(task_id = %handle, path = %path.display(), bytes = bytes.len(), "Saved plan PDF");
        Ok(path)
    }
}

#[async_trait]
impl TaskSubmitter for PrepSmartApi {
    async fn submit(&self, profile: &CrisisProfile) -> Result<TaskHandle, TransportError> {
        self.start_crisis_plan(profile).await
    }
}

#[async_trait]
impl StatusSource for PrepSmartApi {
    async fn fetch_status(&self, handle: &TaskHandle) -> Result<JobStatus, TransportError> {
        self.get_crisis_status(handle).await
    }
}

#[async_trait]
impl ResultSource for PrepSmartApi {
    async fn fetch_result(&self, handle: &TaskHandle) -> Result<PlanResult, ResultError> {
        self.get_crisis_result(handle).await
    }
}

// HTTP behaviour is covered against a mock backend in tests/api_integration.rs.
