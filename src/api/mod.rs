//! Backend API access.
//!
//! `transport` normalizes HTTP failures; `client` maps the `/api` endpoints
//! onto typed calls.

pub mod client;
pub mod transport;

pub use client::{DEFAULT_PDF_FILE_NAME, PrepSmartApi, ResultSource, TaskSubmitter};
pub use transport::{ApiResponse, Payload, RequestOptions, Transport};
