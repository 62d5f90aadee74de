pub mod client;

use crate::domain::device::{Device, DeviceSummary};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::fmt::Debug;
use thiserror::Error;

/// The device registry as seen by the views: list, fetch one, approve one.
/// The registry owns the canonical records; implementations hold no cache.
#[async_trait]
pub trait DeviceRegistry: Debug + Send + Sync {
    async fn list_devices(&self) -> Result<Vec<DeviceSummary>, TransportError>;

    async fn get_device(&self, id: &str) -> Result<Device, TransportError>;

    /// Flips the device's approved flag. The response does not carry the
    /// updated record; callers re-fetch to observe the new state. Calling
    /// this on an already-approved device has registry-defined behavior,
    /// so no blind retry.
    async fn approve_device(&self, id: &str) -> Result<ApprovalResult, TransportError>;
}

#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct ApprovalResult {
    pub success: bool,
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("registry responded with {status}: {detail}")]
    Status { status: StatusCode, detail: String },
    #[error("malformed response body: {0}")]
    MalformedBody(#[source] reqwest::Error),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}
