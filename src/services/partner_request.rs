//! Partner request service

use crate::db::repositories::PartnerRequestRepository;
use crate::models::{CreatePartnerRequestInput, PartnerRequest, PartnerRequestStatus};
use anyhow::Context;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum PartnerRequestServiceError {
    #[error("Partner request not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct PartnerRequestService {
    repo: Arc<dyn PartnerRequestRepository>,
}

impl PartnerRequestService {
    pub fn new(repo: Arc<dyn PartnerRequestRepository>) -> Self {
        Self { repo }
    }

    /// Store a new request with status pending
    pub async fn submit(
        &self,
        input: CreatePartnerRequestInput,
    ) -> Result<PartnerRequest, PartnerRequestServiceError> {
        if input.name.trim().is_empty() {
            return Err(PartnerRequestServiceError::ValidationError(
                "Name cannot be empty".to_string(),
            ));
        }
        let request = input.into_request();
        let request = self
            .repo
            .create(&request)
            .await
            .context("Failed to create partner request")?;
        tracing::info!("Received partner request {}", request.id);
        Ok(request)
    }

    /// Requests newest first, optionally by status
    pub async fn list(
        &self,
        status: Option<&str>,
    ) -> Result<Vec<PartnerRequest>, PartnerRequestServiceError> {
        let status = status.map(parse_status).transpose()?;
        Ok(self
            .repo
            .list(status)
            .await
            .context("Failed to list partner requests")?)
    }

    pub async fn update_status(&self, id: &str, status: &str) -> Result<(), PartnerRequestServiceError> {
        let status = parse_status(status)?;
        let updated = self
            .repo
            .update_status(id, status)
            .await
            .context("Failed to update partner request")?;
        if !updated {
            return Err(PartnerRequestServiceError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub async fn count_pending(&self) -> Result<i64, PartnerRequestServiceError> {
        Ok(self
            .repo
            .count_by_status(PartnerRequestStatus::Pending)
            .await
            .context("Failed to count partner requests")?)
    }
}

fn parse_status(value: &str) -> Result<PartnerRequestStatus, PartnerRequestServiceError> {
    value
        .parse()
        .map_err(|e: anyhow::Error| PartnerRequestServiceError::ValidationError(e.to_string()))
}
