//! Common API utilities and shared types

use serde::{Deserialize, Serialize};

pub fn default_true() -> bool {
    true
}

/// Plain `{message}` acknowledgement
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `?status=` filter of admin listings
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

impl StatusQuery {
    /// The filter, with an empty value meaning none
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref().filter(|s| !s.is_empty())
    }
}

/// Body of the status update endpoints
#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}
