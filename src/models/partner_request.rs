//! Partner request model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

string_enum! {
    PartnerRequestStatus, "partner request status" {
        Pending => "pending",
        Contacted => "contacted",
        Approved => "approved",
        Rejected => "rejected",
    }
}

/// A prospective partner's contact request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerRequest {
    #[serde(rename = "request_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub message: String,
    pub status: PartnerRequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePartnerRequestInput {
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub company: Option<String>,
    pub message: String,
}

impl CreatePartnerRequestInput {
    pub fn into_request(self) -> PartnerRequest {
        PartnerRequest {
            id: super::new_id("req"),
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company.filter(|c| !c.trim().is_empty()),
            message: self.message,
            status: PartnerRequestStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
