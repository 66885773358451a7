//! Support endpoints: FAQ and inquiries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_gateway::{GatewayError, RequestSpec};

use crate::client::PortalClient;
use crate::page::{Page, PageQuery};

/// One FAQ entry.
#[derive(Debug, Clone, Deserialize)]
pub struct FaqItem {
    pub id: i64,
    pub category: String,
    pub question: String,
    pub answer: String,
}

/// Lifecycle of a support inquiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InquiryStatus {
    Open,
    Answered,
    Closed,
}

/// Staff answer attached to an inquiry.
#[derive(Debug, Clone, Deserialize)]
pub struct InquiryAnswer {
    pub content: String,
    pub answered_at: DateTime<Utc>,
}

/// A support inquiry, as listed or fetched.
#[derive(Debug, Clone, Deserialize)]
pub struct Inquiry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
    pub answer: Option<InquiryAnswer>,
}

/// Body for opening an inquiry.
#[derive(Debug, Clone, Serialize)]
pub struct NewInquiry {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Support operations.
pub struct SupportApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl SupportApi<'_> {
    pub async fn faqs(&self) -> Result<Vec<FaqItem>, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::get("/support/faq"))
            .await
    }

    /// Open a new inquiry for the logged-in user.
    pub async fn create_inquiry(&self, inquiry: &NewInquiry) -> Result<Inquiry, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::post("/support/inquiries").json(inquiry)?)
            .await
    }

    /// List the logged-in user's inquiries.
    pub async fn inquiries(&self, page: PageQuery) -> Result<Page<Inquiry>, GatewayError> {
        self.client
            .gateway()
            .fetch(page.apply(RequestSpec::get("/support/inquiries")))
            .await
    }

    pub async fn inquiry(&self, id: i64) -> Result<Inquiry, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::get(format!("/support/inquiries/{id}")))
            .await
    }
}
