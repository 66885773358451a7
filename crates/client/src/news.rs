//! News feed endpoints.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use portal_gateway::{GatewayError, RequestSpec};

use crate::client::PortalClient;
use crate::page::{Page, PageQuery};

/// One row of the news list.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsSummary {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub summary: String,
}

/// Full news article.
#[derive(Debug, Clone, Deserialize)]
pub struct NewsArticle {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub published_at: DateTime<Utc>,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub views: u64,
}

/// News feed operations.
pub struct NewsApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl NewsApi<'_> {
    pub async fn list(&self, page: PageQuery) -> Result<Page<NewsSummary>, GatewayError> {
        self.client
            .gateway()
            .fetch(page.apply(RequestSpec::get("/news")))
            .await
    }

    pub async fn get(&self, id: i64) -> Result<NewsArticle, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::get(format!("/news/{id}")))
            .await
    }
}
