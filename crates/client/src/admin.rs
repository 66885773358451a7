//! Administration endpoints: dashboard statistics, user management,
//! board moderation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use portal_gateway::{GatewayError, RequestSpec};

use crate::client::PortalClient;
use crate::page::{Page, PageQuery};

/// Per-day activity counts for the dashboard charts.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub visits: u64,
    pub signups: u64,
}

/// Aggregate dashboard statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStats {
    pub total_users: u64,
    pub total_posts: u64,
    pub total_inquiries: u64,
    pub daily: Vec<DailyCount>,
}

/// One row of the admin user list.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub username: String,
    pub nickname: String,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Serialize)]
struct RoleUpdate<'a> {
    roles: &'a [String],
}

/// Administration operations. All of these require the ADMIN role; the
/// backend answers 4104 otherwise.
pub struct AdminApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl AdminApi<'_> {
    pub async fn stats(&self) -> Result<DashboardStats, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::get("/admin/stats"))
            .await
    }

    pub async fn users(&self, page: PageQuery) -> Result<Page<AdminUser>, GatewayError> {
        self.client
            .gateway()
            .fetch(page.apply(RequestSpec::get("/admin/users")))
            .await
    }

    /// Replace a user's role set.
    pub async fn set_user_roles(
        &self,
        user_id: i64,
        roles: &[String],
    ) -> Result<(), GatewayError> {
        let spec =
            RequestSpec::put(format!("/admin/users/{user_id}/roles")).json(&RoleUpdate { roles })?;
        self.client.gateway().send(spec).await.map(|_| ())
    }

    /// Remove a board post as moderator.
    pub async fn remove_post(&self, post_id: i64) -> Result<(), GatewayError> {
        self.client
            .gateway()
            .send(RequestSpec::delete(format!("/admin/posts/{post_id}")))
            .await
            .map(|_| ())
    }
}
