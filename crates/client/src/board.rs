//! Community board endpoints: posts and their comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use portal_gateway::{GatewayError, RequestSpec};

use crate::client::PortalClient;
use crate::page::{Page, PageQuery};

/// One row of the post list.
#[derive(Debug, Clone, Deserialize)]
pub struct PostSummary {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comment_count: u32,
    #[serde(default)]
    pub views: u64,
}

/// Full post.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating a post.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
}

/// Partial update of an existing post.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// A comment on a post.
#[derive(Debug, Clone, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct NewComment<'a> {
    content: &'a str,
}

/// Board operations.
pub struct BoardApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl BoardApi<'_> {
    /// List posts, optionally filtered by a search term.
    pub async fn list(
        &self,
        page: PageQuery,
        search: Option<&str>,
    ) -> Result<Page<PostSummary>, GatewayError> {
        let mut spec = page.apply(RequestSpec::get("/board/posts"));
        if let Some(term) = search {
            spec = spec.query("search", term);
        }
        self.client.gateway().fetch(spec).await
    }

    pub async fn get(&self, id: i64) -> Result<Post, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::get(format!("/board/posts/{id}")))
            .await
    }

    pub async fn create(&self, post: &NewPost) -> Result<Post, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::post("/board/posts").json(post)?)
            .await
    }

    pub async fn update(&self, id: i64, update: &PostUpdate) -> Result<Post, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::put(format!("/board/posts/{id}")).json(update)?)
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<(), GatewayError> {
        self.client
            .gateway()
            .send(RequestSpec::delete(format!("/board/posts/{id}")))
            .await
            .map(|_| ())
    }

    pub async fn comments(&self, post_id: i64) -> Result<Vec<Comment>, GatewayError> {
        self.client
            .gateway()
            .fetch(RequestSpec::get(format!("/board/posts/{post_id}/comments")))
            .await
    }

    pub async fn add_comment(&self, post_id: i64, content: &str) -> Result<Comment, GatewayError> {
        let spec = RequestSpec::post(format!("/board/posts/{post_id}/comments"))
            .json(&NewComment { content })?;
        self.client.gateway().fetch(spec).await
    }

    pub async fn delete_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<(), GatewayError> {
        self.client
            .gateway()
            .send(RequestSpec::delete(format!(
                "/board/posts/{post_id}/comments/{comment_id}"
            )))
            .await
            .map(|_| ())
    }
}
