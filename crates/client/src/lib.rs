//! Typed client for the portal REST API.
//!
//! Built on [`portal_gateway`]: every call goes through the authenticated
//! request gateway, which injects the bearer credential and transparently
//! recovers from expired-token failures with a coalesced reissue.
//!
//! # Example
//!
//! ```ignore
//! use portal_client::{PortalClient, PortalConfig, PageQuery};
//!
//! let client = PortalClient::new(PortalConfig::new("https://portal.example.com/api")?)?;
//! client.auth().login("jihye", "secret").await?;
//! let posts = client.board().list(PageQuery::default(), None).await?;
//! ```

mod admin;
mod auth;
mod board;
mod client;
mod config;
mod error;
mod news;
mod page;
mod support;

pub use admin::{AdminApi, AdminUser, DailyCount, DashboardStats};
pub use auth::{AuthApi, SignupRequest};
pub use board::{BoardApi, Comment, NewPost, Post, PostSummary, PostUpdate};
pub use client::PortalClient;
pub use config::{ConfigError, DEFAULT_BASE_URL, PortalConfig};
pub use error::ClientError;
pub use news::{NewsApi, NewsArticle, NewsSummary};
pub use page::{Page, PageQuery};
pub use support::{FaqItem, Inquiry, InquiryAnswer, InquiryStatus, NewInquiry, SupportApi};

// The gateway types callers interact with directly.
pub use portal_gateway::{
    CredentialStore, GatewayError, Identity, SessionEvent, SessionSnapshot,
};
