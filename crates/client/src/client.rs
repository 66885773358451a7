//! Portal client construction and domain handles.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use portal_gateway::{CredentialStore, Gateway, SessionEvent, SessionFile, SessionSnapshot};

use crate::admin::AdminApi;
use crate::auth::AuthApi;
use crate::board::BoardApi;
use crate::config::PortalConfig;
use crate::error::ClientError;
use crate::news::NewsApi;
use crate::support::SupportApi;

/// Client for one portal backend.
///
/// Owns the gateway and credential store; endpoint access goes through the
/// domain handles (`auth()`, `news()`, `board()`, `support()`, `admin()`).
pub struct PortalClient {
    gateway: Gateway,
    store: Arc<CredentialStore>,
}

impl PortalClient {
    pub fn new(config: PortalConfig) -> Result<Self, ClientError> {
        // The cookie jar carries the long-lived session reference the
        // reissue endpoint relies on.
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        let store = Arc::new(CredentialStore::new());
        if let Some(path) = &config.session_file {
            let session_file = SessionFile::new(path.clone());
            // Hydrate before attaching the observer so startup does not
            // rewrite the file it just read.
            match session_file.load() {
                Ok(Some(snapshot)) => hydrate(&store, snapshot),
                Ok(None) => {}
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "ignoring unreadable session file")
                }
            }
            store.observe(Arc::new(session_file));
        }

        let gateway = Gateway::new(http, config.base_url.clone(), Arc::clone(&store))
            .extend_exempt(config.extra_exempt_paths.clone());

        Ok(Self { gateway, store })
    }

    /// Build a client from environment configuration.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(PortalConfig::from_env()?)
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Subscribe to session lifecycle events (e.g. to show a blocking
    /// "session expired" notice).
    pub fn subscribe_session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.gateway.subscribe_events()
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn news(&self) -> NewsApi<'_> {
        NewsApi { client: self }
    }

    pub fn board(&self) -> BoardApi<'_> {
        BoardApi { client: self }
    }

    pub fn support(&self) -> SupportApi<'_> {
        SupportApi { client: self }
    }

    pub fn admin(&self) -> AdminApi<'_> {
        AdminApi { client: self }
    }
}

fn hydrate(store: &Arc<CredentialStore>, snapshot: SessionSnapshot) {
    match (snapshot.access_token, snapshot.identity) {
        (Some(token), Some(identity)) => {
            debug!(username = %identity.username, "hydrated session from disk");
            store.set_session(token, identity);
        }
        (Some(token), None) => store.set_access_token(token),
        _ => {}
    }
}
