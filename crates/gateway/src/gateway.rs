//! The authenticated request gateway.
//!
//! Wraps outbound calls to the portal backend: injects the bearer credential
//! for non-exempt paths, detects the expired-token code in failure envelopes,
//! and recovers through a coalesced reissue followed by a single replay of
//! the failed request. Refresh failure tears the session down (best-effort
//! logout, store clear, expired event) and surfaces the original failure.

use std::sync::Arc;

use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::envelope::Envelope;
use crate::error::GatewayError;
use crate::events::{SessionEvent, SessionEvents};
use crate::refresh::{RefreshCoordinator, RefreshError, RefreshOutcome, Ticket};
use crate::request::{ExemptPaths, LOGOUT_PATH, REISSUE_PATH, RequestSpec};
use crate::store::CredentialStore;

const BODY_SNIPPET_LEN: usize = 200;

/// Authenticated HTTP gateway for one backend.
///
/// One instance per application; all concurrent callers share its refresh
/// coordination state. Instances are independent, so tests can run several
/// against different backends without cross-talk.
pub struct Gateway {
    http: Client,
    base_url: Url,
    store: Arc<CredentialStore>,
    exempt: ExemptPaths,
    coordinator: RefreshCoordinator,
    events: SessionEvents,
}

impl Gateway {
    pub fn new(http: Client, base_url: Url, store: Arc<CredentialStore>) -> Self {
        Self {
            http,
            base_url,
            store,
            exempt: ExemptPaths::new(),
            coordinator: RefreshCoordinator::new(),
            events: SessionEvents::new(),
        }
    }

    /// Add paths to the credential-exemption set.
    pub fn extend_exempt<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exempt.extend(paths);
        self
    }

    pub fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// Subscribe to session lifecycle events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Send a request and return its envelope.
    ///
    /// Non-exempt requests carry the current access token and, on an
    /// expired-token failure, are replayed once after a coalesced reissue.
    #[instrument(skip(self, spec), fields(method = %spec.method(), path = %spec.path()))]
    pub async fn send(&self, spec: RequestSpec) -> Result<Envelope, GatewayError> {
        let exempt = spec.is_exempt() || self.exempt.contains(spec.path());
        match self.execute(&spec, exempt).await {
            Err(err) if !exempt && err.is_credential_expired() => {
                debug!("request failed with expired token; entering refresh");
                self.refresh_and_retry(&spec, err).await
            }
            result => result,
        }
    }

    /// Send a request and deserialize its `data` payload.
    pub async fn fetch<T: DeserializeOwned>(&self, spec: RequestSpec) -> Result<T, GatewayError> {
        let envelope = self.send(spec).await?;
        Ok(envelope.data_as()?)
    }

    /// One HTTP attempt: no retry, no refresh handling.
    async fn execute(&self, spec: &RequestSpec, exempt: bool) -> Result<Envelope, GatewayError> {
        let url = self.endpoint_url(spec.path());
        let mut request = self.http.request(spec.method().clone(), url);
        if !spec.query_pairs().is_empty() {
            request = request.query(spec.query_pairs());
        }
        if let Some(body) = spec.body() {
            request = request.json(body);
        }
        if !exempt {
            if let Some(token) = self.store.access_token() {
                request = request.bearer_auth(token);
            }
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        let envelope: Envelope = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(_) if status.is_success() => {
                return Err(GatewayError::MalformedResponse(snippet(&bytes)));
            }
            Err(_) => {
                return Err(GatewayError::Http {
                    status,
                    body: snippet(&bytes),
                });
            }
        };

        if envelope.is_success() && status.is_success() {
            Ok(envelope)
        } else if envelope.is_success() {
            // Status and body disagree; trust neither.
            Err(GatewayError::Http {
                status,
                body: snippet(&bytes),
            })
        } else {
            Err(GatewayError::Api {
                status,
                code: envelope.code,
                message: envelope.message,
            })
        }
    }

    /// Refresh-and-retry: await the coalesced reissue, then replay once.
    ///
    /// On refresh failure the original expired-token error is what the
    /// caller sees; the teardown already ran on the leader's side.
    async fn refresh_and_retry(
        &self,
        spec: &RequestSpec,
        original: GatewayError,
    ) -> Result<Envelope, GatewayError> {
        match self.coordinated_refresh().await {
            Ok(_) => {
                debug!("replaying request after token refresh");
                self.execute(spec, false).await
            }
            Err(refresh_err) => {
                warn!(error = %refresh_err, "session could not be recovered");
                Err(original)
            }
        }
    }

    /// At most one reissue call in flight; every concurrent caller observes
    /// the same outcome.
    async fn coordinated_refresh(&self) -> RefreshOutcome {
        match self.coordinator.join() {
            Ticket::Waiter(rx) => {
                debug!("reissue already in flight; awaiting its outcome");
                match rx.await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(RefreshError::Aborted),
                }
            }
            Ticket::Leader(guard) => {
                info!("access token expired; performing reissue");
                let outcome = self.perform_reissue().await;
                if let Err(err) = &outcome {
                    // Teardown before waiters resolve, so every caller
                    // observes the cleared store.
                    self.teardown(err).await;
                }
                guard.settle(outcome.clone());
                outcome
            }
        }
    }

    /// Leader path: call the reissue endpoint and publish the new token.
    ///
    /// The reissue request goes out exempt (it must never re-enter the
    /// refresh path) and relies on the transport's cookie jar to carry the
    /// long-lived session reference.
    async fn perform_reissue(&self) -> RefreshOutcome {
        let spec = RequestSpec::post(REISSUE_PATH);
        let envelope = self
            .execute(&spec, true)
            .await
            .map_err(to_refresh_error)?;

        let Some(token) = envelope.token_string() else {
            warn!("reissue response carried no token; failing closed");
            return Err(RefreshError::MissingToken);
        };

        let token = token.to_string();
        // Store write precedes waiter resolution.
        self.store.set_access_token(token.clone());
        debug!("access token refreshed");
        Ok(token)
    }

    /// Terminal failure: best-effort logout, clear the store, notify.
    async fn teardown(&self, err: &RefreshError) {
        warn!(error = %err, "token reissue failed; discarding session");

        let logout = RequestSpec::post(LOGOUT_PATH);
        if let Err(e) = self.execute(&logout, true).await {
            debug!(error = %e, "best-effort logout failed");
        }

        self.store.clear();
        self.events.emit(SessionEvent::Expired {
            reason: err.to_string(),
            at: Utc::now(),
        });
    }

    fn endpoint_url(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        url.set_path(&joined);
        url
    }
}

fn to_refresh_error(err: GatewayError) -> RefreshError {
    match err {
        GatewayError::Network(e) => RefreshError::Network(e.to_string()),
        GatewayError::Api { code, message, .. } => RefreshError::Rejected { code, message },
        other => RefreshError::Protocol(other.to_string()),
    }
}

fn snippet(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    if text.chars().count() <= BODY_SNIPPET_LEN {
        text.into_owned()
    } else {
        let mut s: String = text.chars().take(BODY_SNIPPET_LEN).collect();
        s.push_str("...");
        s
    }
}
