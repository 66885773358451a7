//! Authentication endpoints.

use serde::{Deserialize, Serialize};
use tracing::info;

use portal_gateway::{
    GatewayError, Identity, LOGIN_PATH, LOGOUT_PATH, RequestSpec, SIGNUP_PATH,
};

use crate::client::PortalClient;

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Login payload: the fresh access token plus the identity fields the store
/// keeps for the session.
#[derive(Debug, Clone, Deserialize)]
struct LoginData {
    access_token: String,
    username: String,
    nickname: String,
    #[serde(default)]
    roles: Vec<String>,
}

/// Signup request body.
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

/// Authentication operations.
pub struct AuthApi<'a> {
    pub(crate) client: &'a PortalClient,
}

impl AuthApi<'_> {
    /// Authenticate and establish the session.
    ///
    /// The login call goes out without credential injection; on success the
    /// store receives the access token and identity, and the transport's
    /// cookie jar picks up the session reference for later reissues.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, GatewayError> {
        let spec =
            RequestSpec::post(LOGIN_PATH).json(&LoginRequest { username, password })?;
        let data: LoginData = self.client.gateway().fetch(spec).await?;

        let identity = Identity {
            username: data.username,
            nickname: data.nickname,
            roles: data.roles,
        };
        self.client
            .store()
            .set_session(data.access_token, identity.clone());
        info!(username = %identity.username, "logged in");
        Ok(identity)
    }

    /// Register a new account.
    pub async fn signup(&self, request: &SignupRequest) -> Result<(), GatewayError> {
        self.client
            .gateway()
            .send(RequestSpec::post(SIGNUP_PATH).json(request)?)
            .await
            .map(|_| ())
    }

    /// End the session.
    ///
    /// The local session is cleared even when the backend call fails; the
    /// failure is still reported so callers can log it.
    pub async fn logout(&self) -> Result<(), GatewayError> {
        let result = self.client.gateway().send(RequestSpec::post(LOGOUT_PATH)).await;
        self.client.store().clear();
        result.map(|_| ())
    }

    /// Fetch the identity of the logged-in user.
    pub async fn me(&self) -> Result<Identity, GatewayError> {
        self.client.gateway().fetch(RequestSpec::get("/auth/me")).await
    }

    /// Change the account password.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), GatewayError> {
        let spec = RequestSpec::post("/auth/password").json(&ChangePasswordRequest {
            current_password,
            new_password,
        })?;
        self.client.gateway().send(spec).await.map(|_| ())
    }
}
