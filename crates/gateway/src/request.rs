//! Outbound request descriptors and the credential-exemption set.

use std::collections::HashSet;

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/auth/login";
/// Signup endpoint path.
pub const SIGNUP_PATH: &str = "/auth/signup";
/// Token reissue endpoint path.
pub const REISSUE_PATH: &str = "/auth/reissue";
/// Logout endpoint path.
pub const LOGOUT_PATH: &str = "/auth/logout";

/// Descriptor for one outbound API call.
///
/// Carries everything needed to send the request and, when it fails with an
/// expired access token, to replay it verbatim after a reissue.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    exempt: bool,
}

impl RequestSpec {
    /// Create a descriptor for `method` against `path`.
    ///
    /// Paths are normalized to a leading slash so they compare cleanly
    /// against the exemption set.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        Self {
            method,
            path,
            query: Vec::new(),
            body: None,
            exempt: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append a query pair.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Mark this request exempt from credential injection and expiry retry,
    /// regardless of the gateway's path-based exemption set.
    pub fn exempt(mut self) -> Self {
        self.exempt = true;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    pub fn is_exempt(&self) -> bool {
        self.exempt
    }
}

/// Paths never subject to credential injection or expiry retry.
///
/// Login and signup run before a credential exists; the reissue call must not
/// recurse into its own retry handling.
#[derive(Debug, Clone)]
pub struct ExemptPaths {
    paths: HashSet<String>,
}

impl ExemptPaths {
    /// The built-in set: login, signup, reissue.
    pub fn new() -> Self {
        let mut paths = HashSet::new();
        paths.insert(LOGIN_PATH.to_string());
        paths.insert(SIGNUP_PATH.to_string());
        paths.insert(REISSUE_PATH.to_string());
        Self { paths }
    }

    /// Add an additional exempt path.
    pub fn insert(&mut self, path: impl Into<String>) {
        let path = path.into();
        let path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
        self.paths.insert(path);
    }

    /// Extend with additional exempt paths.
    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for path in paths {
            self.insert(path);
        }
    }

    /// Whether `path` is exempt.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }
}

impl Default for ExemptPaths {
    fn default() -> Self {
        Self::new()
    }
}
