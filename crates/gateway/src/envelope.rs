//! Response envelope shared by every portal backend endpoint.
//!
//! The backend wraps all payloads as `{ "code": <i32>, "message": <str>, "data": <json> }`.
//! Application-level failures carry a non-zero `code` alongside a non-2xx HTTP status;
//! the code in the body, not the status line, is what drives credential handling.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reserved application result codes.
pub mod codes {
    /// Operation succeeded.
    pub const SUCCESS: i32 = 0;
    /// Access token expired; the request may be replayed after a reissue.
    pub const TOKEN_EXPIRED: i32 = 4101;
    /// Access token malformed or unknown; re-login required.
    pub const TOKEN_INVALID: i32 = 4102;
    /// Session reference missing or expired; reissue is not possible.
    pub const SESSION_NOT_FOUND: i32 = 4103;
    /// Authenticated but not authorized for the resource.
    pub const FORBIDDEN: i32 = 4104;
}

/// Parsed response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Application result code (`codes::SUCCESS` on success).
    pub code: i32,
    /// Human-readable outcome description.
    #[serde(default)]
    pub message: String,
    /// Endpoint payload; `null` for operations without a result body.
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    /// Whether the application-level code signals success.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.code == codes::SUCCESS
    }

    /// Whether the code signals an expired access token.
    #[inline]
    pub fn is_token_expired(&self) -> bool {
        self.code == codes::TOKEN_EXPIRED
    }

    /// Deserialize `data` into a concrete payload type.
    pub fn data_as<T: serde::de::DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.clone())
    }

    /// Extract `data` as a non-empty token string.
    ///
    /// Returns `None` for null, non-string, or empty-string payloads so a
    /// success-shaped reissue response without a usable credential is never
    /// mistaken for a refresh result.
    pub fn token_string(&self) -> Option<&str> {
        match self.data.as_str() {
            Some(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parses_success_envelope() {
        let env: Envelope =
            serde_json::from_str(r#"{"code":0,"message":"ok","data":{"id":7}}"#).unwrap();
        assert!(env.is_success());
        assert_eq!(env.message, "ok");
        assert_eq!(env.data["id"], 7);
    }

    #[test]
    fn test_missing_fields_default() {
        let env: Envelope = serde_json::from_str(r#"{"code":4101}"#).unwrap();
        assert!(env.is_token_expired());
        assert!(env.message.is_empty());
        assert!(env.data.is_null());
    }

    #[rstest]
    #[case(r#"{"code":0,"data":"tok-2"}"#, Some("tok-2"))]
    #[case(r#"{"code":0,"data":""}"#, None)]
    #[case(r#"{"code":0,"data":null}"#, None)]
    #[case(r#"{"code":0}"#, None)]
    #[case(r#"{"code":0,"data":{"token":"tok-2"}}"#, None)]
    fn test_token_string_is_fail_closed(#[case] body: &str, #[case] expected: Option<&str>) {
        let env: Envelope = serde_json::from_str(body).unwrap();
        assert_eq!(env.token_string(), expected);
    }

    #[test]
    fn test_data_as_typed() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Item {
            id: i64,
            title: String,
        }

        let env: Envelope =
            serde_json::from_str(r#"{"code":0,"message":"ok","data":{"id":3,"title":"hello"}}"#)
                .unwrap();
        let item: Item = env.data_as().unwrap();
        assert_eq!(
            item,
            Item {
                id: 3,
                title: "hello".to_string()
            }
        );
    }
}
