//! Payload decoding for compact `header.payload.signature` tokens.
//!
//! Only the middle segment is read. The signature segment is never checked,
//! so a [`DecodedUser`] is a display and routing hint, not proof of identity.

use std::fmt;

use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::{Engine, alphabet};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenDecodeError {
    #[error("token must have three dot-separated segments, found {found}")]
    SegmentCount { found: usize },
    #[error("token payload segment is empty")]
    EmptyPayload,
    #[error("token payload is not valid base64url: {0}")]
    Base64(String),
    #[error("token payload is not valid JSON: {0}")]
    Json(String),
    #[error("token payload must be a JSON object, found {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Manager, Role::Employee];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Manager => "Manager",
            Self::Employee => "Employee",
        }
    }

    /// Exact, case-sensitive match against the backend's role names.
    #[must_use]
    pub fn from_claim(raw: &str) -> Option<Self> {
        match raw {
            "Admin" => Some(Self::Admin),
            "Manager" => Some(Self::Manager),
            "Employee" => Some(Self::Employee),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Claims carried by the session token, exactly as encoded in its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecodedUser {
    claims: Map<String, Value>,
}

impl DecodedUser {
    pub fn from_claims(claims: Map<String, Value>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }

    pub fn into_claims(self) -> Map<String, Value> {
        self.claims
    }

    pub fn claim(&self, key: &str) -> Option<&Value> {
        self.claims.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.non_empty_str("name")
    }

    /// Raw role string as issued by the backend.
    pub fn role_claim(&self) -> Option<&str> {
        self.non_empty_str("role")
    }

    pub fn role(&self) -> Option<Role> {
        self.role_claim().and_then(Role::from_claim)
    }

    pub fn user_id(&self) -> Option<i64> {
        match self.claims.get("user_id")? {
            Value::Number(number) => number.as_i64(),
            Value::String(raw) => raw.trim().parse().ok(),
            _ => None,
        }
    }

    /// The `exp` claim, when present as seconds since the Unix epoch.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let seconds = match self.claims.get("exp")? {
            Value::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value.trunc() as i64))?,
            _ => return None,
        };
        DateTime::from_timestamp(seconds, 0)
    }

    /// Display hint only; page guards never consult expiry.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }

    fn non_empty_str(&self, key: &str) -> Option<&str> {
        self.claims
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Splits `token` into its three segments and parses the payload as a JSON
/// object. No signature verification is performed.
pub fn decode_token_payload(token: &str) -> Result<DecodedUser, TokenDecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    let [_, payload, _] = segments.as_slice() else {
        return Err(TokenDecodeError::SegmentCount {
            found: segments.len(),
        });
    };
    if payload.is_empty() {
        return Err(TokenDecodeError::EmptyPayload);
    }

    let bytes = PAYLOAD_ENGINE
        .decode(payload)
        .map_err(|error| TokenDecodeError::Base64(error.to_string()))?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|error| TokenDecodeError::Json(error.to_string()))?;

    match value {
        Value::Object(claims) => Ok(DecodedUser { claims }),
        other => Err(TokenDecodeError::NotAnObject(json_kind(&other))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD};
    use serde_json::json;

    use super::*;

    fn token_for(payload: &Value) -> String {
        let encoded = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("eyJhbGciOiJIUzI1NiJ9.{encoded}.c2lnbmF0dXJl")
    }

    #[test]
    fn decodes_payload_claims_exactly() {
        let payload = json!({"user_id": 7, "role": "Manager", "name": "Dana Reyes"});
        let user = decode_token_payload(&token_for(&payload)).expect("decoded");

        assert_eq!(Value::Object(user.claims().clone()), payload);
        assert_eq!(user.name(), Some("Dana Reyes"));
        assert_eq!(user.role(), Some(Role::Manager));
        assert_eq!(user.user_id(), Some(7));
    }

    #[test]
    fn accepts_padded_and_url_safe_payloads() {
        let payload = json!({"sub": "?>?~", "role": "Employee"});
        let padded = URL_SAFE.encode(payload.to_string());
        assert!(padded.contains('_') || padded.contains('-'));

        let token = format!("h.{padded}.s");
        let user = decode_token_payload(&token).expect("padded payload decodes");
        assert_eq!(user.role(), Some(Role::Employee));
    }

    #[test]
    fn rejects_wrong_segment_counts() {
        assert_eq!(
            decode_token_payload("not-a-token"),
            Err(TokenDecodeError::SegmentCount { found: 1 })
        );
        assert_eq!(
            decode_token_payload("a.b"),
            Err(TokenDecodeError::SegmentCount { found: 2 })
        );
        assert_eq!(
            decode_token_payload("a.b.c.d"),
            Err(TokenDecodeError::SegmentCount { found: 4 })
        );
    }

    #[test]
    fn rejects_garbled_payloads() {
        assert_eq!(
            decode_token_payload("a..c"),
            Err(TokenDecodeError::EmptyPayload)
        );
        assert!(matches!(
            decode_token_payload("a.!!!.c"),
            Err(TokenDecodeError::Base64(_))
        ));

        let not_json = URL_SAFE_NO_PAD.encode("role=Admin");
        assert!(matches!(
            decode_token_payload(&format!("a.{not_json}.c")),
            Err(TokenDecodeError::Json(_))
        ));

        assert_eq!(
            decode_token_payload(&token_for(&json!([1, 2]))),
            Err(TokenDecodeError::NotAnObject("array"))
        );
    }

    #[test]
    fn role_matching_is_case_sensitive() {
        let user = decode_token_payload(&token_for(&json!({"role": "admin"}))).expect("decoded");
        assert_eq!(user.role_claim(), Some("admin"));
        assert_eq!(user.role(), None);

        for role in Role::ALL {
            assert_eq!(Role::from_claim(role.as_str()), Some(role));
        }
    }

    #[test]
    fn missing_or_empty_fields_read_as_absent() {
        let user =
            decode_token_payload(&token_for(&json!({"name": "", "user_id": "42"}))).expect("decoded");
        assert_eq!(user.name(), None);
        assert_eq!(user.role_claim(), None);
        assert_eq!(user.user_id(), Some(42));
    }

    #[test]
    fn expiry_is_read_from_exp_claim() {
        let user =
            decode_token_payload(&token_for(&json!({"exp": 1_700_000_000}))).expect("decoded");
        let expires_at = user.expires_at().expect("exp present");
        assert_eq!(expires_at.timestamp(), 1_700_000_000);
        assert!(user.is_expired(expires_at));
        assert!(!user.is_expired(expires_at - chrono::Duration::seconds(1)));

        let no_exp = decode_token_payload(&token_for(&json!({}))).expect("decoded");
        assert_eq!(no_exp.expires_at(), None);
        assert!(!no_exp.is_expired(Utc::now()));
    }
}
