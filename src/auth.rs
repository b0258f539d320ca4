//! Bearer-token claim decoding for display purposes.
//!
//! The payload segment of the JWT is base64url-decoded WITHOUT verifying the
//! signature. Claims read here (username, department code) are shown in the
//! UI only; the backend is the sole authority on permissions, and nothing in
//! this crate gates an operation on a decoded claim.

use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is not a JWT (expected three dot-separated segments)")]
    Malformed,
    #[error("Token payload is not valid base64url")]
    Encoding,
    #[error("Token payload is not valid JSON: {0}")]
    Payload(String),
}

/// Display claims carried in the bearer token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default, alias = "user", alias = "preferred_username")]
    pub username: Option<String>,
    #[serde(default, alias = "name")]
    pub nombre: Option<String>,
    /// Cost-center code of the user's department
    #[serde(default, alias = "codigo_departamento", alias = "department")]
    pub departamento: Option<String>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Best label for the signed-in user.
    pub fn display_name(&self) -> &str {
        self.nombre
            .as_deref()
            .or(self.username.as_deref())
            .or(self.sub.as_deref())
            .unwrap_or("desconocido")
    }
}

/// Decode the claims of a JWT without verifying it.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let token = token.trim().trim_start_matches("Bearer ").trim();
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(TokenError::Malformed),
    };

    // Some issuers pad the payload, URL_SAFE_NO_PAD rejects that.
    let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| TokenError::Encoding)?;

    serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))
}

/// In-memory session: the token plus the claims decoded from it.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    user: Option<TokenClaims>,
}

impl Session {
    /// Build a session from a token. Undecodable claims leave `current_user` empty.
    pub fn from_token(token: impl Into<String>) -> Self {
        let token = token.into();
        let user = match decode_claims(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                log::warn!("Could not decode token claims: {}", e);
                None
            }
        };
        Self {
            token: Some(token),
            user,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn current_user(&self) -> Option<&TokenClaims> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// True when the token carries an `exp` claim at or before `now`.
    pub fn is_expired(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.user
            .as_ref()
            .and_then(|u| u.exp)
            .map(|exp| exp <= now.timestamp())
            .unwrap_or(false)
    }

    pub fn logout(&mut self) {
        self.token = None;
        self.user = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload: &str) -> String {
        let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload);
        format!("eyJhbGciOiJIUzI1NiJ9.{}.signature", encoded)
    }

    #[test]
    fn test_decode_claims() {
        let token = make_token(
            r#"{"sub":"42","username":"mgarcia","codigo_departamento":"CC-07","exp":1700000000}"#,
        );
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.username.as_deref(), Some("mgarcia"));
        assert_eq!(claims.departamento.as_deref(), Some("CC-07"));
        assert_eq!(claims.display_name(), "mgarcia");
    }

    #[test]
    fn test_decode_accepts_bearer_prefix_and_padding() {
        let encoded = base64::engine::general_purpose::URL_SAFE.encode(r#"{"name":"Ana"}"#);
        let token = format!("Bearer h.{}.s", encoded);
        assert_eq!(decode_claims(&token).unwrap().display_name(), "Ana");
    }

    #[test]
    fn test_decode_rejects_malformed() {
        assert_eq!(decode_claims("abc"), Err(TokenError::Malformed));
        assert_eq!(decode_claims("a.b.c.d"), Err(TokenError::Malformed));
        assert_eq!(decode_claims("a.!!!.c"), Err(TokenError::Encoding));
    }

    #[test]
    fn test_session_logout_clears_state() {
        let mut session = Session::from_token(make_token(r#"{"username":"x"}"#));
        assert!(session.is_authenticated());
        assert!(session.current_user().is_some());
        session.logout();
        assert!(!session.is_authenticated());
        assert!(session.current_user().is_none());
    }

    #[test]
    fn test_session_expiry() {
        let session = Session::from_token(make_token(r#"{"exp":100}"#));
        let now = chrono::DateTime::from_timestamp(200, 0).unwrap();
        assert!(session.is_expired(now));
        let opaque = Session::from_token("opaque-token");
        assert!(opaque.current_user().is_none());
        assert!(!opaque.is_expired(now));
    }
}
