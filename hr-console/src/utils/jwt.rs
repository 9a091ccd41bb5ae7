use crate::models::Role;
use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid JWT format")]
    Format,

    #[error("Failed to decode JWT payload: {0}")]
    Encoding(#[from] base64::DecodeError),

    #[error("Failed to parse JWT claims: {0}")]
    Claims(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtClaims {
    pub user_id: i64,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub exp: Option<i64>,
    #[serde(default)]
    pub iat: Option<i64>,
}

impl JwtClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Decode JWT claims without validation
///
/// The console only needs the identity embedded in its own access token to
/// restore a session offline. The signature is NOT checked; the server
/// remains the authority and rejects forged tokens with 401.
pub fn decode_jwt_claims(token: &str) -> Result<JwtClaims, TokenError> {
    let parts: Vec<&str> = token.split('.').collect();

    if parts.len() != 3 || parts[1].is_empty() {
        return Err(TokenError::Format);
    }

    // Issuers differ on padding and alphabet; accept both.
    let segment = parts[1].trim_end_matches('=');
    let payload = general_purpose::URL_SAFE_NO_PAD
        .decode(segment)
        .or_else(|_| general_purpose::STANDARD_NO_PAD.decode(segment))?;

    let claims: JwtClaims = serde_json::from_slice(&payload)?;

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(payload: &str) -> String {
        general_purpose::URL_SAFE_NO_PAD.encode(payload)
    }

    #[test]
    fn test_decode_jwt_claims() {
        let token = format!(
            "a.{}.c",
            encode(r#"{"user_id":7,"username":"alice","role":"admin"}"#)
        );

        let claims = decode_jwt_claims(&token).unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.expires_at().is_none());
    }

    #[test]
    fn test_decode_padded_payload_with_expiry() {
        let payload = general_purpose::URL_SAFE.encode(
            r#"{"user_id":2,"username":"bo","role":"user","exp":1767225600,"iat":1767222000}"#,
        );
        let claims = decode_jwt_claims(&format!("h.{}.s", payload)).unwrap();

        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1767225600);
    }

    #[test]
    fn test_rejects_malformed_tokens() {
        assert!(matches!(decode_jwt_claims("not-a-jwt"), Err(TokenError::Format)));
        assert!(matches!(decode_jwt_claims("a..c"), Err(TokenError::Format)));
        assert!(matches!(
            decode_jwt_claims("a.!!!.c"),
            Err(TokenError::Encoding(_))
        ));
        assert!(matches!(
            decode_jwt_claims(&format!("a.{}.c", encode("not json"))),
            Err(TokenError::Claims(_))
        ));
    }
}
