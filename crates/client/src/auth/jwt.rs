//! Decode-only JWT inspection
//!
//! The client never validates tokens the server has already trusted; it only
//! needs the expiry claim to decide when to refresh. Signature verification
//! is deliberately absent.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: i64,
}

/// Extract the `exp` claim (seconds since epoch) from a JWT without
/// verifying its signature. Returns `None` for anything that is not a
/// decodable JWT; callers must treat that as already expired.
pub(crate) fn decode_expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    Some(claims.exp)
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::jwt.
    use super::*;

    fn encode_jwt(payload: &serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.sig")
    }

    #[test]
    fn decodes_expiry_claim() {
        let token = encode_jwt(&serde_json::json!({ "exp": 1_900_000_000, "sub": "u1" }));
        assert_eq!(decode_expiry(&token), Some(1_900_000_000));
    }

    #[test]
    fn missing_exp_defaults_to_zero() {
        let token = encode_jwt(&serde_json::json!({ "sub": "u1" }));
        assert_eq!(decode_expiry(&token), Some(0));
    }

    #[test]
    fn rejects_undecodable_tokens() {
        assert_eq!(decode_expiry("not-a-jwt"), None);
        assert_eq!(decode_expiry("a.%%%.c"), None);
        assert_eq!(decode_expiry(""), None);

        // Valid base64 but not JSON
        let garbage = format!("h.{}.s", URL_SAFE_NO_PAD.encode(b"garbage"));
        assert_eq!(decode_expiry(&garbage), None);
    }
}
