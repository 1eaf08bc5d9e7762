use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::store::UserId;

type HmacSha256 = Hmac<Sha256>;

pub const TOKEN_EXPIRY_SECONDS: u64 = 3600; // 1 hour

/// Identity carried inside a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id as assigned by the store
    pub sub: UserId,
    pub username: String,
    /// Issued at, unix seconds
    pub iat: u64,
    /// Expires at, unix seconds
    pub exp: u64,
}

/// Errors while issuing a token
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("system time error: {0}")]
    Clock(#[from] std::time::SystemTimeError),
    #[error("HMAC initialization error: {0}")]
    Key(String),
    #[error("claims serialization error: {0}")]
    Encode(#[from] serde_json::Error),
}

fn now_secs() -> Result<u64, std::time::SystemTimeError> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Generate a signed session token valid for one hour
///
/// # Returns
///
/// Token string in format: `base64url(claims).base64url(signature)`
///
/// # Errors
///
/// Returns an error if HMAC initialization fails or time is invalid
pub fn generate_session_token(
    user_id: &UserId,
    username: &str,
    secret_key: &str,
) -> Result<String, TokenError> {
    generate_session_token_at(user_id, username, secret_key, now_secs()?)
}

/// Generate a token as if issued at `issued_at` (unix seconds)
pub fn generate_session_token_at(
    user_id: &UserId,
    username: &str,
    secret_key: &str,
    issued_at: u64,
) -> Result<String, TokenError> {
    let claims = SessionClaims {
        sub: user_id.clone(),
        username: username.to_string(),
        iat: issued_at,
        exp: issued_at + TOKEN_EXPIRY_SECONDS,
    };

    let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?);

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| TokenError::Key(e.to_string()))?;
    mac.update(payload.as_bytes());
    let signature_b64 = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

    Ok(format!("{}.{}", payload, signature_b64))
}

/// Verify a session token and extract its claims
///
/// Returns `None` for a missing, malformed, tampered or expired token.
/// Uses constant-time comparison for the signature.
pub fn verify_session_token(token: Option<&str>, secret_key: &str) -> Option<SessionClaims> {
    verify_session_token_at(token, secret_key, now_secs().ok()?)
}

/// Verify a token against the clock value `now` (unix seconds)
pub fn verify_session_token_at(
    token: Option<&str>,
    secret_key: &str,
    now: u64,
) -> Option<SessionClaims> {
    let (payload, signature_b64) = token?.split_once('.')?;
    if signature_b64.contains('.') {
        return None;
    }

    // Signature first; claims are only parsed once they are authentic
    let provided_signature = URL_SAFE_NO_PAD.decode(signature_b64).ok()?;
    let mut mac_verify = HmacSha256::new_from_slice(secret_key.as_bytes()).ok()?;
    mac_verify.update(payload.as_bytes());
    mac_verify.verify_slice(&provided_signature).ok()?;

    let claims_json = URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: SessionClaims = serde_json::from_slice(&claims_json).ok()?;

    if now >= claims.exp {
        return None; // Token expired
    }

    Some(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserId {
        UserId::Int(1)
    }

    #[test]
    fn test_generate_and_verify_valid_token() {
        let secret = "test_secret_key_12345";

        let token = generate_session_token(&alice(), "alice", secret).unwrap();
        assert!(!token.is_empty());
        assert_eq!(token.matches('.').count(), 1);

        let claims = verify_session_token(Some(&token), secret).unwrap();
        assert_eq!(claims.sub, alice());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.exp - claims.iat, TOKEN_EXPIRY_SECONDS);
    }

    #[test]
    fn test_text_user_id_round_trips() {
        let secret = "test_secret";
        let id = UserId::Text("5f0c1b2e-uuid".to_string());

        let token = generate_session_token(&id, "bob", secret).unwrap();
        let claims = verify_session_token(Some(&token), secret).unwrap();
        assert_eq!(claims.sub, id);
    }

    #[test]
    fn test_verify_none_token() {
        assert!(verify_session_token(None, "test_secret_key").is_none());
    }

    #[test]
    fn test_verify_token_with_wrong_secret() {
        let token = generate_session_token(&alice(), "alice", "correct_secret").unwrap();
        assert!(verify_session_token(Some(&token), "wrong_secret").is_none());
    }

    #[test]
    fn test_expired_token_fails() {
        let secret = "test_secret";
        let issued_at = 1_700_000_000;
        let token = generate_session_token_at(&alice(), "alice", secret, issued_at).unwrap();

        // Valid throughout the window
        assert!(verify_session_token_at(Some(&token), secret, issued_at).is_some());
        assert!(
            verify_session_token_at(Some(&token), secret, issued_at + TOKEN_EXPIRY_SECONDS - 1)
                .is_some()
        );

        // Rejected from the expiry instant onwards
        for elapsed in [TOKEN_EXPIRY_SECONDS, TOKEN_EXPIRY_SECONDS + 1, 86_400] {
            assert!(verify_session_token_at(Some(&token), secret, issued_at + elapsed).is_none());
        }
    }

    #[test]
    fn test_old_token_rejected_by_wall_clock() {
        let secret = "test_secret";
        let two_hours_ago = now_secs().unwrap() - 2 * TOKEN_EXPIRY_SECONDS;
        let token = generate_session_token_at(&alice(), "alice", secret, two_hours_ago).unwrap();

        assert!(verify_session_token(Some(&token), secret).is_none());
    }

    #[test]
    fn test_malformed_tokens() {
        let secret = "test_secret";

        assert!(verify_session_token(Some(""), secret).is_none());
        assert!(verify_session_token(Some("no-dot"), secret).is_none());
        assert!(verify_session_token(Some("a.b.c"), secret).is_none());
        assert!(verify_session_token(Some("payload.!!!not-base64"), secret).is_none());
    }

    #[test]
    fn test_signed_garbage_payload_rejected() {
        // Correctly signed, but the payload is not claims JSON
        let secret = "test_secret";
        let payload = URL_SAFE_NO_PAD.encode(b"not json");
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(payload.as_bytes());
        let token = format!(
            "{}.{}",
            payload,
            URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
        );

        assert!(verify_session_token(Some(&token), secret).is_none());
    }

    #[test]
    fn test_tampered_payload() {
        let secret = "test_secret";
        let token = generate_session_token(&alice(), "alice", secret).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        // Re-encode claims for a different user, keep the old signature
        let forged_claims = SessionClaims {
            sub: UserId::Int(2),
            username: "mallory".to_string(),
            iat: 0,
            exp: u64::MAX,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}", forged_payload, signature);

        assert!(verify_session_token(Some(&forged), secret).is_none());
    }

    #[test]
    fn test_different_users_different_tokens() {
        let secret = "test_secret";

        let token1 = generate_session_token(&UserId::Int(1), "alice", secret).unwrap();
        let token2 = generate_session_token(&UserId::Int(2), "bob", secret).unwrap();
        assert_ne!(token1, token2);

        let claims1 = verify_session_token(Some(&token1), secret).unwrap();
        let claims2 = verify_session_token(Some(&token2), secret).unwrap();
        assert_eq!(claims1.username, "alice");
        assert_eq!(claims2.username, "bob");
    }
}
