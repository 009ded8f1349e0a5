/// Bearer token issuance and validation
///
/// Tokens are stateless: all identity and role facts a handler needs are
/// carried in the signed claims, so no session store exists. Signing uses
/// HS256 with a symmetric secret from configuration.
///
/// # Claims
///
/// - `id`: user ID
/// - `sub`: username
/// - `first_name`, `last_name`: display fields
/// - `is_admin`: role flag used by the authorization gate
/// - `exp`: expiration (Unix timestamp); default ttl is 15 minutes
///
/// # Failure opacity
///
/// `validate_token` collapses every failure (bad signature, malformed
/// payload, expired token) into the single [`TokenError::Invalid`] variant.
/// Callers (and therefore clients) cannot distinguish which check failed.
///
/// # Example
///
/// ```
/// use taskhive_shared::auth::jwt::{issue_token, validate_token, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let claims = Claims::new(Uuid::new_v4(), "jdoe", "John", "Doe", false, Duration::minutes(15));
///
/// let token = issue_token(&claims, secret)?;
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, "jdoe");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default token lifetime in minutes
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// Error type for token operations
///
/// Validation failures are deliberately opaque: the variant carries no
/// information about which check rejected the token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to encode a token
    #[error("Failed to create token")]
    Encode,

    /// Token failed validation for any reason (signature, structure, expiry)
    #[error("Invalid authentication credentials")]
    Invalid,
}

/// Claims embedded in a bearer token
///
/// Everything the authorization gate and handlers need is here; no database
/// lookup happens during token validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: Uuid,

    /// Subject - the username
    pub sub: String,

    /// First name (display field)
    pub first_name: String,

    /// Last name (display field)
    pub last_name: String,

    /// Whether the user holds the admin role
    pub is_admin: bool,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims for a user with the given time-to-live
    pub fn new(
        id: Uuid,
        username: &str,
        first_name: &str,
        last_name: &str,
        is_admin: bool,
        ttl: Duration,
    ) -> Self {
        Self {
            id,
            sub: username.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            is_admin,
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    /// Checks if the claims have expired
    ///
    /// An `exp` equal to the current second counts as expired, so a token
    /// issued with a zero ttl is never valid.
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Creates a signed bearer token from claims
///
/// # Errors
///
/// Returns `TokenError::Encode` if encoding fails.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key).map_err(|_| TokenError::Encode)
}

/// Validates a bearer token and extracts its claims
///
/// Verifies the signature and expiry with zero leeway. Any failure yields
/// the same opaque [`TokenError::Invalid`].
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|_| TokenError::Invalid)?;

    // exp == now is expired; the decoder only rejects exp strictly in the past.
    if token_data.claims.is_expired() {
        return Err(TokenError::Invalid);
    }

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn sample_claims(ttl: Duration) -> Claims {
        Claims::new(Uuid::new_v4(), "jdoe", "John", "Doe", false, ttl)
    }

    #[test]
    fn test_issue_and_validate_roundtrip() {
        let claims = Claims::new(
            Uuid::new_v4(),
            "admin",
            "Ada",
            "Lovelace",
            true,
            Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        );
        let token = issue_token(&claims, SECRET).expect("Should create token");

        let validated = validate_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.id, claims.id);
        assert_eq!(validated.sub, "admin");
        assert_eq!(validated.first_name, "Ada");
        assert_eq!(validated.last_name, "Lovelace");
        assert!(validated.is_admin);
        assert_eq!(validated.exp, claims.exp);
    }

    #[test]
    fn test_zero_ttl_token_is_already_expired() {
        let claims = sample_claims(Duration::zero());
        assert!(claims.is_expired());

        let token = issue_token(&claims, SECRET).expect("Should create token");
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_expired_token_fails() {
        let claims = sample_claims(Duration::seconds(-3600));
        let token = issue_token(&claims, SECRET).expect("Should create token");

        assert!(matches!(
            validate_token(&token, SECRET),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_wrong_secret_fails_opaquely() {
        let claims = sample_claims(Duration::minutes(15));
        let token = issue_token(&claims, SECRET).expect("Should create token");

        // Wrong secret and expired token must be indistinguishable.
        assert!(matches!(
            validate_token(&token, "another-secret-key-of-sufficient-len"),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_tampered_token_fails() {
        let claims = sample_claims(Duration::minutes(15));
        let token = issue_token(&claims, SECRET).expect("Should create token");

        // Flip a character in the payload segment.
        let mut chars: Vec<char> = token.chars().collect();
        let mid = token.len() / 2;
        chars[mid] = if chars[mid] == 'a' { 'b' } else { 'a' };
        let tampered: String = chars.into_iter().collect();

        assert!(matches!(
            validate_token(&tampered, SECRET),
            Err(TokenError::Invalid)
        ));
    }

    #[test]
    fn test_garbage_token_fails() {
        assert!(matches!(
            validate_token("not.a.token", SECRET),
            Err(TokenError::Invalid)
        ));
        assert!(matches!(validate_token("", SECRET), Err(TokenError::Invalid)));
    }
}
