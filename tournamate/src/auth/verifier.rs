//! Access token verification.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::errors::{AuthError, AuthResult};
use super::models::Claims;
use crate::tournament::UserId;

/// Shortest accepted HMAC secret
pub const MIN_SECRET_LEN: usize = 32;

/// Verifies HS256 tokens issued by the identity provider
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    audience: Option<String>,
}

impl TokenVerifier {
    /// Create a verifier for `secret`, checking `aud` when `audience` is set
    pub fn new(secret: &str, audience: Option<String>) -> AuthResult<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthError::WeakSecret {
                min: MIN_SECRET_LEN,
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        match &audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            audience,
        })
    }

    /// Verify a token and return its claims
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Sign a token with the verifier's secret.
    ///
    /// Production tokens come from the identity provider; this serves local
    /// development and tests.
    pub fn issue(
        &self,
        user_id: UserId,
        email: Option<String>,
        ttl: Duration,
    ) -> AuthResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            email,
            aud: self.audience.clone(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_and_verify() {
        let verifier = TokenVerifier::new(SECRET, None).unwrap();
        let user = UserId::new_v4();
        let token = verifier
            .issue(user, Some("ann@example.com".to_string()), Duration::minutes(15))
            .unwrap();

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, user);
        assert_eq!(claims.email.as_deref(), Some("ann@example.com"));
    }

    #[test]
    fn test_expired_token() {
        let verifier = TokenVerifier::new(SECRET, None).unwrap();
        let token = verifier
            .issue(UserId::new_v4(), None, Duration::hours(-1))
            .unwrap();
        assert!(matches!(verifier.verify(&token), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenVerifier::new(SECRET, None).unwrap();
        let verifier = TokenVerifier::new(&"z".repeat(40), None).unwrap();
        let token = issuer
            .issue(UserId::new_v4(), None, Duration::minutes(5))
            .unwrap();
        assert!(matches!(
            verifier.verify(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_audience_checked_when_configured() {
        let other = TokenVerifier::new(SECRET, Some("other-app".to_string())).unwrap();
        let verifier = TokenVerifier::new(SECRET, Some("tournamate".to_string())).unwrap();
        let token = other
            .issue(UserId::new_v4(), None, Duration::minutes(5))
            .unwrap();
        assert!(verifier.verify(&token).is_err());

        let token = verifier
            .issue(UserId::new_v4(), None, Duration::minutes(5))
            .unwrap();
        assert!(verifier.verify(&token).is_ok());
    }

    #[test]
    fn test_garbage_token() {
        let verifier = TokenVerifier::new(SECRET, None).unwrap();
        assert!(matches!(
            verifier.verify("not.a.jwt"),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_short_secret_rejected() {
        assert!(matches!(
            TokenVerifier::new("short", None),
            Err(AuthError::WeakSecret { min: 32 })
        ));
    }
}
