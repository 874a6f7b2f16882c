//! HS256 bearer tokens carrying the user id and email.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::models::user::User;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    pub fn issue(&self, user: &User, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user.id.0,
            email: user.email.clone(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        Ok(decode::<Claims>(token, &self.decoding, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserId;

    fn user() -> User {
        User {
            id: UserId(Uuid::new_v4()),
            email: "jane@example.com".into(),
        }
    }

    #[test]
    fn test_issued_token_verifies() {
        let tokens = TokenService::new("test-secret", 72);
        let user = user();
        let token = tokens.issue(&user, Utc::now()).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id.0);
        assert_eq!(claims.email, "jane@example.com");
        assert_eq!(claims.exp - claims.iat, 72 * 3600);
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("test-secret", 72);
        let issued = Utc::now() - Duration::hours(73);
        let token = tokens.issue(&user(), issued).unwrap();
        assert!(matches!(tokens.verify(&token), Err(AuthError::Token(_))));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let ours = TokenService::new("our-secret", 72);
        let theirs = TokenService::new("their-secret", 72);
        let token = theirs.issue(&user(), Utc::now()).unwrap();
        assert!(ours.verify(&token).is_err());
        assert!(ours.verify("not.a.token").is_err());
    }
}
