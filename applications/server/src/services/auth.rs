/// Authentication service - bearer token issue and verification
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use encore_core::UserId;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

impl AuthService {
    pub fn new(secret: String, access_expiration_hours: u64) -> Self {
        Self {
            secret,
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
        }
    }

    /// Create an access token for a user
    pub fn create_access_token(&self, user_id: UserId) -> Result<String> {
        let now = Utc::now();
        let exp = now + self.access_token_expiration;

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())?;
        Ok(token_data.claims)
    }

    /// Verify a token and return the user it was issued to
    pub fn verify_access_token(&self, token: &str) -> Result<UserId> {
        let claims = self.verify_token(token)?;
        claims
            .sub
            .parse::<UserId>()
            .map_err(|_| ServerError::Auth(format!("Invalid subject: {}", claims.sub)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation_and_verification() {
        let auth = AuthService::new("secret".to_string(), 24);

        let token = auth.create_access_token(42).unwrap();
        assert_eq!(auth.verify_access_token(&token).unwrap(), 42);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let issuer = AuthService::new("secret".to_string(), 24);
        let verifier = AuthService::new("another".to_string(), 24);

        let token = issuer.create_access_token(7).unwrap();
        assert!(matches!(
            verifier.verify_access_token(&token),
            Err(ServerError::Jwt(_))
        ));
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        let auth = AuthService::new("secret".to_string(), 24);
        let now = Utc::now();
        let claims = Claims {
            sub: "user-abc".to_string(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(matches!(
            auth.verify_access_token(&token),
            Err(ServerError::Auth(_))
        ));
    }
}
