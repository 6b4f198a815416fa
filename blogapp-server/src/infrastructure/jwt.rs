use crate::domain::{Author, DomainError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    pub exp: usize,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(secret: &str) -> Result<Self, DomainError> {
        if secret.is_empty() {
            return Err(DomainError::InternalError(
                "JWT secret must not be empty".to_string(),
            ));
        }

        if secret.len() < 32 {
            tracing::warn!(
                "JWT secret is too short ({} chars). Minimum recommended is 32 chars.",
                secret.len()
            );
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn generate_token(&self, user_id: i64, username: String) -> Result<String, DomainError> {
        tracing::debug!(user_id, %username, "Generating token");

        let expiration = Utc::now()
            .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
            .ok_or_else(|| DomainError::InternalError("token expiry overflow".to_string()))?
            .timestamp() as usize;

        let claims = Claims {
            user_id,
            username,
            exp: expiration,
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode token: {}", e);
            DomainError::InternalError(format!("Failed to generate token: {}", e))
        })
    }

    /// Decodes a bearer token into the identity it was issued for.
    pub fn verify_token(&self, token: &str) -> Result<Author, DomainError> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                tracing::debug!("Token verified for user_id: {}", token_data.claims.user_id);
                Ok(Author {
                    id: token_data.claims.user_id,
                    username: token_data.claims.username,
                })
            }
            Err(e) => {
                tracing::warn!("Token verification failed: {}", e);
                Err(DomainError::Unauthorized(format!("Invalid token: {}", e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "a-test-secret-that-is-long-enough!!";

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let jwt = JwtService::new(SECRET).unwrap();
        let token = jwt.generate_token(4, "dora".to_string()).unwrap();

        let author = jwt.verify_token(&token).unwrap();
        assert_eq!(author.id, 4);
        assert_eq!(author.username, "dora");
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let issuer = JwtService::new("another-secret-that-is-long-enough!!").unwrap();
        let token = issuer.generate_token(4, "dora".to_string()).unwrap();

        let verifier = JwtService::new(SECRET).unwrap();
        assert!(matches!(
            verifier.verify_token(&token),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(JwtService::new("").is_err());
    }
}
