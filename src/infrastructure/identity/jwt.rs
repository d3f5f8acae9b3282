use async_trait::async_trait;
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::core::errors::MakutaError;
use crate::core::models::AuthUser;
use crate::infrastructure::identity::IdentityProvider;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    exp: usize,
}

/// Verifies HS256 bearer tokens issued by the identity service.
pub struct JwtVerifier {
    secret: String,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        JwtVerifier {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, MakutaError> {
        if self.secret.is_empty() {
            return Err(MakutaError::AuthUnavailable);
        }
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|_| MakutaError::InvalidToken)?;

        Ok(AuthUser {
            uid: token_data.claims.sub,
            email: token_data.claims.email,
        })
    }
}
