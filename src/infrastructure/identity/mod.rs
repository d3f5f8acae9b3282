use async_trait::async_trait;

use crate::core::errors::MakutaError;
use crate::core::models::AuthUser;

/// External identity layer: turns a bearer credential into a verified user,
/// or fails with `InvalidToken` / `AuthUnavailable`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, MakutaError>;
}

pub mod jwt;
