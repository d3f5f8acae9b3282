pub mod api;
pub mod config;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::MakutaError;
pub use crate::core::service::MakutaService;
pub use crate::infrastructure::identity::jwt::JwtVerifier;
pub use crate::infrastructure::storage::in_memory::InMemoryStorage;

#[cfg(test)]
mod tests;
