pub mod errors;
pub mod models;
pub mod pagination;
pub mod service;
pub mod validate;

pub use errors::MakutaError;
pub use models::{AuthUser, Category, Currency, Transaction, TxType};
pub use service::MakutaService;
