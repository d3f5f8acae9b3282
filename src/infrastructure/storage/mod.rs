use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::errors::MakutaError;
use crate::core::models::{Category, Currency, Transaction, TxType};

/// Filters for listing a user's transactions.
///
/// `date_from` is inclusive and `date_to` is exclusive (`[from, to)`), both
/// UTC. Results are ordered by `(date DESC, id DESC)`; the id tiebreak keeps
/// pagination deterministic when two transactions share a date.
#[derive(Clone, Debug, Default)]
pub struct TransactionQuery {
    pub uid: String,
    pub currency: Option<Currency>,
    pub tx_type: Option<TxType>,
    pub category_id: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
    /// Sort key of the cursor document; only rows strictly after it in the
    /// established order are returned.
    pub start_after: Option<(DateTime<Utc>, String)>,
    pub limit: Option<usize>,
}

/// Filters for listing a user's categories, ordered by `(name ASC, id ASC)`.
#[derive(Clone, Debug, Default)]
pub struct CategoryQuery {
    pub uid: String,
    pub start_after: Option<(String, String)>,
    pub limit: Option<usize>,
}

/// Persistence abstraction over a per-user keyed collection with equality
/// and range filters. Writes are whole-document; read-modify-write patches
/// are not atomic against concurrent patches (last write wins).
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save_transaction(&self, tx: Transaction) -> Result<(), MakutaError>;
    async fn get_transaction(&self, id: &str) -> Result<Option<Transaction>, MakutaError>;
    async fn delete_transaction(&self, id: &str) -> Result<(), MakutaError>;
    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, MakutaError>;

    async fn save_category(&self, category: Category) -> Result<(), MakutaError>;
    async fn get_category(&self, id: &str) -> Result<Option<Category>, MakutaError>;
    async fn delete_category(&self, id: &str) -> Result<(), MakutaError>;
    async fn list_categories(&self, query: &CategoryQuery) -> Result<Vec<Category>, MakutaError>;
}

pub mod in_memory;
