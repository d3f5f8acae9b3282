use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::errors::MakutaError;
use crate::core::models::{Category, Transaction};
use crate::infrastructure::storage::{CategoryQuery, Storage, TransactionQuery};

/// Keyed in-memory collections mirroring the external document store.
/// Used as the test double and for local runs without a configured backend.
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    transactions: Arc<RwLock<HashMap<String, Transaction>>>,
    categories: Arc<RwLock<HashMap<String, Category>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save_transaction(&self, tx: Transaction) -> Result<(), MakutaError> {
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.id.clone(), tx);
        Ok(())
    }

    async fn get_transaction(&self, id: &str) -> Result<Option<Transaction>, MakutaError> {
        let transactions = self.transactions.read().await;
        Ok(transactions.get(id).cloned())
    }

    async fn delete_transaction(&self, id: &str) -> Result<(), MakutaError> {
        let mut transactions = self.transactions.write().await;
        transactions.remove(id);
        Ok(())
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, MakutaError> {
        let transactions = self.transactions.read().await;
        let mut rows: Vec<Transaction> = transactions
            .values()
            .filter(|tx| tx.uid == query.uid)
            .filter(|tx| query.currency.is_none_or(|c| tx.currency == c))
            .filter(|tx| query.tx_type.is_none_or(|t| tx.tx_type == t))
            .filter(|tx| {
                query
                    .category_id
                    .as_deref()
                    .is_none_or(|c| tx.category_id.as_deref() == Some(c))
            })
            .filter(|tx| query.date_from.is_none_or(|from| tx.date >= from))
            .filter(|tx| query.date_to.is_none_or(|to| tx.date < to))
            .cloned()
            .collect();

        rows.sort_by(|a, b| (b.date, &b.id).cmp(&(a.date, &a.id)));

        if let Some((after_date, after_id)) = &query.start_after {
            rows.retain(|tx| (tx.date, &tx.id) < (*after_date, after_id));
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn save_category(&self, category: Category) -> Result<(), MakutaError> {
        let mut categories = self.categories.write().await;
        categories.insert(category.id.clone(), category);
        Ok(())
    }

    async fn get_category(&self, id: &str) -> Result<Option<Category>, MakutaError> {
        let categories = self.categories.read().await;
        Ok(categories.get(id).cloned())
    }

    async fn delete_category(&self, id: &str) -> Result<(), MakutaError> {
        let mut categories = self.categories.write().await;
        categories.remove(id);
        Ok(())
    }

    async fn list_categories(&self, query: &CategoryQuery) -> Result<Vec<Category>, MakutaError> {
        let categories = self.categories.read().await;
        let mut rows: Vec<Category> = categories
            .values()
            .filter(|c| c.uid == query.uid)
            .cloned()
            .collect();

        rows.sort_by(|a, b| (&a.name, &a.id).cmp(&(&b.name, &b.id)));

        if let Some((after_name, after_id)) = &query.start_after {
            rows.retain(|c| (&c.name, &c.id) > (after_name, after_id));
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }
}
