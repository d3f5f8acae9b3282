mod envelope_tests;
mod transaction_tests;

use crate::core::service::{MakutaService, NewTransaction};
use crate::infrastructure::identity::jwt::JwtVerifier;
use crate::infrastructure::storage::in_memory::InMemoryStorage;

pub fn create_test_service() -> MakutaService<InMemoryStorage, JwtVerifier> {
    let storage = InMemoryStorage::new();
    let identity = JwtVerifier::new("test-secret");
    MakutaService::new(storage, identity)
}

pub fn expense(amount: f64, date: &str) -> NewTransaction {
    NewTransaction {
        tx_type: "expense".to_string(),
        amount,
        currency: "USD".to_string(),
        category_id: None,
        note: None,
        date: Some(date.to_string()),
    }
}

pub fn income(amount: f64, date: &str) -> NewTransaction {
    NewTransaction {
        tx_type: "income".to_string(),
        ..expense(amount, date)
    }
}
