use super::{create_test_service, expense};
use crate::core::errors::MakutaError;
use crate::core::models::{Currency, TxType};
use crate::core::service::{NewCategory, NewTransaction, TransactionPatch};

#[tokio::test]
async fn test_create_transaction_defaults() {
    let makuta = create_test_service();

    let tx = makuta
        .create_transaction("u1", expense(25.5, "2026-02-10T12:00:00Z"))
        .await
        .unwrap();

    assert!(!tx.id.is_empty());
    assert_eq!(tx.uid, "u1");
    assert_eq!(tx.tx_type, TxType::Expense);
    assert_eq!(tx.currency, Currency::USD);
    assert_eq!(tx.note, "");
    assert_eq!(tx.category_id, None);
    assert_eq!(tx.date.to_rfc3339(), "2026-02-10T12:00:00+00:00");
    assert_eq!(tx.created_at, tx.updated_at);
}

#[tokio::test]
async fn test_create_transaction_without_date_uses_now() {
    let makuta = create_test_service();

    let before = chrono::Utc::now();
    let tx = makuta
        .create_transaction(
            "u1",
            NewTransaction {
                date: None,
                ..expense(10.0, "")
            },
        )
        .await
        .unwrap();

    assert!(tx.date >= before);
}

#[tokio::test]
async fn test_create_transaction_rejects_bad_fields() {
    let makuta = create_test_service();

    let err = makuta
        .create_transaction("u1", expense(0.0, "2026-02-10T12:00:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(err, MakutaError::InvalidAmount));

    let err = makuta
        .create_transaction("u1", expense(-3.0, "2026-02-10T12:00:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(err, MakutaError::InvalidAmount));

    let err = makuta
        .create_transaction("u1", expense(f64::NAN, "2026-02-10T12:00:00Z"))
        .await
        .unwrap_err();
    assert!(matches!(err, MakutaError::InvalidAmount));

    // Date-only strings are not full datetimes.
    let err = makuta
        .create_transaction("u1", expense(10.0, "2026-02-10"))
        .await
        .unwrap_err();
    assert!(matches!(err, MakutaError::InvalidDate));

    let err = makuta
        .create_transaction(
            "u1",
            NewTransaction {
                currency: "EUR".to_string(),
                ..expense(10.0, "2026-02-10T12:00:00Z")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MakutaError::InvalidCurrency));

    let err = makuta
        .create_transaction(
            "u1",
            NewTransaction {
                tx_type: "transfer".to_string(),
                ..expense(10.0, "2026-02-10T12:00:00Z")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MakutaError::InvalidType));
}

#[tokio::test]
async fn test_create_transaction_rejects_foreign_category_without_writing() {
    let makuta = create_test_service();

    let other_category = makuta
        .create_category(
            "u2",
            NewCategory {
                name: "Groceries".to_string(),
                icon: None,
                color: None,
            },
        )
        .await
        .unwrap();

    let err = makuta
        .create_transaction(
            "u1",
            NewTransaction {
                category_id: Some(other_category.id),
                ..expense(10.0, "2026-02-10T12:00:00Z")
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, MakutaError::InvalidCategory(_)));

    let page = makuta
        .list_transactions("u1", Default::default())
        .await
        .unwrap();
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn test_get_transaction_not_found_vs_forbidden() {
    let makuta = create_test_service();

    let tx = makuta
        .create_transaction("u1", expense(10.0, "2026-02-10T12:00:00Z"))
        .await
        .unwrap();

    let err = makuta.get_transaction("u1", "missing").await.unwrap_err();
    assert!(matches!(err, MakutaError::NotFound(_)));

    let err = makuta.get_transaction("u2", &tx.id).await.unwrap_err();
    assert!(matches!(err, MakutaError::Forbidden(_)));
}

#[tokio::test]
async fn test_update_transaction_patches_fields() {
    let makuta = create_test_service();

    let category = makuta
        .create_category(
            "u1",
            NewCategory {
                name: "Transport".to_string(),
                icon: None,
                color: None,
            },
        )
        .await
        .unwrap();
    let tx = makuta
        .create_transaction("u1", expense(10.0, "2026-02-10T12:00:00Z"))
        .await
        .unwrap();

    let updated = makuta
        .update_transaction(
            "u1",
            &tx.id,
            TransactionPatch {
                amount: Some(42.0),
                category_id: Some(Some(category.id.clone())),
                note: Some("bus pass".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.amount, 42.0);
    assert_eq!(updated.category_id, Some(category.id));
    assert_eq!(updated.note, "bus pass");
    assert!(updated.updated_at > updated.created_at);

    // Explicit null clears the category; absent leaves it alone.
    let cleared = makuta
        .update_transaction(
            "u1",
            &tx.id,
            TransactionPatch {
                category_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.category_id, None);
    assert_eq!(cleared.note, "bus pass");
}

#[tokio::test]
async fn test_update_transaction_rejects_empty_patch() {
    let makuta = create_test_service();

    let tx = makuta
        .create_transaction("u1", expense(10.0, "2026-02-10T12:00:00Z"))
        .await
        .unwrap();

    let err = makuta
        .update_transaction("u1", &tx.id, TransactionPatch::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MakutaError::InvalidPatch));
}

#[tokio::test]
async fn test_update_transaction_last_write_wins() {
    // Patches are read-modify-write with no version check; when two writers
    // race, the store keeps whichever lands last.
    let makuta = create_test_service();

    let tx = makuta
        .create_transaction("u1", expense(10.0, "2026-02-10T12:00:00Z"))
        .await
        .unwrap();

    makuta
        .update_transaction(
            "u1",
            &tx.id,
            TransactionPatch {
                note: Some("first".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    makuta
        .update_transaction(
            "u1",
            &tx.id,
            TransactionPatch {
                note: Some("second".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let fetched = makuta.get_transaction("u1", &tx.id).await.unwrap();
    assert_eq!(fetched.note, "second");
}

#[tokio::test]
async fn test_delete_transaction() {
    let makuta = create_test_service();

    let tx = makuta
        .create_transaction("u1", expense(10.0, "2026-02-10T12:00:00Z"))
        .await
        .unwrap();

    let err = makuta.delete_transaction("u2", &tx.id).await.unwrap_err();
    assert!(matches!(err, MakutaError::Forbidden(_)));

    makuta.delete_transaction("u1", &tx.id).await.unwrap();

    let err = makuta.get_transaction("u1", &tx.id).await.unwrap_err();
    assert!(matches!(err, MakutaError::NotFound(_)));
}

#[test]
fn test_transaction_patch_distinguishes_null_from_absent() {
    let patch: TransactionPatch = serde_json::from_str(r#"{"categoryId":null}"#).unwrap();
    assert_eq!(patch.category_id, Some(None));
    assert!(!patch.is_empty());

    let patch: TransactionPatch = serde_json::from_str("{}").unwrap();
    assert_eq!(patch.category_id, None);
    assert!(patch.is_empty());
}
