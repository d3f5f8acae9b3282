use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Supported currencies. Amounts are currency-agnostic magnitudes; the
/// currency is a plain tag on the transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Currency {
    USD,
    CDF,
}

impl Currency {
    pub const ALL: [&'static str; 2] = ["USD", "CDF"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USD" => Some(Currency::USD),
            "CDF" => Some(Currency::CDF),
            _ => None,
        }
    }
}

/// Transaction direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Income,
    Expense,
}

impl TxType {
    pub const ALL: [&'static str; 2] = ["income", "expense"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "income" => Some(TxType::Income),
            "expense" => Some(TxType::Expense),
            _ => None,
        }
    }
}

/// A single income or expense record, owned by exactly one user.
///
/// `uid` is set at creation and never mutated. `date` is the business date,
/// distinct from the server-assigned `created_at`/`updated_at`.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub uid: String,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub amount: f64,
    pub currency: Currency,
    pub category_id: Option<String>,
    pub note: String,
    #[schema(value_type = String, example = "2026-02-24T12:34:56Z")]
    pub date: DateTime<Utc>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}
