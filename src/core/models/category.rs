use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user-defined grouping for transactions.
///
/// Names are unique per user by convention only; nothing structural enforces
/// it. Deleting a category does not cascade to transactions referencing it.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub uid: String,
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}
