use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity asserted by the external identity layer after verifying a
/// bearer credential. Never constructed from client input directly.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}
