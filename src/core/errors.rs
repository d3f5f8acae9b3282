use thiserror::Error;

/// Domain errors for the finance core.
///
/// The api layer maps each variant to an HTTP status and a stable error code;
/// the core only distinguishes the failure classes.
#[derive(Error, Debug)]
pub enum MakutaError {
    /// Month is missing or not in `YYYY-MM` form with month 01-12.
    #[error("month is required and must use YYYY-MM format")]
    InvalidMonth,

    /// Currency is not one of the supported codes.
    #[error("currency must be one of the supported values")]
    InvalidCurrency,

    /// Transaction type is not one of the supported values.
    #[error("transaction type must be one of the supported values")]
    InvalidType,

    /// Trend granularity is neither `day` nor `week`.
    #[error("granularity must be either day or week")]
    InvalidGranularity,

    /// Amount is not a positive finite number.
    #[error("amount must be a positive finite number")]
    InvalidAmount,

    /// Date is not a strict ISO-8601 datetime.
    #[error("date must be a full ISO-8601 datetime")]
    InvalidDate,

    /// Page limit is not an integer >= 1.
    #[error("limit must be an integer greater than or equal to 1")]
    InvalidLimit,

    /// Category name is empty or out of bounds after trimming.
    #[error("name must be between 2 and 64 characters")]
    InvalidName,

    /// Page token is malformed, or references a document that no longer
    /// exists or belongs to another user.
    #[error("page token is invalid")]
    InvalidPageToken,

    /// Referenced category does not exist or belongs to another user.
    #[error("category {0} is invalid")]
    InvalidCategory(String),

    /// Patch body contains no recognized fields.
    #[error("patch must contain at least one field")]
    InvalidPatch,

    /// Authorization header is absent.
    #[error("Authorization: Bearer <token> is required")]
    MissingToken,

    /// Bearer credential failed verification.
    #[error("bearer token is invalid")]
    InvalidToken,

    /// Identity layer is not configured or unreachable.
    #[error("identity service is unavailable")]
    AuthUnavailable,

    /// Resource is absent.
    #[error("{0} not found")]
    NotFound(String),

    /// Resource exists but is owned by another user.
    #[error("{0} belongs to another user")]
    Forbidden(String),

    /// Store is not configured or unreachable.
    #[error("database is unavailable")]
    DatabaseUnavailable,

    /// Unexpected store failure; detail is logged, never returned to callers.
    #[error("storage error: {0}")]
    StorageError(String),
}
