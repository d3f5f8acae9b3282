use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Days, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::errors::MakutaError;
use crate::core::models::{AuthUser, Category, Currency, Transaction, TxType};
use crate::core::pagination::PageToken;
use crate::core::validate::{is_valid_amount, month_range, parse_strict_iso_date};
use crate::infrastructure::identity::IdentityProvider;
use crate::infrastructure::storage::{CategoryQuery, Storage, TransactionQuery};

pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const MAX_PAGE_LIMIT: usize = 200;

const NAME_MIN_CHARS: usize = 2;
const NAME_MAX_CHARS: usize = 64;

/// Bucket label for transactions with no category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
/// Fallback label when a referenced category cannot be resolved for the
/// caller (deleted, or a stale cross-user id).
pub const UNKNOWN_CATEGORY_LABEL: &str = "Unknown category";

/// Distinguishes absent / null / value in patch bodies.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: f64,
    pub currency: String,
    pub category_id: Option<String>,
    pub note: Option<String>,
    /// Strict ISO-8601 datetime; defaults to now when absent.
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    /// Absent leaves the category untouched; an explicit null clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<String>>,
    pub note: Option<String>,
    pub date: Option<String>,
}

impl TransactionPatch {
    pub fn is_empty(&self) -> bool {
        self.tx_type.is_none()
            && self.amount.is_none()
            && self.currency.is_none()
            && self.category_id.is_none()
            && self.note.is_none()
            && self.date.is_none()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewCategory {
    pub name: String,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CategoryPatch {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub color: Option<Option<String>>,
}

impl CategoryPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.icon.is_none() && self.color.is_none()
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListTransactionsParams {
    pub month: Option<String>,
    pub currency: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
    pub category_id: Option<String>,
    pub limit: Option<String>,
    pub page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListCategoriesParams {
    pub limit: Option<String>,
    pub page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryParams {
    pub month: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ByCategoryParams {
    pub month: Option<String>,
    pub currency: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrendParams {
    pub month: Option<String>,
    pub currency: Option<String>,
    pub granularity: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
}

impl Granularity {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "day" => Some(Granularity::Day),
            "week" => Some(Granularity::Week),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub limit: usize,
    pub has_more: bool,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: String,
    pub currency: Option<Currency>,
    pub total_expense: f64,
    pub total_income: f64,
    pub balance: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: Option<String>,
    pub category_name: String,
    pub total: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    pub month: String,
    pub currency: Currency,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub items: Vec<CategoryTotal>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub total_expense: f64,
    pub total_income: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub month: String,
    pub currency: Option<Currency>,
    pub granularity: Granularity,
    pub items: Vec<TrendPoint>,
}

fn parse_currency(raw: &str) -> Result<Currency, MakutaError> {
    Currency::parse(raw).ok_or(MakutaError::InvalidCurrency)
}

fn parse_tx_type(raw: &str) -> Result<TxType, MakutaError> {
    TxType::parse(raw).ok_or(MakutaError::InvalidType)
}

/// A required, well-formed month token with its UTC window.
fn require_month(raw: Option<&str>) -> Result<(String, (DateTime<Utc>, DateTime<Utc>)), MakutaError> {
    let raw = raw.ok_or(MakutaError::InvalidMonth)?;
    let window = month_range(raw).ok_or(MakutaError::InvalidMonth)?;
    Ok((raw.to_string(), window))
}

/// Default 50, capped at 200; anything non-integer or below 1 is rejected.
fn resolve_limit(raw: Option<&str>) -> Result<usize, MakutaError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_PAGE_LIMIT);
    };
    let parsed: i64 = raw.parse().map_err(|_| MakutaError::InvalidLimit)?;
    if parsed < 1 {
        return Err(MakutaError::InvalidLimit);
    }
    Ok((parsed as usize).min(MAX_PAGE_LIMIT))
}

/// Stored amounts are typed, but non-finite values can still sneak in
/// through older writes; they aggregate as zero rather than poisoning the
/// totals. See DESIGN.md for the stricter alternative that was rejected.
fn coerce_amount(amount: f64) -> f64 {
    if amount.is_finite() { amount } else { 0.0 }
}

fn day_key(date: DateTime<Utc>) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// ISO week start: the Monday of the week containing `date`, UTC.
fn week_start_key(date: DateTime<Utc>) -> String {
    let day = date.date_naive();
    let monday = day - Days::new(u64::from(day.weekday().num_days_from_monday()));
    monday.format("%Y-%m-%d").to_string()
}

/// The finance core: validation, ownership checks, cursor pagination and
/// in-memory aggregation over the injected store. Holds no mutable state of
/// its own; every request works against `storage` alone.
pub struct MakutaService<S: Storage, I: IdentityProvider> {
    storage: S,
    identity: I,
}

impl<S: Storage, I: IdentityProvider> MakutaService<S, I> {
    pub fn new(storage: S, identity: I) -> Self {
        MakutaService { storage, identity }
    }

    pub async fn verify_token(&self, token: &str) -> Result<AuthUser, MakutaError> {
        self.identity.verify(token).await
    }

    // ---- ownership guard ----

    /// Normalizes and checks a client-supplied category reference.
    ///
    /// `None` means "no category" and passes through; otherwise the id must
    /// be non-empty after trimming and resolve to a category owned by `uid`.
    pub async fn validate_category_ownership(
        &self,
        uid: &str,
        category_id: Option<&str>,
    ) -> Result<Option<String>, MakutaError> {
        let Some(raw) = category_id else {
            return Ok(None);
        };
        let id = raw.trim();
        if id.is_empty() {
            return Err(MakutaError::InvalidCategory(raw.to_string()));
        }
        match self.storage.get_category(id).await? {
            Some(category) if category.uid == uid => Ok(Some(id.to_string())),
            _ => Err(MakutaError::InvalidCategory(id.to_string())),
        }
    }

    async fn require_owned_transaction(
        &self,
        uid: &str,
        id: &str,
    ) -> Result<Transaction, MakutaError> {
        let tx = self
            .storage
            .get_transaction(id)
            .await?
            .ok_or_else(|| MakutaError::NotFound("transaction".to_string()))?;
        if tx.uid != uid {
            return Err(MakutaError::Forbidden("transaction".to_string()));
        }
        Ok(tx)
    }

    async fn require_owned_category(&self, uid: &str, id: &str) -> Result<Category, MakutaError> {
        let category = self
            .storage
            .get_category(id)
            .await?
            .ok_or_else(|| MakutaError::NotFound("category".to_string()))?;
        if category.uid != uid {
            return Err(MakutaError::Forbidden("category".to_string()));
        }
        Ok(category)
    }

    // ---- cursor re-validation ----

    /// Decodes a page token and resolves it against the caller's documents.
    /// A malformed token, a deleted cursor document, or a document owned by
    /// someone else all fail identically: the token is invalid. Never resets
    /// silently to page one.
    async fn resolve_transaction_cursor(
        &self,
        uid: &str,
        token: &str,
    ) -> Result<(DateTime<Utc>, String), MakutaError> {
        let decoded = PageToken::decode(token).ok_or(MakutaError::InvalidPageToken)?;
        match self.storage.get_transaction(&decoded.id).await? {
            Some(tx) if tx.uid == uid => Ok((tx.date, tx.id)),
            _ => Err(MakutaError::InvalidPageToken),
        }
    }

    async fn resolve_category_cursor(
        &self,
        uid: &str,
        token: &str,
    ) -> Result<(String, String), MakutaError> {
        let decoded = PageToken::decode(token).ok_or(MakutaError::InvalidPageToken)?;
        match self.storage.get_category(&decoded.id).await? {
            Some(category) if category.uid == uid => Ok((category.name, category.id)),
            _ => Err(MakutaError::InvalidPageToken),
        }
    }

    // ---- transactions ----

    pub async fn create_transaction(
        &self,
        uid: &str,
        cmd: NewTransaction,
    ) -> Result<Transaction, MakutaError> {
        let tx_type = parse_tx_type(&cmd.tx_type)?;
        if !is_valid_amount(cmd.amount) {
            return Err(MakutaError::InvalidAmount);
        }
        let currency = parse_currency(&cmd.currency)?;
        let date = match cmd.date.as_deref() {
            None => Utc::now(),
            Some(raw) => parse_strict_iso_date(raw).ok_or(MakutaError::InvalidDate)?,
        };
        let category_id = self
            .validate_category_ownership(uid, cmd.category_id.as_deref())
            .await?;

        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4().to_string(),
            uid: uid.to_string(),
            tx_type,
            amount: cmd.amount,
            currency,
            category_id,
            note: cmd.note.unwrap_or_default(),
            date,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_transaction(tx.clone()).await?;
        Ok(tx)
    }

    pub async fn get_transaction(&self, uid: &str, id: &str) -> Result<Transaction, MakutaError> {
        self.require_owned_transaction(uid, id).await
    }

    /// Field-by-field patch; each supplied field is validated independently.
    /// Read-modify-write: concurrent patches to the same document race and
    /// the last write wins.
    pub async fn update_transaction(
        &self,
        uid: &str,
        id: &str,
        patch: TransactionPatch,
    ) -> Result<Transaction, MakutaError> {
        if patch.is_empty() {
            return Err(MakutaError::InvalidPatch);
        }
        let mut tx = self.require_owned_transaction(uid, id).await?;

        if let Some(raw) = &patch.tx_type {
            tx.tx_type = parse_tx_type(raw)?;
        }
        if let Some(amount) = patch.amount {
            if !is_valid_amount(amount) {
                return Err(MakutaError::InvalidAmount);
            }
            tx.amount = amount;
        }
        if let Some(raw) = &patch.currency {
            tx.currency = parse_currency(raw)?;
        }
        if let Some(category_id) = &patch.category_id {
            tx.category_id = self
                .validate_category_ownership(uid, category_id.as_deref())
                .await?;
        }
        if let Some(note) = patch.note {
            tx.note = note;
        }
        if let Some(raw) = &patch.date {
            tx.date = parse_strict_iso_date(raw).ok_or(MakutaError::InvalidDate)?;
        }

        tx.updated_at = Utc::now();
        self.storage.save_transaction(tx.clone()).await?;
        Ok(tx)
    }

    pub async fn delete_transaction(&self, uid: &str, id: &str) -> Result<(), MakutaError> {
        self.require_owned_transaction(uid, id).await?;
        self.storage.delete_transaction(id).await
    }

    pub async fn list_transactions(
        &self,
        uid: &str,
        params: ListTransactionsParams,
    ) -> Result<Page<Transaction>, MakutaError> {
        let currency = params.currency.as_deref().map(parse_currency).transpose()?;
        let tx_type = params.tx_type.as_deref().map(parse_tx_type).transpose()?;
        let window = params
            .month
            .as_deref()
            .map(|m| month_range(m).ok_or(MakutaError::InvalidMonth))
            .transpose()?;
        let limit = resolve_limit(params.limit.as_deref())?;
        let start_after = match params.page_token.as_deref() {
            Some(token) => Some(self.resolve_transaction_cursor(uid, token).await?),
            None => None,
        };

        let query = TransactionQuery {
            uid: uid.to_string(),
            currency,
            tx_type,
            category_id: params.category_id,
            date_from: window.map(|(start, _)| start),
            date_to: window.map(|(_, end)| end),
            start_after,
            // One extra row tells us whether more pages remain without a
            // separate count query.
            limit: Some(limit + 1),
        };
        let mut items = self.storage.list_transactions(&query).await?;

        let has_more = items.len() > limit;
        items.truncate(limit);
        let next_page_token = has_more
            .then(|| items.last().map(|tx| PageToken::new(&tx.id).encode()))
            .flatten();

        Ok(Page {
            items,
            page_info: PageInfo {
                limit,
                has_more,
                next_page_token,
            },
        })
    }

    // ---- categories ----

    fn normalize_name(raw: &str) -> Result<String, MakutaError> {
        let name = raw.trim();
        let chars = name.chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
            return Err(MakutaError::InvalidName);
        }
        Ok(name.to_string())
    }

    pub async fn create_category(
        &self,
        uid: &str,
        cmd: NewCategory,
    ) -> Result<Category, MakutaError> {
        let name = Self::normalize_name(&cmd.name)?;
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            uid: uid.to_string(),
            name,
            icon: cmd.icon,
            color: cmd.color,
            created_at: now,
            updated_at: now,
        };
        self.storage.save_category(category.clone()).await?;
        Ok(category)
    }

    pub async fn get_category(&self, uid: &str, id: &str) -> Result<Category, MakutaError> {
        self.require_owned_category(uid, id).await
    }

    pub async fn update_category(
        &self,
        uid: &str,
        id: &str,
        patch: CategoryPatch,
    ) -> Result<Category, MakutaError> {
        if patch.is_empty() {
            return Err(MakutaError::InvalidPatch);
        }
        let mut category = self.require_owned_category(uid, id).await?;

        if let Some(raw) = &patch.name {
            category.name = Self::normalize_name(raw)?;
        }
        if let Some(icon) = patch.icon {
            category.icon = icon;
        }
        if let Some(color) = patch.color {
            category.color = color;
        }

        category.updated_at = Utc::now();
        self.storage.save_category(category.clone()).await?;
        Ok(category)
    }

    /// No cascade: transactions referencing the category keep their stale id
    /// and simply stop resolving to a name.
    pub async fn delete_category(&self, uid: &str, id: &str) -> Result<(), MakutaError> {
        self.require_owned_category(uid, id).await?;
        self.storage.delete_category(id).await
    }

    pub async fn list_categories(
        &self,
        uid: &str,
        params: ListCategoriesParams,
    ) -> Result<Page<Category>, MakutaError> {
        let limit = resolve_limit(params.limit.as_deref())?;
        let start_after = match params.page_token.as_deref() {
            Some(token) => Some(self.resolve_category_cursor(uid, token).await?),
            None => None,
        };

        let query = CategoryQuery {
            uid: uid.to_string(),
            start_after,
            limit: Some(limit + 1),
        };
        let mut items = self.storage.list_categories(&query).await?;

        let has_more = items.len() > limit;
        items.truncate(limit);
        let next_page_token = has_more
            .then(|| items.last().map(|c| PageToken::new(&c.id).encode()))
            .flatten();

        Ok(Page {
            items,
            page_info: PageInfo {
                limit,
                has_more,
                next_page_token,
            },
        })
    }

    // ---- aggregation ----

    /// Shared month-window fetch: all three stats views pull the month's
    /// transactions once and aggregate in memory; nothing is pushed down to
    /// the store beyond the filters.
    async fn fetch_monthly(
        &self,
        uid: &str,
        window: (DateTime<Utc>, DateTime<Utc>),
        currency: Option<Currency>,
        tx_type: Option<TxType>,
    ) -> Result<Vec<Transaction>, MakutaError> {
        self.storage
            .list_transactions(&TransactionQuery {
                uid: uid.to_string(),
                currency,
                tx_type,
                category_id: None,
                date_from: Some(window.0),
                date_to: Some(window.1),
                start_after: None,
                limit: None,
            })
            .await
    }

    pub async fn monthly_summary(
        &self,
        uid: &str,
        params: SummaryParams,
    ) -> Result<MonthlySummary, MakutaError> {
        let (month, window) = require_month(params.month.as_deref())?;
        let currency = params.currency.as_deref().map(parse_currency).transpose()?;

        let transactions = self.fetch_monthly(uid, window, currency, None).await?;

        let mut total_expense = 0.0;
        let mut total_income = 0.0;
        for tx in &transactions {
            let amount = coerce_amount(tx.amount);
            match tx.tx_type {
                TxType::Expense => total_expense += amount,
                TxType::Income => total_income += amount,
            }
        }

        Ok(MonthlySummary {
            month,
            currency,
            total_expense,
            total_income,
            balance: total_income - total_expense,
            transaction_count: transactions.len(),
        })
    }

    pub async fn summary_by_category(
        &self,
        uid: &str,
        params: ByCategoryParams,
    ) -> Result<CategoryBreakdown, MakutaError> {
        let (month, window) = require_month(params.month.as_deref())?;
        let currency = parse_currency(params.currency.as_deref().ok_or(MakutaError::InvalidCurrency)?)?;
        let tx_type = match params.tx_type.as_deref() {
            None => TxType::Expense,
            Some(raw) => parse_tx_type(raw)?,
        };

        let transactions = self
            .fetch_monthly(uid, window, Some(currency), Some(tx_type))
            .await?;

        // Group in first-seen order so equal totals stay stable.
        let mut order: Vec<Option<String>> = Vec::new();
        let mut totals: HashMap<Option<String>, f64> = HashMap::new();
        for tx in &transactions {
            let key = tx.category_id.clone();
            if !totals.contains_key(&key) {
                order.push(key.clone());
            }
            *totals.entry(key).or_insert(0.0) += coerce_amount(tx.amount);
        }

        // One concurrent read per distinct category id; names belonging to
        // other users are dropped, which downgrades stale cross-user ids to
        // the fallback label.
        let distinct: Vec<String> = order.iter().flatten().cloned().collect();
        let resolved = try_join_all(distinct.iter().map(|id| self.storage.get_category(id))).await?;
        let mut names: HashMap<String, String> = HashMap::new();
        for category in resolved.into_iter().flatten() {
            if category.uid == uid {
                names.insert(category.id.clone(), category.name);
            }
        }

        let mut items: Vec<CategoryTotal> = order
            .into_iter()
            .map(|key| {
                let total = totals[&key];
                match key {
                    None => CategoryTotal {
                        category_id: None,
                        category_name: UNCATEGORIZED_LABEL.to_string(),
                        total,
                    },
                    Some(id) => CategoryTotal {
                        category_name: names
                            .get(&id)
                            .cloned()
                            .unwrap_or_else(|| UNKNOWN_CATEGORY_LABEL.to_string()),
                        category_id: Some(id),
                        total,
                    },
                }
            })
            .collect();
        items.sort_by(|a, b| {
            b.total
                .partial_cmp(&a.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(CategoryBreakdown {
            month,
            currency,
            tx_type,
            items,
        })
    }

    pub async fn monthly_trend(
        &self,
        uid: &str,
        params: TrendParams,
    ) -> Result<TrendSeries, MakutaError> {
        let (month, window) = require_month(params.month.as_deref())?;
        let currency = params.currency.as_deref().map(parse_currency).transpose()?;
        let granularity = match params.granularity.as_deref() {
            None => Granularity::Day,
            Some(raw) => Granularity::parse(raw).ok_or(MakutaError::InvalidGranularity)?,
        };

        let transactions = self.fetch_monthly(uid, window, currency, None).await?;

        // BTreeMap keys are ISO dates, so lexicographic order is
        // chronological order.
        let mut buckets: BTreeMap<String, (f64, f64)> = BTreeMap::new();
        for tx in &transactions {
            let key = match granularity {
                Granularity::Day => day_key(tx.date),
                Granularity::Week => week_start_key(tx.date),
            };
            let entry = buckets.entry(key).or_insert((0.0, 0.0));
            let amount = coerce_amount(tx.amount);
            match tx.tx_type {
                TxType::Expense => entry.0 += amount,
                TxType::Income => entry.1 += amount,
            }
        }

        let items = buckets
            .into_iter()
            .map(|(date, (total_expense, total_income))| TrendPoint {
                date,
                total_expense,
                total_income,
            })
            .collect();

        Ok(TrendSeries {
            month,
            currency,
            granularity,
            items,
        })
    }
}
