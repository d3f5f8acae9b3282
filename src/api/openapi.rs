use utoipa::OpenApi;

use crate::{
    api::models::ErrorBody,
    core::{
        models::{Category, Currency, Transaction, TxType},
        service::{
            CategoryBreakdown, CategoryPatch, CategoryTotal, Granularity, MonthlySummary,
            NewCategory, NewTransaction, Page, PageInfo, TransactionPatch, TrendPoint, TrendSeries,
        },
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::health,
        super::handlers::create_transaction,
        super::handlers::list_transactions,
        super::handlers::get_transaction,
        super::handlers::update_transaction,
        super::handlers::delete_transaction,
        super::handlers::create_category,
        super::handlers::list_categories,
        super::handlers::get_category,
        super::handlers::update_category,
        super::handlers::delete_category,
        super::handlers::stats_summary,
        super::handlers::stats_by_category,
        super::handlers::stats_trend
    ),
    components(schemas(
        NewTransaction,
        TransactionPatch,
        NewCategory,
        CategoryPatch,
        Transaction,
        Category,
        Currency,
        TxType,
        Granularity,
        Page<Transaction>,
        Page<Category>,
        PageInfo,
        MonthlySummary,
        CategoryBreakdown,
        CategoryTotal,
        TrendSeries,
        TrendPoint,
        ErrorBody
    )),
    info(
        title = "Makuta API",
        description = "Personal finance tracking: transactions, categories and monthly stats",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
