use crate::{
    api::models::{ApiError, ApiOk, ErrorBody},
    core::{
        errors::MakutaError,
        models::{AuthUser, Category, Transaction},
        service::{
            ByCategoryParams, CategoryBreakdown, CategoryPatch, ListCategoriesParams,
            ListTransactionsParams, MakutaService, MonthlySummary, NewCategory, NewTransaction,
            SummaryParams, TransactionPatch, TrendParams, TrendSeries,
        },
    },
    infrastructure::{identity::jwt::JwtVerifier, storage::in_memory::InMemoryStorage},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;
use serde_json::json;

use std::sync::Arc;

type AppService = Arc<MakutaService<InMemoryStorage, JwtVerifier>>;

/// Middleware to verify the bearer token and attach the caller identity.
async fn auth_middleware(
    State(service): State<AppService>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(MakutaError::MissingToken)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(MakutaError::MissingToken)?;

    let user = service.verify_token(token).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: AppService) -> Router {
    let protected_routes = Router::new()
        .route(
            "/transactions",
            axum::routing::post(create_transaction).get(list_transactions),
        )
        .route(
            "/transactions/{id}",
            axum::routing::get(get_transaction)
                .patch(update_transaction)
                .delete(delete_transaction),
        )
        .route(
            "/categories",
            axum::routing::post(create_category).get(list_categories),
        )
        .route(
            "/categories/{id}",
            axum::routing::get(get_category)
                .patch(update_category)
                .delete(delete_category),
        )
        .route("/stats/summary", axum::routing::get(stats_summary))
        .route("/stats/by-category", axum::routing::get(stats_by_category))
        .route("/stats/trend", axum::routing::get(stats_trend))
        .route_layer(middleware::from_fn_with_state(
            service.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", axum::routing::get(health)) // Unprotected
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up")
    )
)]
async fn health() -> impl IntoResponse {
    ApiOk(StatusCode::OK, json!({ "status": "ok" }))
}

#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = NewTransaction,
    responses(
        (status = 201, description = "Transaction created", body = Transaction),
        (status = 400, description = "Invalid field or category reference", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn create_transaction(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<NewTransaction>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = service.create_transaction(&user.uid, req).await?;
    Ok(ApiOk(StatusCode::CREATED, tx))
}

#[utoipa::path(
    get,
    path = "/api/transactions",
    params(ListTransactionsParams),
    responses(
        (status = 200, description = "Page of transactions, newest first"),
        (status = 400, description = "Invalid filter, limit or page token", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn list_transactions(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListTransactionsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = service.list_transactions(&user.uid, params).await?;
    Ok(ApiOk(StatusCode::OK, page))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(("id" = String, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction found", body = Transaction),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "Transaction not found", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn get_transaction(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = service.get_transaction(&user.uid, &id).await?;
    Ok(ApiOk(StatusCode::OK, tx))
}

#[utoipa::path(
    patch,
    path = "/api/transactions/{id}",
    params(("id" = String, Path, description = "Transaction id")),
    request_body = TransactionPatch,
    responses(
        (status = 200, description = "Transaction updated", body = Transaction),
        (status = 400, description = "Invalid field or empty patch", body = ErrorBody),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "Transaction not found", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn update_transaction(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<TransactionPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let tx = service.update_transaction(&user.uid, &id, req).await?;
    Ok(ApiOk(StatusCode::OK, tx))
}

#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    params(("id" = String, Path, description = "Transaction id")),
    responses(
        (status = 200, description = "Transaction deleted"),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "Transaction not found", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn delete_transaction(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    service.delete_transaction(&user.uid, &id).await?;
    Ok(ApiOk(StatusCode::OK, json!({ "id": id })))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = NewCategory,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Invalid name", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn create_category(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<NewCategory>,
) -> Result<impl IntoResponse, ApiError> {
    let category = service.create_category(&user.uid, req).await?;
    Ok(ApiOk(StatusCode::CREATED, category))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(ListCategoriesParams),
    responses(
        (status = 200, description = "Page of categories, name ascending"),
        (status = 400, description = "Invalid limit or page token", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn list_categories(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListCategoriesParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = service.list_categories(&user.uid, params).await?;
    Ok(ApiOk(StatusCode::OK, page))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category found", body = Category),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn get_category(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = service.get_category(&user.uid, &id).await?;
    Ok(ApiOk(StatusCode::OK, category))
}

#[utoipa::path(
    patch,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = CategoryPatch,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Invalid name or empty patch", body = ErrorBody),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn update_category(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(req): Json<CategoryPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let category = service.update_category(&user.uid, &id, req).await?;
    Ok(ApiOk(StatusCode::OK, category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 403, description = "Owned by another user", body = ErrorBody),
        (status = 404, description = "Category not found", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn delete_category(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    service.delete_category(&user.uid, &id).await?;
    Ok(ApiOk(StatusCode::OK, json!({ "id": id })))
}

#[utoipa::path(
    get,
    path = "/api/stats/summary",
    params(SummaryParams),
    responses(
        (status = 200, description = "Income, expense and balance for the month", body = MonthlySummary),
        (status = 400, description = "Invalid month or currency", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn stats_summary(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<SummaryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = service.monthly_summary(&user.uid, params).await?;
    Ok(ApiOk(StatusCode::OK, summary))
}

#[utoipa::path(
    get,
    path = "/api/stats/by-category",
    params(ByCategoryParams),
    responses(
        (status = 200, description = "Per-category totals, largest first", body = CategoryBreakdown),
        (status = 400, description = "Invalid month, currency or type", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn stats_by_category(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ByCategoryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let breakdown = service.summary_by_category(&user.uid, params).await?;
    Ok(ApiOk(StatusCode::OK, breakdown))
}

#[utoipa::path(
    get,
    path = "/api/stats/trend",
    params(TrendParams),
    responses(
        (status = 200, description = "Daily or weekly totals in chronological order", body = TrendSeries),
        (status = 400, description = "Invalid month, currency or granularity", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    security(("Bearer" = []))
)]
async fn stats_trend(
    State(service): State<AppService>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<TrendParams>,
) -> Result<impl IntoResponse, ApiError> {
    let series = service.monthly_trend(&user.uid, params).await?;
    Ok(ApiOk(StatusCode::OK, series))
}
