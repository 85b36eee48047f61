use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use uuid::Uuid;

use crate::{
    dto::{
        products::{Deleted, ProductList},
        transactions::{
            TransactionDeleted, TransactionList, TransactionWithItems,
            UpdateTransactionStatusRequest,
        },
        users::CustomerList,
    },
    error::AppResult,
    middleware::auth::AuthAdmin,
    models::Customer,
    response::ApiResponse,
    routes::{
        admin_auth, reports,
        params::{LowStockQuery, SearchQuery, TransactionListQuery},
    },
    services::{admin_service, product_service, transaction_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", admin_auth::router())
        .nest("/reports", reports::router())
        .route("/transactions", get(list_all_transactions))
        .route(
            "/transactions/{id}",
            get(get_transaction_admin).delete(delete_transaction),
        )
        .route("/transactions/{id}/status", patch(update_transaction_status))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
        .route("/products/low-stock", get(list_low_stock))
}

#[utoipa::path(
    get,
    path = "/api/admin/transactions",
    params(TransactionListQuery),
    responses(
        (status = 200, description = "All transactions", body = ApiResponse<TransactionList>),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal Server Error"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_transactions(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Query(query): Query<TransactionListQuery>,
) -> AppResult<Json<ApiResponse<TransactionList>>> {
    let resp = transaction_service::list_all_transactions(&state, &admin, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction with items", body = ApiResponse<TransactionWithItems>),
        (status = 404, description = "Transaction not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_transaction_admin(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransactionWithItems>>> {
    let resp = transaction_service::get_transaction_admin(&state, &admin, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/admin/transactions/{id}/status",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    request_body = UpdateTransactionStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ApiResponse<TransactionWithItems>),
        (status = 400, description = "Illegal transition or insufficient stock"),
        (status = 404, description = "Transaction not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_transaction_status(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTransactionStatusRequest>,
) -> AppResult<Json<ApiResponse<TransactionWithItems>>> {
    let resp = transaction_service::update_status(&state, &admin, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/transactions/{id}",
    params(
        ("id" = Uuid, Path, description = "Transaction ID")
    ),
    responses(
        (status = 200, description = "Transaction and items removed", body = ApiResponse<TransactionDeleted>),
        (status = 404, description = "Transaction not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<TransactionDeleted>>> {
    let resp = transaction_service::delete_transaction_admin(&state, &admin, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(SearchQuery),
    responses(
        (status = 200, description = "Customers", body = ApiResponse<CustomerList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<CustomerList>>> {
    let resp = admin_service::list_customers(&state, &admin, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/users/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer", body = ApiResponse<Customer>),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_user(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = admin_service::get_customer(&state, &admin, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(
        ("id" = Uuid, Path, description = "Customer ID")
    ),
    responses(
        (status = 200, description = "Customer deleted", body = ApiResponse<Deleted>),
        (status = 404, description = "Customer not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = admin_service::delete_customer(&state, &admin, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/products/low-stock",
    params(LowStockQuery),
    responses(
        (status = 200, description = "Products at or below the threshold", body = ApiResponse<ProductList>),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_low_stock(
    State(state): State<AppState>,
    _admin: AuthAdmin,
    Query(query): Query<LowStockQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let resp = product_service::list_low_stock(&state, query).await?;
    Ok(Json(resp))
}
