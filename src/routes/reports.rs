use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::reports::{DailySales, ReportRange, SalesSummary, TopProduct},
    error::AppResult,
    middleware::auth::AuthAdmin,
    response::ApiResponse,
    services::report_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/summary", get(summary))
        .route("/top-products", get(top_products))
        .route("/sales", get(daily_sales))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/summary",
    params(ReportRange),
    responses(
        (status = 200, description = "Totals for the window", body = ApiResponse<SalesSummary>),
        (status = 400, description = "Invalid range")
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn summary(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Query(range): Query<ReportRange>,
) -> AppResult<Json<ApiResponse<SalesSummary>>> {
    let resp = report_service::summary(&state.pool, &admin, range).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/top-products",
    params(ReportRange),
    responses(
        (status = 200, description = "Best sellers by accepted quantity", body = ApiResponse<Vec<TopProduct>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn top_products(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Query(range): Query<ReportRange>,
) -> AppResult<Json<ApiResponse<Vec<TopProduct>>>> {
    let resp = report_service::top_products(&state.pool, &admin, range).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/reports/sales",
    params(ReportRange),
    responses(
        (status = 200, description = "Accepted revenue per day", body = ApiResponse<Vec<DailySales>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn daily_sales(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Query(range): Query<ReportRange>,
) -> AppResult<Json<ApiResponse<Vec<DailySales>>>> {
    let resp = report_service::daily_sales(&state.pool, &admin, range).await?;
    Ok(Json(resp))
}
