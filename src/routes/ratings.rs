use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
};
use uuid::Uuid;

use crate::{
    dto::{
        products::Deleted,
        ratings::{CreateRatingRequest, RatingCreated, RatingList},
    },
    error::AppResult,
    middleware::auth::{AuthAdmin, AuthUser},
    response::ApiResponse,
    routes::params::Pagination,
    services::rating_service,
    state::AppState,
};

/// Mounted under `/products`.
pub fn product_router() -> Router<AppState> {
    Router::new().route("/{id}/ratings", get(list_ratings).post(create_rating))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", delete(delete_rating))
}

#[utoipa::path(
    get,
    path = "/api/products/{id}/ratings",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        Pagination
    ),
    responses(
        (status = 200, description = "Ratings for product", body = ApiResponse<RatingList>)
    ),
    tag = "Ratings"
)]
pub async fn list_ratings(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(pagination): Query<Pagination>,
) -> AppResult<Json<ApiResponse<RatingList>>> {
    let resp = rating_service::list_ratings(&state.pool, id, pagination).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/products/{id}/ratings",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = CreateRatingRequest,
    responses(
        (status = 201, description = "Rating recorded", body = ApiResponse<RatingCreated>),
        (status = 400, description = "Rating outside 1-5"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn create_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateRatingRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RatingCreated>>)> {
    let resp = rating_service::create_rating(&state.pool, &user, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    delete,
    path = "/api/ratings/{id}",
    params(
        ("id" = Uuid, Path, description = "Rating ID")
    ),
    responses(
        (status = 200, description = "Rating deleted", body = ApiResponse<Deleted>),
        (status = 404, description = "Rating not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Ratings"
)]
pub async fn delete_rating(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = rating_service::delete_rating(&state.pool, &admin, id).await?;
    Ok(Json(resp))
}
