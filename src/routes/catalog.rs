use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        catalog::{CategoryList, CategoryRequest, SizeList, SizeRequest, UpdateCategoryRequest},
        products::Deleted,
    },
    error::AppResult,
    middleware::auth::AuthAdmin,
    models::{Category, Size},
    response::ApiResponse,
    routes::params::SearchQuery,
    services::{category_service, size_service},
    state::AppState,
};

pub fn category_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route(
            "/{id}",
            get(get_category)
                .put(update_category)
                .delete(delete_category),
        )
}

pub fn size_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_sizes).post(create_size))
        .route("/{id}", put(update_size).delete(delete_size))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    params(SearchQuery),
    responses(
        (status = 200, description = "List categories", body = ApiResponse<CategoryList>)
    ),
    tag = "Catalog"
)]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let resp = category_service::list_categories(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Get category", body = ApiResponse<Category>),
        (status = 404, description = "Category not found")
    ),
    tag = "Catalog"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::get_category(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Invalid or duplicate name")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_category(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Json(payload): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let resp = category_service::create_category(&state, &admin, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<Category>),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_category(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> AppResult<Json<ApiResponse<Category>>> {
    let resp = category_service::update_category(&state, &admin, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = Uuid, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted, products keep a null category", body = ApiResponse<Deleted>),
        (status = 404, description = "Category not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = category_service::delete_category(&state, &admin, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/sizes",
    responses(
        (status = 200, description = "List sizes", body = ApiResponse<SizeList>)
    ),
    tag = "Catalog"
)]
pub async fn list_sizes(State(state): State<AppState>) -> AppResult<Json<ApiResponse<SizeList>>> {
    let resp = size_service::list_sizes(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/sizes",
    request_body = SizeRequest,
    responses(
        (status = 201, description = "Size created", body = ApiResponse<Size>),
        (status = 400, description = "Invalid or duplicate name")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn create_size(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Json(payload): Json<SizeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Size>>)> {
    let resp = size_service::create_size(&state, &admin, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    put,
    path = "/api/sizes/{id}",
    params(
        ("id" = Uuid, Path, description = "Size ID")
    ),
    request_body = SizeRequest,
    responses(
        (status = 200, description = "Size renamed", body = ApiResponse<Size>),
        (status = 404, description = "Size not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn update_size(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
    Json(payload): Json<SizeRequest>,
) -> AppResult<Json<ApiResponse<Size>>> {
    let resp = size_service::update_size(&state, &admin, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/sizes/{id}",
    params(
        ("id" = Uuid, Path, description = "Size ID")
    ),
    responses(
        (status = 200, description = "Size deleted", body = ApiResponse<Deleted>),
        (status = 400, description = "Size still in use"),
        (status = 404, description = "Size not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Catalog"
)]
pub async fn delete_size(
    State(state): State<AppState>,
    admin: AuthAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Deleted>>> {
    let resp = size_service::delete_size(&state, &admin, id).await?;
    Ok(Json(resp))
}
