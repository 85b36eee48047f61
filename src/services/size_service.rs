use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    dto::{
        catalog::{SizeList, SizeRequest},
        products::Deleted,
    },
    entity::{
        product_sizes::{Column as ProductSizeCol, Entity as ProductSizes},
        sizes::{ActiveModel, Column, Entity as Sizes, Model as SizeModel},
        transaction_items::{Column as TransactionItemCol, Entity as TransactionItems},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthAdmin,
    models::Size,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_sizes(state: &AppState) -> AppResult<ApiResponse<SizeList>> {
    let items = Sizes::find()
        .order_by_asc(Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(size_from_entity)
        .collect();
    Ok(ApiResponse::success("Sizes", SizeList { items }, None))
}

pub async fn create_size(
    state: &AppState,
    admin: &AuthAdmin,
    payload: SizeRequest,
) -> AppResult<ApiResponse<Size>> {
    let name = normalize_name(&payload.name)?;
    ensure_name_available(state, &name, None).await?;

    let size = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(admin_id = %admin.admin_id, size_id = %size.id, "size created");
    Ok(ApiResponse::success(
        "Size created",
        size_from_entity(size),
        Some(Meta::empty()),
    ))
}

pub async fn update_size(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
    payload: SizeRequest,
) -> AppResult<ApiResponse<Size>> {
    let name = normalize_name(&payload.name)?;
    let existing = Sizes::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    ensure_name_available(state, &name, Some(id)).await?;

    let mut active: ActiveModel = existing.into();
    active.name = Set(name);
    let size = active.update(&state.orm).await?;

    tracing::info!(admin_id = %admin.admin_id, size_id = %id, "size updated");
    Ok(ApiResponse::success("Updated", size_from_entity(size), Some(Meta::empty())))
}

pub async fn delete_size(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
) -> AppResult<ApiResponse<Deleted>> {
    let in_use = ProductSizes::find()
        .filter(ProductSizeCol::SizeId.eq(id))
        .count(&state.orm)
        .await?
        + TransactionItems::find()
            .filter(TransactionItemCol::SizeId.eq(id))
            .count(&state.orm)
            .await?;
    if in_use > 0 {
        return Err(AppError::BadRequest(
            "Size is assigned to products or transactions; deactivate it per product instead".into(),
        ));
    }

    let result = Sizes::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    tracing::info!(admin_id = %admin.admin_id, size_id = %id, "size deleted");
    Ok(ApiResponse::success("Deleted", Deleted { id }, Some(Meta::empty())))
}

fn normalize_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    Ok(name.to_uppercase())
}

async fn ensure_name_available(state: &AppState, name: &str, except: Option<Uuid>) -> AppResult<()> {
    let mut finder = Sizes::find().filter(Column::Name.eq(name));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.count(&state.orm).await? > 0 {
        return Err(AppError::BadRequest("Size name is already used".into()));
    }
    Ok(())
}

fn size_from_entity(model: SizeModel) -> Size {
    Size {
        id: model.id,
        name: model.name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
