use std::collections::BTreeMap;

use axum::extract::Multipart;
use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::LockType;
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseTransaction, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::transactions::{
        CreateTransactionRequest, TransactionDeleted, TransactionList, TransactionWithItems,
        UpdateTransactionStatusRequest,
    },
    entity::{
        product_sizes::{
            ActiveModel as ProductSizeActive, Column as ProductSizeCol, Entity as ProductSizes,
        },
        products::{Column as ProdCol, Entity as Products},
        shopping_carts::{Column as CartCol, Entity as ShoppingCarts},
        transaction_items::{
            ActiveModel as ItemActive, Column as ItemCol, Entity as TransactionItems,
            Model as ItemModel,
        },
        transactions::{
            ActiveModel as TransactionActive, Column as TransactionCol, Entity as Transactions,
            Model as TransactionModel,
        },
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthAdmin, AuthUser},
    models::{Transaction, TransactionItem, TransactionStatus},
    response::{ApiResponse, Meta},
    routes::params::{SortOrder, TransactionListQuery, contains_pattern},
    state::AppState,
    upload::{self, UploadFolder},
};

/// Line key: product plus optional size. Ordered so locks are always taken in the same order.
type LineKey = (Uuid, Option<Uuid>);

pub async fn list_transactions(
    state: &AppState,
    user: &AuthUser,
    query: TransactionListQuery,
) -> AppResult<ApiResponse<TransactionList>> {
    list(state, Some(user.user_id), query).await
}

pub async fn list_all_transactions(
    state: &AppState,
    _admin: &AuthAdmin,
    query: TransactionListQuery,
) -> AppResult<ApiResponse<TransactionList>> {
    list(state, None, query).await
}

async fn list(
    state: &AppState,
    owner: Option<Uuid>,
    query: TransactionListQuery,
) -> AppResult<ApiResponse<TransactionList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();
    if let Some(user_id) = owner {
        condition = condition.add(TransactionCol::UserId.eq(user_id));
    }
    if let Some(status) = query.status.as_deref().filter(|s| !s.trim().is_empty()) {
        let status: TransactionStatus = status.parse()?;
        condition = condition.add(TransactionCol::Status.eq(status.as_str()));
    }
    if let Some(search) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition =
            condition.add(Expr::col(TransactionCol::InvoiceNumber).ilike(contains_pattern(search)));
    }

    let mut finder = Transactions::find().filter(condition);
    finder = match query.sort_order.unwrap_or(SortOrder::Desc) {
        SortOrder::Asc => finder.order_by_asc(TransactionCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(TransactionCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| transaction_from_entity(model, &state.config))
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Transactions",
        TransactionList { items },
        Some(meta),
    ))
}

pub async fn get_transaction(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<TransactionWithItems>> {
    let data = load_with_items(state, id, Some(user.user_id)).await?;
    Ok(ApiResponse::success("OK", data, Some(Meta::empty())))
}

pub async fn get_transaction_admin(
    state: &AppState,
    _admin: &AuthAdmin,
    id: Uuid,
) -> AppResult<ApiResponse<TransactionWithItems>> {
    let data = load_with_items(state, id, None).await?;
    Ok(ApiResponse::success("Transaction found", data, Some(Meta::empty())))
}

/// Create a transaction in `menunggu pembayaran` from explicit lines or from the cart.
/// Stock is validated here but only decremented when an admin accepts.
pub async fn create_transaction(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTransactionRequest,
) -> AppResult<ApiResponse<TransactionWithItems>> {
    let shipping_address = payload.shipping_address.trim().to_string();
    if shipping_address.is_empty() {
        return Err(AppError::BadRequest("shipping_address is required".into()));
    }

    let txn = state.orm.begin().await?;
    let from_cart = payload.items.is_empty();

    let mut lines: BTreeMap<LineKey, i32> = BTreeMap::new();
    if from_cart {
        let cart = ShoppingCarts::find()
            .filter(CartCol::UserId.eq(user.user_id))
            .all(&txn)
            .await?;
        for row in cart {
            add_line(&mut lines, (row.product_id, row.size_id), row.quantity)?;
        }
        if lines.is_empty() {
            return Err(AppError::BadRequest("Cart is empty".into()));
        }
    } else {
        for line in &payload.items {
            if line.quantity <= 0 {
                return Err(AppError::BadRequest("quantity must be greater than 0".into()));
            }
            add_line(&mut lines, (line.product_id, line.size_id), line.quantity)?;
        }
    }

    let mut priced: Vec<(LineKey, i32, i64)> = Vec::with_capacity(lines.len());
    let mut total_amount: i64 = 0;
    for (&(product_id, size_id), &quantity) in &lines {
        let unit_price = price_line(&txn, product_id, size_id, quantity).await?;
        total_amount = unit_price
            .checked_mul(i64::from(quantity))
            .and_then(|line_total| total_amount.checked_add(line_total))
            .ok_or_else(|| AppError::BadRequest("Transaction total is too large".into()))?;
        priced.push(((product_id, size_id), quantity, unit_price));
    }

    let transaction_id = Uuid::new_v4();
    let header = TransactionActive {
        id: Set(transaction_id),
        user_id: Set(user.user_id),
        invoice_number: Set(build_invoice_number(transaction_id)),
        status: Set(TransactionStatus::AwaitingPayment.as_str().to_string()),
        total_amount: Set(total_amount),
        shipping_address: Set(shipping_address),
        note: Set(payload.note.filter(|n| !n.trim().is_empty())),
        payment_proof: Set(None),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(priced.len());
    for ((product_id, size_id), quantity, unit_price) in priced {
        let item = ItemActive {
            id: Set(Uuid::new_v4()),
            transaction_id: Set(header.id),
            product_id: Set(product_id),
            size_id: Set(size_id),
            quantity: Set(quantity),
            price: Set(unit_price),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;
        items.push(item_from_entity(item));

        // purchased lines leave the cart
        let size_condition = match size_id {
            Some(size_id) => CartCol::SizeId.eq(size_id),
            None => CartCol::SizeId.is_null(),
        };
        ShoppingCarts::delete_many()
            .filter(CartCol::UserId.eq(user.user_id))
            .filter(CartCol::ProductId.eq(product_id))
            .filter(size_condition)
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;

    tracing::info!(
        user_id = %user.user_id,
        transaction_id = %header.id,
        total_amount,
        from_cart,
        "transaction created"
    );

    Ok(ApiResponse::success(
        "Transaction created",
        TransactionWithItems {
            transaction: transaction_from_entity(header, &state.config)?,
            items,
        },
        Some(Meta::empty()),
    ))
}

/// Merge a quantity into the line for `key`, rejecting sums that overflow.
fn add_line(lines: &mut BTreeMap<LineKey, i32>, key: LineKey, quantity: i32) -> AppResult<()> {
    let entry = lines.entry(key).or_default();
    *entry = entry
        .checked_add(quantity)
        .ok_or_else(|| AppError::BadRequest("quantity is too large".into()))?;
    Ok(())
}

/// Attach a payment proof and move the transaction to `waiting`. While it is
/// already waiting the proof is replaced.
pub async fn upload_payment_proof(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<Transaction>> {
    let existing = find_owned(state, id, user.user_id).await?;
    ensure_accepts_proof(parse_status(&existing.status)?)?;

    let stored = upload::store_image(&state.config, UploadFolder::Payments, &mut multipart).await?;

    let result = attach_proof(state, id, user.user_id, &stored).await;
    let (updated, previous) = match result {
        Ok(pair) => pair,
        Err(err) => {
            upload::remove_upload(&state.config, &stored).await;
            return Err(err);
        }
    };

    if let Some(previous) = previous.as_deref() {
        upload::remove_upload(&state.config, previous).await;
    }

    tracing::info!(user_id = %user.user_id, transaction_id = %id, "payment proof uploaded");
    Ok(ApiResponse::success(
        "Payment proof uploaded",
        transaction_from_entity(updated, &state.config)?,
        Some(Meta::empty()),
    ))
}

async fn attach_proof(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
    stored: &str,
) -> AppResult<(TransactionModel, Option<String>)> {
    let txn = state.orm.begin().await?;
    let locked = Transactions::find_by_id(id)
        .filter(TransactionCol::UserId.eq(user_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let current = parse_status(&locked.status)?;
    ensure_accepts_proof(current)?;

    let previous = locked.payment_proof.clone();
    let mut active: TransactionActive = locked.into();
    active.payment_proof = Set(Some(stored.to_string()));
    active.status = Set(TransactionStatus::Waiting.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;
    Ok((updated, previous))
}

fn ensure_accepts_proof(current: TransactionStatus) -> AppResult<()> {
    if current.is_terminal() {
        return Err(AppError::InvalidTransition {
            from: current,
            to: TransactionStatus::Waiting,
        });
    }
    Ok(())
}

/// Admin status change. Accepting decrements stock for every line inside the
/// same database transaction; any shortage rolls the whole order back.
pub async fn update_status(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
    payload: UpdateTransactionStatusRequest,
) -> AppResult<ApiResponse<TransactionWithItems>> {
    let next: TransactionStatus = payload.status.parse()?;

    let txn = state.orm.begin().await?;
    let existing = Transactions::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;

    let current = parse_status(&existing.status)?;
    current.ensure_transition(next)?;

    let items = TransactionItems::find()
        .filter(ItemCol::TransactionId.eq(id))
        .all(&txn)
        .await?;

    if next == TransactionStatus::Accept {
        decrement_stock(&txn, &items).await?;
    }

    let mut active: TransactionActive = existing.into();
    active.status = Set(next.as_str().to_string());
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        admin_id = %admin.admin_id,
        transaction_id = %id,
        from = %current,
        to = %next,
        "transaction status changed"
    );

    Ok(ApiResponse::success(
        "Transaction updated",
        TransactionWithItems {
            transaction: transaction_from_entity(updated, &state.config)?,
            items: items.into_iter().map(item_from_entity).collect(),
        },
        Some(Meta::empty()),
    ))
}

/// Customers may only cancel their own unpaid transactions.
pub async fn delete_transaction(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<TransactionDeleted>> {
    let deleted = delete_with_items(state, id, Some(user.user_id)).await?;
    Ok(ApiResponse::success("Transaction deleted", deleted, Some(Meta::empty())))
}

pub async fn delete_transaction_admin(
    state: &AppState,
    admin: &AuthAdmin,
    id: Uuid,
) -> AppResult<ApiResponse<TransactionDeleted>> {
    let deleted = delete_with_items(state, id, None).await?;
    tracing::info!(admin_id = %admin.admin_id, transaction_id = %id, "transaction deleted");
    Ok(ApiResponse::success("Transaction deleted", deleted, Some(Meta::empty())))
}

/// Remove line items and header atomically, then clean up the stored proof.
async fn delete_with_items(
    state: &AppState,
    id: Uuid,
    owner: Option<Uuid>,
) -> AppResult<TransactionDeleted> {
    let txn = state.orm.begin().await?;

    let mut finder = Transactions::find_by_id(id).lock(LockType::Update);
    if let Some(user_id) = owner {
        finder = finder.filter(TransactionCol::UserId.eq(user_id));
    }
    let header = finder.one(&txn).await?.ok_or(AppError::NotFound)?;

    if owner.is_some() && parse_status(&header.status)? != TransactionStatus::AwaitingPayment {
        return Err(AppError::BadRequest(
            "Only transactions awaiting payment can be cancelled".into(),
        ));
    }

    let removed_items = TransactionItems::delete_many()
        .filter(ItemCol::TransactionId.eq(id))
        .exec(&txn)
        .await?
        .rows_affected;
    Transactions::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    if let Some(proof) = header.payment_proof.as_deref() {
        upload::remove_upload(&state.config, proof).await;
    }

    Ok(TransactionDeleted {
        id,
        removed_items,
        payment_proof: header.payment_proof,
    })
}

/// Validate one line against current stock and return its unit price.
async fn price_line(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    size_id: Option<Uuid>,
    quantity: i32,
) -> AppResult<i64> {
    let product = Products::find_by_id(product_id)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("Product {product_id} not found")))?;
    if product.stock < quantity {
        return Err(AppError::InsufficientStock {
            product_id,
            requested: quantity,
            available: product.stock,
        });
    }

    let mut unit_price = product.price;
    if let Some(size_id) = size_id {
        let size = ProductSizes::find()
            .filter(ProductSizeCol::ProductId.eq(product_id))
            .filter(ProductSizeCol::SizeId.eq(size_id))
            .filter(ProductSizeCol::IsActive.eq(true))
            .one(txn)
            .await?
            .ok_or_else(|| {
                AppError::BadRequest(format!("Size {size_id} is not available for product {product_id}"))
            })?;
        if size.stock < quantity {
            return Err(AppError::InsufficientStock {
                product_id,
                requested: quantity,
                available: size.stock,
            });
        }
        unit_price = unit_price.saturating_add(size.price_delta);
    }

    Ok(unit_price.max(0))
}

async fn decrement_stock(txn: &DatabaseTransaction, items: &[ItemModel]) -> AppResult<()> {
    let mut ordered: Vec<&ItemModel> = items.iter().collect();
    ordered.sort_by_key(|item| (item.product_id, item.size_id));

    for item in ordered {
        let product = Products::find_by_id(item.product_id)
            .lock(LockType::Update)
            .one(txn)
            .await?
            .ok_or_else(|| AppError::BadRequest(format!("Product {} not found", item.product_id)))?;
        if product.stock < item.quantity {
            return Err(AppError::InsufficientStock {
                product_id: item.product_id,
                requested: item.quantity,
                available: product.stock,
            });
        }

        Products::update_many()
            .col_expr(ProdCol::Stock, Expr::col(ProdCol::Stock).sub(item.quantity))
            .col_expr(ProdCol::UpdatedAt, Expr::value(Utc::now()))
            .filter(ProdCol::Id.eq(item.product_id))
            .exec(txn)
            .await?;

        if let Some(size_id) = item.size_id {
            // deactivated sizes still carry stock for orders placed before deactivation
            let size = ProductSizes::find()
                .filter(ProductSizeCol::ProductId.eq(item.product_id))
                .filter(ProductSizeCol::SizeId.eq(size_id))
                .lock(LockType::Update)
                .one(txn)
                .await?
                .ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "Size {size_id} no longer exists for product {}",
                        item.product_id
                    ))
                })?;
            if size.stock < item.quantity {
                return Err(AppError::InsufficientStock {
                    product_id: item.product_id,
                    requested: item.quantity,
                    available: size.stock,
                });
            }

            let new_stock = size.stock - item.quantity;
            let mut active: ProductSizeActive = size.into();
            active.stock = Set(new_stock);
            active.updated_at = Set(Utc::now().into());
            active.update(txn).await?;
        }
    }

    Ok(())
}

async fn find_owned(state: &AppState, id: Uuid, user_id: Uuid) -> AppResult<TransactionModel> {
    Transactions::find_by_id(id)
        .filter(TransactionCol::UserId.eq(user_id))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)
}

async fn load_with_items(
    state: &AppState,
    id: Uuid,
    owner: Option<Uuid>,
) -> AppResult<TransactionWithItems> {
    let mut finder = Transactions::find_by_id(id);
    if let Some(user_id) = owner {
        finder = finder.filter(TransactionCol::UserId.eq(user_id));
    }
    let header = finder.one(&state.orm).await?.ok_or(AppError::NotFound)?;

    let items = TransactionItems::find()
        .filter(ItemCol::TransactionId.eq(header.id))
        .order_by_asc(ItemCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(item_from_entity)
        .collect();

    Ok(TransactionWithItems {
        transaction: transaction_from_entity(header, &state.config)?,
        items,
    })
}

fn parse_status(stored: &str) -> AppResult<TransactionStatus> {
    stored
        .parse()
        .map_err(|_| AppError::Internal(anyhow::anyhow!("unknown transaction status '{stored}'")))
}

fn transaction_from_entity(model: TransactionModel, config: &AppConfig) -> AppResult<Transaction> {
    let status = parse_status(&model.status)?;
    let payment_proof_url = model.payment_proof.as_deref().map(|p| config.upload_url(p));
    Ok(Transaction {
        id: model.id,
        user_id: model.user_id,
        invoice_number: model.invoice_number,
        status,
        total_amount: model.total_amount,
        shipping_address: model.shipping_address,
        note: model.note,
        payment_proof: model.payment_proof,
        payment_proof_url,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

fn item_from_entity(model: ItemModel) -> TransactionItem {
    TransactionItem {
        id: model.id,
        transaction_id: model.transaction_id,
        product_id: model.product_id,
        size_id: model.size_id,
        quantity: model.quantity,
        price: model.price,
        subtotal: model.price * model.quantity as i64,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

pub fn build_invoice_number(transaction_id: Uuid) -> String {
    let date = Utc::now().format("%Y%m%d");
    let suffix = transaction_id.simple().to_string();
    format!("INV-{}-{}", date, &suffix[..8]).to_uppercase()
}
