use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Transaction, TransactionItem};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TransactionLineRequest {
    pub product_id: Uuid,
    pub size_id: Option<Uuid>,
    pub quantity: i32,
}

/// When `items` is empty the caller's cart is checked out instead.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionRequest {
    #[serde(default)]
    pub items: Vec<TransactionLineRequest>,
    pub shipping_address: String,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTransactionStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionWithItems {
    pub transaction: Transaction,
    pub items: Vec<TransactionItem>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TransactionList {
    #[schema(value_type = Vec<Transaction>)]
    pub items: Vec<Transaction>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionDeleted {
    pub id: Uuid,
    pub removed_items: u64,
    pub payment_proof: Option<String>,
}
