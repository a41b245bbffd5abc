//! Transaction endpoints. The heavy lifting lives in the engine crate;
//! these handlers translate HTTP shapes into engine calls and engine errors
//! into status codes.

pub mod lifecycle;
pub mod settle;
pub mod views;

pub use lifecycle::{
    bulk_delete_transactions, create_transaction, delete_transaction, update_transaction,
};
pub use settle::settle_transaction;
pub use views::{get_transaction, get_transactions, get_upcoming_transactions};

use axum::http::StatusCode;
use axum::response::Json;
use chrono::NaiveDateTime;
use engine::EngineError;
use model::entities::transaction;
use rust_decimal::Decimal;
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::{IntoParams, ToSchema};

use crate::schemas::ErrorResponse;

/// Caller identity, forwarded by the out-of-scope auth layer.
#[derive(Debug, Deserialize, IntoParams)]
pub struct CallerQuery {
    /// Acting user
    pub user_id: i32,
    /// Active workspace, if the caller works in a shared scope
    pub workspace_id: Option<i32>,
}

/// Transaction response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i32,
    pub description: String,
    pub amount: Decimal,
    pub kind: String,
    pub date: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub status: String,
    pub paid_at: Option<NaiveDateTime>,
    pub payment_method: Option<String>,
    pub category_id: Option<i32>,
    pub category_name: Option<String>,
    pub category_icon: Option<String>,
    pub category_color: Option<String>,
    pub user_id: i32,
    pub created_by_user_id: Option<i32>,
    pub workspace_id: Option<i32>,
    pub is_joint: bool,
    pub is_recurring: bool,
    pub recurrence_period: Option<String>,
    pub installment_count: i32,
    pub installment_number: i32,
    pub parent_id: Option<i32>,
    pub created_at: NaiveDateTime,
    /// Face value of the whole group; present on summary rows only
    pub total_value: Option<Decimal>,
}

impl From<transaction::Model> for TransactionResponse {
    fn from(model: transaction::Model) -> Self {
        Self {
            id: model.id,
            description: model.description,
            amount: model.amount,
            kind: model.kind.to_value(),
            date: model.date,
            due_date: model.due_date,
            status: model.status.to_value(),
            paid_at: model.paid_at,
            payment_method: model.payment_method,
            category_id: model.category_id,
            category_name: None,
            category_icon: None,
            category_color: None,
            user_id: model.user_id,
            created_by_user_id: model.created_by_user_id,
            workspace_id: model.workspace_id,
            is_joint: model.is_joint,
            is_recurring: model.is_recurring,
            recurrence_period: model.recurrence_period.map(|p| p.to_value()),
            installment_count: model.installment_count,
            installment_number: model.installment_number,
            parent_id: model.parent_id,
            created_at: model.created_at,
            total_value: None,
        }
    }
}

impl From<engine::GroupRow> for TransactionResponse {
    fn from(row: engine::GroupRow) -> Self {
        let total_value = Some(row.total_value);
        let category = row.category;
        let mut response = TransactionResponse::from(row.transaction);
        if let Some(category) = category {
            response.category_name = Some(category.name);
            response.category_icon = category.icon;
            response.category_color = Some(category.color);
        }
        response.total_value = total_value;
        response
    }
}

// Request enums travel as their stored string values

pub(crate) fn parse_kind(value: &str) -> Result<transaction::TransactionKind, String> {
    match value {
        "income" => Ok(transaction::TransactionKind::Income),
        "expense" => Ok(transaction::TransactionKind::Expense),
        _ => Err(format!("Invalid transaction kind: {}", value)),
    }
}

pub(crate) fn parse_status(value: &str) -> Result<transaction::TransactionStatus, String> {
    match value {
        "paid" => Ok(transaction::TransactionStatus::Paid),
        "pending" => Ok(transaction::TransactionStatus::Pending),
        "pending_approval" => Ok(transaction::TransactionStatus::PendingApproval),
        "overdue" => Ok(transaction::TransactionStatus::Overdue),
        _ => Err(format!("Invalid transaction status: {}", value)),
    }
}

pub(crate) fn parse_period(value: &str) -> Result<transaction::RecurrencePeriod, String> {
    match value {
        "daily" => Ok(transaction::RecurrencePeriod::Daily),
        "weekly" => Ok(transaction::RecurrencePeriod::Weekly),
        "monthly" => Ok(transaction::RecurrencePeriod::Monthly),
        "yearly" => Ok(transaction::RecurrencePeriod::Yearly),
        _ => Err(format!("Invalid recurrence period: {}", value)),
    }
}

/// Maps an engine error onto the HTTP surface.
pub(crate) fn engine_error_response(err: EngineError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        EngineError::NotFound(message) => {
            warn!("{}", message);
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: message,
                    code: "TRANSACTION_NOT_FOUND".to_string(),
                    success: false,
                }),
            )
        }
        EngineError::Validation(message) => {
            warn!("Rejected transaction request: {}", message);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: message,
                    code: "VALIDATION_FAILURE".to_string(),
                    success: false,
                }),
            )
        }
        EngineError::Database(db_error) => {
            error!("Database error in transaction operation: {}", db_error);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Transaction operation failed".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            )
        }
    }
}

pub(crate) fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    warn!("Invalid request: {}", message);
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message,
            code: "INVALID_REQUEST".to_string(),
            success: false,
        }),
    )
}
