use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDateTime;
use common::DeleteScope;
use engine::NewTransaction;
use model::entities::transaction;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};

use super::{bad_request, engine_error_response, parse_kind, parse_period, parse_status};
use super::{CallerQuery, TransactionResponse};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request body for creating a new transaction
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateTransactionRequest {
    /// Transaction description
    pub description: String,
    /// Positive magnitude; direction comes from `kind`
    pub amount: Decimal,
    /// "income" or "expense"
    pub kind: String,
    /// Nominal occurrence date
    pub date: NaiveDateTime,
    /// Scheduling date for unpaid items
    pub due_date: Option<NaiveDateTime>,
    /// Requested status (default: "paid")
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub category_id: Option<i32>,
    /// Joint expense flag for workspaces
    pub is_joint: Option<bool>,
    /// Marks a simple periodic series
    pub is_recurring: Option<bool>,
    /// "daily", "weekly", "monthly" or "yearly"
    pub recurrence_period: Option<String>,
    /// Number of installments; values above 1 create a plan
    pub installment_count: Option<i32>,
}

/// Request body for updating a single transaction row
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateTransactionRequest {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub kind: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub due_date: Option<NaiveDateTime>,
    pub status: Option<String>,
    pub payment_method: Option<String>,
    pub category_id: Option<i32>,
    pub is_joint: Option<bool>,
}

/// Query parameters selecting the delete scope
#[derive(Debug, Deserialize, IntoParams)]
pub struct DeleteTransactionQuery {
    /// "single" (default) or "all"
    pub scope: Option<DeleteScope>,
    /// Month of the occurrence to remove (1-12)
    pub month: Option<u32>,
    /// Year of the occurrence to remove
    pub year: Option<i32>,
}

/// Request body for bulk deletion
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct BulkDeleteRequest {
    pub transaction_ids: Vec<i32>,
}

/// Create a new transaction, installment plan, or recurring series
#[utoipa::path(
    post,
    path = "/api/v1/transactions",
    tag = "transactions",
    params(CallerQuery),
    request_body = CreateTransactionRequest,
    responses(
        (status = 201, description = "Transaction created successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_transaction(
    Query(caller): Query<CallerQuery>,
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TransactionResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_transaction function");
    debug!(
        "Creating transaction '{}', amount {}, user {}",
        request.description, request.amount, caller.user_id
    );

    let kind = parse_kind(&request.kind).map_err(bad_request)?;
    let status = match &request.status {
        Some(value) => Some(parse_status(value).map_err(bad_request)?),
        None => None,
    };
    let recurrence_period = match &request.recurrence_period {
        Some(value) => Some(parse_period(value).map_err(bad_request)?),
        None => None,
    };

    let new_transaction = NewTransaction {
        description: request.description,
        amount: request.amount,
        kind,
        date: request.date,
        due_date: request.due_date,
        status,
        payment_method: request.payment_method,
        category_id: request.category_id,
        is_joint: request.is_joint.unwrap_or(false),
        is_recurring: request.is_recurring.unwrap_or(false),
        recurrence_period,
        installment_count: request.installment_count.unwrap_or(1),
    };

    match engine::create_transaction(&state.db, new_transaction, caller.user_id, caller.workspace_id)
        .await
    {
        Ok(anchor) => {
            info!(
                "Transaction created successfully with ID: {}, installments: {}",
                anchor.id, anchor.installment_count
            );
            state.cache.invalidate_all();
            let response = ApiResponse {
                data: TransactionResponse::from(anchor),
                message: "Transaction created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(engine_error) => Err(engine_error_response(engine_error)),
    }
}

/// Update a single transaction row. Edits never cascade to other members of
/// the row's group.
#[utoipa::path(
    put,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    request_body = UpdateTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated successfully", body = ApiResponse<TransactionResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_transaction(
    Path(transaction_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateTransactionRequest>,
) -> Result<Json<ApiResponse<TransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_transaction function for transaction_id: {}", transaction_id);

    let existing = match transaction::Entity::find_by_id(transaction_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Transaction with ID {} not found for update", transaction_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Transaction with id {} does not exist", transaction_id),
                    code: "TRANSACTION_NOT_FOUND".to_string(),
                    success: false,
                }),
            ));
        }
        Err(db_error) => {
            error!(
                "Failed to lookup transaction with ID {} for update: {}",
                transaction_id, db_error
            );
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to look up transaction".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    let mut active: transaction::ActiveModel = existing.into();

    if let Some(description) = request.description {
        active.description = Set(description);
    }
    if let Some(amount) = request.amount {
        active.amount = Set(amount);
    }
    if let Some(kind) = request.kind {
        active.kind = Set(parse_kind(&kind).map_err(bad_request)?);
    }
    if let Some(date) = request.date {
        active.date = Set(date);
    }
    if let Some(due_date) = request.due_date {
        active.due_date = Set(Some(due_date));
    }
    if let Some(status) = request.status {
        active.status = Set(parse_status(&status).map_err(bad_request)?);
    }
    if let Some(payment_method) = request.payment_method {
        active.payment_method = Set(Some(payment_method));
    }
    if let Some(category_id) = request.category_id {
        active.category_id = Set(Some(category_id));
    }
    if let Some(is_joint) = request.is_joint {
        active.is_joint = Set(is_joint);
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Transaction with ID {} updated successfully", transaction_id);
            state.cache.invalidate_all();
            let response = ApiResponse {
                data: TransactionResponse::from(updated),
                message: "Transaction updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update transaction with ID {}: {}", transaction_id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update transaction".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Delete a transaction occurrence, a month's occurrence, or a whole series
#[utoipa::path(
    delete,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        DeleteTransactionQuery,
    ),
    responses(
        (status = 200, description = "Transaction deleted successfully", body = ApiResponse<TransactionResponse>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_transaction(
    Path(transaction_id): Path<i32>,
    Query(query): Query<DeleteTransactionQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_transaction function for transaction_id: {}", transaction_id);
    let scope = query.scope.unwrap_or_default();
    debug!(
        "Deleting transaction {} with scope {:?}, month {:?}, year {:?}",
        transaction_id, scope, query.month, query.year
    );

    match engine::delete_transaction(&state.db, transaction_id, scope, query.month, query.year)
        .await
    {
        Ok(removed) => {
            info!("Transaction with ID {} deleted successfully", removed.id);
            state.cache.invalidate_all();
            let response = ApiResponse {
                data: TransactionResponse::from(removed),
                message: "Transaction deleted successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(engine_error) => Err(engine_error_response(engine_error)),
    }
}

/// Delete several transactions and their group members at once
#[utoipa::path(
    post,
    path = "/api/v1/transactions/bulk-delete",
    tag = "transactions",
    request_body = BulkDeleteRequest,
    responses(
        (status = 200, description = "Transactions deleted successfully", body = ApiResponse<u64>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn bulk_delete_transactions(
    State(state): State<AppState>,
    Json(request): Json<BulkDeleteRequest>,
) -> Result<Json<ApiResponse<u64>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering bulk_delete_transactions function");
    debug!("Bulk delete request for {:?}", request.transaction_ids);

    match engine::delete_transactions(&state.db, &request.transaction_ids).await {
        Ok(count) => {
            info!("Bulk delete removed {} transactions", count);
            state.cache.invalidate_all();
            let response = ApiResponse {
                data: count,
                message: format!("{} transactions deleted successfully", count),
                success: true,
            };
            Ok(Json(response))
        }
        Err(engine_error) => Err(engine_error_response(engine_error)),
    }
}
