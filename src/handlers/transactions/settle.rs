use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use model::entities::{transaction, workspace_member};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::{debug, error, info, instrument, trace, warn};

use super::{CallerQuery, TransactionResponse};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Mark a transaction as paid. Settlement touches exactly one row; other
/// members of the group keep their own status.
#[utoipa::path(
    post,
    path = "/api/v1/transactions/{transaction_id}/settle",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
        CallerQuery,
    ),
    responses(
        (status = 200, description = "Transaction settled successfully", body = ApiResponse<TransactionResponse>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn settle_transaction(
    Path(transaction_id): Path<i32>,
    Query(caller): Query<CallerQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering settle_transaction function for transaction_id: {}", transaction_id);

    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Transaction with id {} does not exist", transaction_id),
                code: "TRANSACTION_NOT_FOUND".to_string(),
                success: false,
            }),
        )
    };

    let existing = match transaction::Entity::find_by_id(transaction_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Transaction with ID {} not found for settlement", transaction_id);
            return Err(not_found());
        }
        Err(db_error) => {
            error!(
                "Failed to look up transaction {} for settlement: {}",
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

    // The caller must own the row or belong to its workspace. Strangers get
    // the same answer as a missing row.
    if existing.user_id != caller.user_id {
        let Some(workspace_id) = existing.workspace_id else {
            warn!(
                "User {} may not settle personal transaction {}",
                caller.user_id, transaction_id
            );
            return Err(not_found());
        };
        let membership = workspace_member::Entity::find()
            .filter(workspace_member::Column::UserId.eq(caller.user_id))
            .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
            .one(&state.db)
            .await;
        match membership {
            Ok(Some(_)) => {}
            Ok(None) => {
                warn!(
                    "User {} is not a member of workspace {} owning transaction {}",
                    caller.user_id, workspace_id, transaction_id
                );
                return Err(not_found());
            }
            Err(db_error) => {
                error!("Failed to check workspace membership: {}", db_error);
                return Err((
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Failed to check workspace membership".to_string(),
                        code: "DATABASE_ERROR".to_string(),
                        success: false,
                    }),
                ));
            }
        }
    }

    // Settling twice is a no-op
    if existing.status == transaction::TransactionStatus::Paid {
        debug!("Transaction {} is already paid", transaction_id);
        let response = ApiResponse {
            data: TransactionResponse::from(existing),
            message: "Transaction already settled".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    let mut active: transaction::ActiveModel = existing.into();
    active.status = Set(transaction::TransactionStatus::Paid);
    active.paid_at = Set(Some(Utc::now().naive_utc()));

    match active.update(&state.db).await {
        Ok(settled) => {
            info!("Transaction with ID {} settled successfully", settled.id);
            state.cache.invalidate_all();
            let response = ApiResponse {
                data: TransactionResponse::from(settled),
                message: "Transaction settled successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to settle transaction {}: {}", transaction_id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to settle transaction".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
