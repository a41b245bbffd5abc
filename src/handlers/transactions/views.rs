use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use common::PersonFilter;
use engine::ListQuery;
use model::entities::transaction;
use sea_orm::EntityTrait;
use serde::Deserialize;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::IntoParams;
use validator::Validate;

use super::{engine_error_response, TransactionResponse};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameters for listing transactions
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct ListTransactionsQuery {
    /// Acting user
    pub user_id: i32,
    /// Active workspace, if any
    pub workspace_id: Option<i32>,
    /// Page number (default: 1)
    #[validate(range(min = 1, max = 10000))]
    pub page: Option<u64>,
    /// Page size (default: 100)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u64>,
    /// One row per group instead of one row per occurrence
    pub summary_view: Option<bool>,
    /// Person filter inside workspaces: mine, partner, joint or all
    pub filter_by: Option<PersonFilter>,
}

/// Query parameters for the upcoming view
#[derive(Debug, Deserialize, IntoParams, Validate)]
pub struct UpcomingQuery {
    pub user_id: i32,
    pub workspace_id: Option<i32>,
    /// Maximum rows returned (default: 10)
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<u64>,
    /// Restrict to a month (1-12); requires `year`
    pub month: Option<u32>,
    /// Restrict to a year; requires `month`
    pub year: Option<i32>,
}

/// List transactions as a statement or as grouped summary rows
#[utoipa::path(
    get,
    path = "/api/v1/transactions",
    tag = "transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Transactions retrieved successfully", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transactions(
    Valid(Query(query)): Valid<Query<ListTransactionsQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_transactions function");

    let list_query = ListQuery {
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(100),
        summary_view: query.summary_view.unwrap_or(false),
        filter_by: query.filter_by,
    };
    debug!(
        "Fetching transactions for user {} (workspace {:?}), summary: {}",
        query.user_id, query.workspace_id, list_query.summary_view
    );

    match engine::list_transactions(&state.db, query.user_id, query.workspace_id, &list_query)
        .await
    {
        Ok(rows) => {
            info!("Successfully retrieved {} transactions", rows.len());
            let data: Vec<TransactionResponse> =
                rows.into_iter().map(TransactionResponse::from).collect();
            let response = ApiResponse {
                data,
                message: "Transactions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(engine_error) => Err(engine_error_response(engine_error)),
    }
}

/// Get a specific transaction by ID
#[utoipa::path(
    get,
    path = "/api/v1/transactions/{transaction_id}",
    tag = "transactions",
    params(
        ("transaction_id" = i32, Path, description = "Transaction ID"),
    ),
    responses(
        (status = 200, description = "Transaction retrieved successfully", body = ApiResponse<TransactionResponse>),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_transaction(
    Path(transaction_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<TransactionResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_transaction function for transaction_id: {}", transaction_id);

    match transaction::Entity::find_by_id(transaction_id)
        .one(&state.db)
        .await
    {
        Ok(Some(model)) => {
            info!("Successfully retrieved transaction with ID: {}", model.id);
            let response = ApiResponse {
                data: TransactionResponse::from(model),
                message: "Transaction retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Ok(None) => {
            warn!("Transaction with ID {} not found", transaction_id);
            Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Transaction with id {} does not exist", transaction_id),
                    code: "TRANSACTION_NOT_FOUND".to_string(),
                    success: false,
                }),
            ))
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve transaction with ID {}: {}",
                transaction_id, db_error
            );
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to retrieve transaction".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// List pending transactions ordered by effective date
#[utoipa::path(
    get,
    path = "/api/v1/transactions/upcoming/list",
    tag = "transactions",
    params(UpcomingQuery),
    responses(
        (status = 200, description = "Upcoming transactions retrieved successfully", body = ApiResponse<Vec<TransactionResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_upcoming_transactions(
    Valid(Query(query)): Valid<Query<UpcomingQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TransactionResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_upcoming_transactions function");
    debug!(
        "Fetching upcoming transactions for user {} (workspace {:?})",
        query.user_id, query.workspace_id
    );

    match engine::upcoming_transactions(
        &state.db,
        query.user_id,
        query.workspace_id,
        query.limit.unwrap_or(10),
        query.month,
        query.year,
    )
    .await
    {
        Ok(rows) => {
            info!("Successfully retrieved {} upcoming transactions", rows.len());
            let data: Vec<TransactionResponse> =
                rows.into_iter().map(TransactionResponse::from).collect();
            let response = ApiResponse {
                data,
                message: "Upcoming transactions retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(engine_error) => Err(engine_error_response(engine_error)),
    }
}
