use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use common::DashboardSummary;
use serde::Deserialize;
use tracing::{debug, info, instrument, trace};
use utoipa::IntoParams;

use super::transactions::engine_error_response;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameters for the dashboard summary
#[derive(Debug, Deserialize, IntoParams)]
pub struct SummaryQuery {
    /// Acting user
    pub user_id: i32,
    /// Active workspace, if any
    pub workspace_id: Option<i32>,
    /// Target month (1-12, default: current)
    pub month: Option<u32>,
    /// Target year (default: current)
    pub year: Option<i32>,
}

/// Dashboard summary: paid totals, trends and category breakdowns
#[utoipa::path(
    get,
    path = "/api/v1/reports/summary",
    tag = "reports",
    params(SummaryQuery),
    responses(
        (status = 200, description = "Dashboard summary retrieved successfully", body = ApiResponse<DashboardSummary>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_dashboard_summary(
    Query(query): Query<SummaryQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<DashboardSummary>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_dashboard_summary function");

    let cache_key = format!(
        "summary_{}_{:?}_{:?}_{:?}",
        query.user_id, query.workspace_id, query.month, query.year
    );

    // Check cache first
    if let Some(summary) = state.cache.get(&cache_key).await {
        debug!("Dashboard summary served from cache");
        let response = ApiResponse {
            data: summary,
            message: "Dashboard summary retrieved from cache".to_string(),
            success: true,
        };
        return Ok(Json(response));
    }

    match engine::dashboard_summary(
        &state.db,
        query.user_id,
        query.workspace_id,
        query.month,
        query.year,
    )
    .await
    {
        Ok(summary) => {
            info!(
                "Dashboard summary computed for user {} (workspace {:?})",
                query.user_id, query.workspace_id
            );
            state.cache.insert(cache_key, summary.clone()).await;
            let response = ApiResponse {
                data: summary,
                message: "Dashboard summary retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(engine_error) => Err(engine_error_response(engine_error)),
    }
}
