use common::{CategoryBreakdown, DashboardSummary, DeleteScope, PersonFilter, TrendPoint};
use moka::future::Cache;
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for dashboard report reads; invalidated by every ledger write
    pub cache: Cache<String, DashboardSummary>,
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::transactions::lifecycle::create_transaction,
        crate::handlers::transactions::lifecycle::update_transaction,
        crate::handlers::transactions::lifecycle::delete_transaction,
        crate::handlers::transactions::lifecycle::bulk_delete_transactions,
        crate::handlers::transactions::views::get_transactions,
        crate::handlers::transactions::views::get_transaction,
        crate::handlers::transactions::views::get_upcoming_transactions,
        crate::handlers::transactions::settle::settle_transaction,
        crate::handlers::reports::get_dashboard_summary,
        crate::handlers::categories::create_category,
        crate::handlers::categories::get_categories,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::users::create_user,
        crate::handlers::users::get_users,
        crate::handlers::users::get_user,
        crate::handlers::workspaces::create_workspace,
        crate::handlers::workspaces::add_workspace_member,
        crate::handlers::workspaces::get_workspace_settings,
        crate::handlers::workspaces::update_workspace_settings,
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            ApiResponse<crate::handlers::transactions::TransactionResponse>,
            ApiResponse<Vec<crate::handlers::transactions::TransactionResponse>>,
            ApiResponse<DashboardSummary>,
            crate::handlers::transactions::TransactionResponse,
            crate::handlers::transactions::lifecycle::CreateTransactionRequest,
            crate::handlers::transactions::lifecycle::UpdateTransactionRequest,
            crate::handlers::transactions::lifecycle::BulkDeleteRequest,
            crate::handlers::categories::CategoryResponse,
            crate::handlers::categories::CreateCategoryRequest,
            crate::handlers::categories::UpdateCategoryRequest,
            crate::handlers::users::UserResponse,
            crate::handlers::users::CreateUserRequest,
            crate::handlers::workspaces::WorkspaceResponse,
            crate::handlers::workspaces::CreateWorkspaceRequest,
            crate::handlers::workspaces::AddMemberRequest,
            crate::handlers::workspaces::WorkspaceSettingsResponse,
            crate::handlers::workspaces::UpdateWorkspaceSettingsRequest,
            DashboardSummary,
            TrendPoint,
            CategoryBreakdown,
            PersonFilter,
            DeleteScope,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "transactions", description = "Transaction lifecycle endpoints"),
        (name = "reports", description = "Dashboard report endpoints"),
        (name = "categories", description = "Category management endpoints"),
        (name = "users", description = "User management endpoints"),
        (name = "workspaces", description = "Workspace management endpoints"),
    ),
    info(
        title = "fintrack API",
        description = "Personal and shared finance tracker with installment and recurring transaction support",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
