use crate::handlers::{
    categories::{create_category, delete_category, get_categories, update_category},
    health::health_check,
    reports::get_dashboard_summary,
    transactions::{
        bulk_delete_transactions, create_transaction, delete_transaction, get_transaction,
        get_transactions, get_upcoming_transactions, settle_transaction, update_transaction,
    },
    users::{create_user, get_user, get_users},
    workspaces::{
        add_workspace_member, create_workspace, get_workspace_settings, update_workspace_settings,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Transaction lifecycle routes
        .route("/api/v1/transactions", post(create_transaction))
        .route("/api/v1/transactions", get(get_transactions))
        .route("/api/v1/transactions/bulk-delete", post(bulk_delete_transactions))
        .route("/api/v1/transactions/upcoming/list", get(get_upcoming_transactions))
        .route("/api/v1/transactions/:transaction_id", get(get_transaction))
        .route("/api/v1/transactions/:transaction_id", put(update_transaction))
        .route("/api/v1/transactions/:transaction_id", delete(delete_transaction))
        .route("/api/v1/transactions/:transaction_id/settle", post(settle_transaction))
        // Report routes
        .route("/api/v1/reports/summary", get(get_dashboard_summary))
        // Category CRUD routes
        .route("/api/v1/categories", post(create_category))
        .route("/api/v1/categories", get(get_categories))
        .route("/api/v1/categories/:category_id", put(update_category))
        .route("/api/v1/categories/:category_id", delete(delete_category))
        // User CRUD routes
        .route("/api/v1/users", post(create_user))
        .route("/api/v1/users", get(get_users))
        .route("/api/v1/users/:user_id", get(get_user))
        // Workspace routes
        .route("/api/v1/workspaces", post(create_workspace))
        .route("/api/v1/workspaces/:workspace_id/members", post(add_workspace_member))
        .route("/api/v1/workspaces/:workspace_id/settings", get(get_workspace_settings))
        .route("/api/v1/workspaces/:workspace_id/settings", put(update_workspace_settings))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
