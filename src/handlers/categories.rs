use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use model::entities::category;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;

use super::transactions::{bad_request, parse_kind, CallerQuery};
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Request structure for creating a new category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateCategoryRequest {
    /// The name of the category
    pub name: String,
    /// "income" or "expense"
    pub kind: String,
    /// Display color (hex)
    pub color: Option<String>,
    /// Icon name understood by the client
    pub icon: Option<String>,
    /// Monthly budget limit
    pub budget_limit: Option<Decimal>,
}

/// Request structure for updating an existing category
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub budget_limit: Option<Decimal>,
}

/// Response structure for category operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub kind: String,
    pub color: String,
    pub icon: Option<String>,
    pub budget_limit: Decimal,
    pub user_id: i32,
    pub workspace_id: Option<i32>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            kind: model.kind.to_value(),
            color: model.color,
            icon: model.icon,
            budget_limit: model.budget_limit,
            user_id: model.user_id,
            workspace_id: model.workspace_id,
        }
    }
}

/// Create a new category
#[utoipa::path(
    post,
    path = "/api/v1/categories",
    tag = "categories",
    params(CallerQuery),
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_category(
    Query(caller): Query<CallerQuery>,
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CategoryResponse>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering create_category function");
    debug!("Creating category '{}' for user {}", request.name, caller.user_id);

    let kind = parse_kind(&request.kind).map_err(bad_request)?;

    let new_category = category::ActiveModel {
        name: Set(request.name.clone()),
        kind: Set(kind),
        color: Set(request.color.unwrap_or_else(|| "#000000".to_string())),
        icon: Set(request.icon.clone()),
        budget_limit: Set(request.budget_limit.unwrap_or(Decimal::ZERO)),
        user_id: Set(caller.user_id),
        workspace_id: Set(caller.workspace_id),
        ..Default::default()
    };

    match new_category.insert(&state.db).await {
        Ok(model) => {
            info!("Category created successfully with ID: {}", model.id);
            let response = ApiResponse {
                data: CategoryResponse::from(model),
                message: "Category created successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!("Failed to create category '{}': {}", request.name, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to create category".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Get all categories visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    tag = "categories",
    params(CallerQuery),
    responses(
        (status = 200, description = "Categories retrieved successfully", body = ApiResponse<Vec<CategoryResponse>>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_categories(
    Query(caller): Query<CallerQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<CategoryResponse>>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_categories function");

    let mut select = category::Entity::find();
    select = match caller.workspace_id {
        Some(workspace_id) => select.filter(category::Column::WorkspaceId.eq(workspace_id)),
        None => select.filter(category::Column::UserId.eq(caller.user_id)),
    };

    match select.all(&state.db).await {
        Ok(categories) => {
            info!("Successfully retrieved {} categories", categories.len());
            let data: Vec<CategoryResponse> =
                categories.into_iter().map(CategoryResponse::from).collect();
            let response = ApiResponse {
                data,
                message: "Categories retrieved successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to retrieve categories: {}", db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to retrieve categories".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Update a category
#[utoipa::path(
    put,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated successfully", body = ApiResponse<CategoryResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<CategoryResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_category function for category_id: {}", category_id);

    let existing = match category::Entity::find_by_id(category_id).one(&state.db).await {
        Ok(Some(model)) => model,
        Ok(None) => {
            warn!("Category with ID {} not found for update", category_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Category with id {} does not exist", category_id),
                    code: "CATEGORY_NOT_FOUND".to_string(),
                    success: false,
                }),
            ));
        }
        Err(db_error) => {
            error!("Failed to lookup category {}: {}", category_id, db_error);
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to look up category".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ));
        }
    };

    let mut active: category::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name);
    }
    if let Some(kind) = request.kind {
        active.kind = Set(parse_kind(&kind).map_err(bad_request)?);
    }
    if let Some(color) = request.color {
        active.color = Set(color);
    }
    if let Some(icon) = request.icon {
        active.icon = Set(Some(icon));
    }
    if let Some(budget_limit) = request.budget_limit {
        active.budget_limit = Set(budget_limit);
    }

    match active.update(&state.db).await {
        Ok(updated) => {
            info!("Category with ID {} updated successfully", category_id);
            let response = ApiResponse {
                data: CategoryResponse::from(updated),
                message: "Category updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!("Failed to update category {}: {}", category_id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to update category".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}

/// Delete a category. Transactions keep existing; their category link is
/// cleared by the store.
#[utoipa::path(
    delete,
    path = "/api/v1/categories/{category_id}",
    tag = "categories",
    params(
        ("category_id" = i32, Path, description = "Category ID"),
    ),
    responses(
        (status = 200, description = "Category deleted successfully", body = ApiResponse<String>),
        (status = 404, description = "Category not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_category(
    Path(category_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<String>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering delete_category function for category_id: {}", category_id);

    match category::Entity::delete_by_id(category_id)
        .exec(&state.db)
        .await
    {
        Ok(delete_result) => {
            if delete_result.rows_affected > 0 {
                info!("Category with ID {} deleted successfully", category_id);
                let response = ApiResponse {
                    data: format!("Category {} deleted", category_id),
                    message: "Category deleted successfully".to_string(),
                    success: true,
                };
                Ok(Json(response))
            } else {
                warn!("Category with ID {} not found for deletion", category_id);
                Err((
                    StatusCode::NOT_FOUND,
                    Json(ErrorResponse {
                        error: format!("Category with id {} does not exist", category_id),
                        code: "CATEGORY_NOT_FOUND".to_string(),
                        success: false,
                    }),
                ))
            }
        }
        Err(db_error) => {
            error!("Failed to delete category {}: {}", category_id, db_error);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to delete category".to_string(),
                    code: "DATABASE_ERROR".to_string(),
                    success: false,
                }),
            ))
        }
    }
}
