use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use model::entities::{workspace, workspace_member, workspace_settings};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};

use super::transactions::bad_request;
use crate::schemas::{ApiResponse, AppState, ErrorResponse};

/// Query parameter naming the acting user
#[derive(Debug, Deserialize, IntoParams)]
pub struct OwnerQuery {
    pub user_id: i32,
}

/// Request body for creating a workspace
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateWorkspaceRequest {
    pub name: String,
    /// "personal", "family" or "business"
    pub kind: Option<String>,
}

/// Request body for adding a member
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AddMemberRequest {
    pub user_id: i32,
    /// "owner", "admin", "member" or "observer" (default: "member")
    pub role: Option<String>,
}

/// Request body for updating workspace settings
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateWorkspaceSettingsRequest {
    pub approval_threshold: Option<Decimal>,
    pub require_both_approval: Option<bool>,
    pub monthly_savings_goal: Option<Decimal>,
}

/// Workspace response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceResponse {
    pub id: i32,
    pub name: String,
    pub kind: String,
}

impl From<workspace::Model> for WorkspaceResponse {
    fn from(model: workspace::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            kind: model.kind.to_value(),
        }
    }
}

/// Workspace settings response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct WorkspaceSettingsResponse {
    pub workspace_id: i32,
    pub approval_threshold: Decimal,
    pub require_both_approval: bool,
    pub monthly_savings_goal: Decimal,
}

impl From<workspace_settings::Model> for WorkspaceSettingsResponse {
    fn from(model: workspace_settings::Model) -> Self {
        Self {
            workspace_id: model.workspace_id,
            approval_threshold: model.approval_threshold,
            require_both_approval: model.require_both_approval,
            monthly_savings_goal: model.monthly_savings_goal,
        }
    }
}

fn parse_workspace_kind(value: &str) -> Result<workspace::WorkspaceKind, String> {
    match value {
        "personal" => Ok(workspace::WorkspaceKind::Personal),
        "family" => Ok(workspace::WorkspaceKind::Family),
        "business" => Ok(workspace::WorkspaceKind::Business),
        _ => Err(format!("Invalid workspace kind: {}", value)),
    }
}

fn parse_member_role(value: &str) -> Result<workspace_member::MemberRole, String> {
    match value {
        "owner" => Ok(workspace_member::MemberRole::Owner),
        "admin" => Ok(workspace_member::MemberRole::Admin),
        "member" => Ok(workspace_member::MemberRole::Member),
        "observer" => Ok(workspace_member::MemberRole::Observer),
        _ => Err(format!("Invalid member role: {}", value)),
    }
}

fn internal_error(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: message.to_string(),
            code: "DATABASE_ERROR".to_string(),
            success: false,
        }),
    )
}

/// Create a workspace with the caller as its owner and default settings
#[utoipa::path(
    post,
    path = "/api/v1/workspaces",
    tag = "workspaces",
    params(OwnerQuery),
    request_body = CreateWorkspaceRequest,
    responses(
        (status = 201, description = "Workspace created successfully", body = ApiResponse<WorkspaceResponse>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_workspace(
    Query(owner): Query<OwnerQuery>,
    State(state): State<AppState>,
    Json(request): Json<CreateWorkspaceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<WorkspaceResponse>>), (StatusCode, Json<ErrorResponse>)>
{
    trace!("Entering create_workspace function");
    debug!("Creating workspace '{}' for user {}", request.name, owner.user_id);

    let kind = match &request.kind {
        Some(value) => parse_workspace_kind(value).map_err(bad_request)?,
        None => workspace::WorkspaceKind::Family,
    };

    let created = workspace::ActiveModel {
        name: Set(request.name.clone()),
        kind: Set(kind),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(&state.db)
    .await;

    let ws = match created {
        Ok(ws) => ws,
        Err(db_error) => {
            error!("Failed to create workspace '{}': {}", request.name, db_error);
            return Err(internal_error("Failed to create workspace"));
        }
    };

    let membership = workspace_member::ActiveModel {
        user_id: Set(owner.user_id),
        workspace_id: Set(ws.id),
        role: Set(workspace_member::MemberRole::Owner),
        status: Set(workspace_member::MemberStatus::Active),
    }
    .insert(&state.db)
    .await;
    if let Err(db_error) = membership {
        error!("Failed to add owner to workspace {}: {}", ws.id, db_error);
        return Err(internal_error("Failed to add workspace owner"));
    }

    let settings = default_settings(ws.id).insert(&state.db).await;
    if let Err(db_error) = settings {
        error!("Failed to create settings for workspace {}: {}", ws.id, db_error);
        return Err(internal_error("Failed to create workspace settings"));
    }

    info!("Workspace created successfully with ID: {}", ws.id);
    let response = ApiResponse {
        data: WorkspaceResponse::from(ws),
        message: "Workspace created successfully".to_string(),
        success: true,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

fn default_settings(workspace_id: i32) -> workspace_settings::ActiveModel {
    workspace_settings::ActiveModel {
        workspace_id: Set(workspace_id),
        approval_threshold: Set(Decimal::from_str("500.00").unwrap_or(Decimal::ZERO)),
        require_both_approval: Set(false),
        monthly_savings_goal: Set(Decimal::from_str("5000.00").unwrap_or(Decimal::ZERO)),
        ..Default::default()
    }
}

/// Add an active member to a workspace
#[utoipa::path(
    post,
    path = "/api/v1/workspaces/{workspace_id}/members",
    tag = "workspaces",
    params(
        ("workspace_id" = i32, Path, description = "Workspace ID"),
    ),
    request_body = AddMemberRequest,
    responses(
        (status = 201, description = "Member added successfully", body = ApiResponse<String>),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Workspace not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn add_workspace_member(
    Path(workspace_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<ApiResponse<String>>), (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering add_workspace_member function");

    let role = match &request.role {
        Some(value) => parse_member_role(value).map_err(bad_request)?,
        None => workspace_member::MemberRole::Member,
    };

    match workspace::Entity::find_by_id(workspace_id).one(&state.db).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            warn!("Workspace with ID {} not found", workspace_id);
            return Err((
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: format!("Workspace with id {} does not exist", workspace_id),
                    code: "WORKSPACE_NOT_FOUND".to_string(),
                    success: false,
                }),
            ));
        }
        Err(db_error) => {
            error!("Failed to look up workspace {}: {}", workspace_id, db_error);
            return Err(internal_error("Failed to look up workspace"));
        }
    }

    let membership = workspace_member::ActiveModel {
        user_id: Set(request.user_id),
        workspace_id: Set(workspace_id),
        role: Set(role),
        status: Set(workspace_member::MemberStatus::Active),
    }
    .insert(&state.db)
    .await;

    match membership {
        Ok(_) => {
            info!(
                "User {} added to workspace {} successfully",
                request.user_id, workspace_id
            );
            let response = ApiResponse {
                data: format!("User {} added to workspace {}", request.user_id, workspace_id),
                message: "Member added successfully".to_string(),
                success: true,
            };
            Ok((StatusCode::CREATED, Json(response)))
        }
        Err(db_error) => {
            error!(
                "Failed to add user {} to workspace {}: {}",
                request.user_id, workspace_id, db_error
            );
            Err(internal_error("Failed to add workspace member"))
        }
    }
}

/// Get workspace settings, creating defaults when none exist yet
#[utoipa::path(
    get,
    path = "/api/v1/workspaces/{workspace_id}/settings",
    tag = "workspaces",
    params(
        ("workspace_id" = i32, Path, description = "Workspace ID"),
    ),
    responses(
        (status = 200, description = "Settings retrieved successfully", body = ApiResponse<WorkspaceSettingsResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_workspace_settings(
    Path(workspace_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<WorkspaceSettingsResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering get_workspace_settings function");

    let existing = workspace_settings::Entity::find()
        .filter(workspace_settings::Column::WorkspaceId.eq(workspace_id))
        .one(&state.db)
        .await;

    let settings = match existing {
        Ok(Some(settings)) => settings,
        Ok(None) => {
            debug!("Creating default settings for workspace {}", workspace_id);
            match default_settings(workspace_id).insert(&state.db).await {
                Ok(settings) => settings,
                Err(db_error) => {
                    error!(
                        "Failed to create default settings for workspace {}: {}",
                        workspace_id, db_error
                    );
                    return Err(internal_error("Failed to create workspace settings"));
                }
            }
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve settings for workspace {}: {}",
                workspace_id, db_error
            );
            return Err(internal_error("Failed to retrieve workspace settings"));
        }
    };

    let response = ApiResponse {
        data: WorkspaceSettingsResponse::from(settings),
        message: "Settings retrieved successfully".to_string(),
        success: true,
    };
    Ok(Json(response))
}

/// Update workspace settings
#[utoipa::path(
    put,
    path = "/api/v1/workspaces/{workspace_id}/settings",
    tag = "workspaces",
    params(
        ("workspace_id" = i32, Path, description = "Workspace ID"),
    ),
    request_body = UpdateWorkspaceSettingsRequest,
    responses(
        (status = 200, description = "Settings updated successfully", body = ApiResponse<WorkspaceSettingsResponse>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_workspace_settings(
    Path(workspace_id): Path<i32>,
    State(state): State<AppState>,
    Json(request): Json<UpdateWorkspaceSettingsRequest>,
) -> Result<Json<ApiResponse<WorkspaceSettingsResponse>>, (StatusCode, Json<ErrorResponse>)> {
    trace!("Entering update_workspace_settings function");

    let existing = workspace_settings::Entity::find()
        .filter(workspace_settings::Column::WorkspaceId.eq(workspace_id))
        .one(&state.db)
        .await;

    let result = match existing {
        Ok(Some(settings)) => {
            let mut active: workspace_settings::ActiveModel = settings.into();
            if let Some(threshold) = request.approval_threshold {
                active.approval_threshold = Set(threshold);
            }
            if let Some(require_both) = request.require_both_approval {
                active.require_both_approval = Set(require_both);
            }
            if let Some(goal) = request.monthly_savings_goal {
                active.monthly_savings_goal = Set(goal);
            }
            active.update(&state.db).await
        }
        Ok(None) => {
            let mut active = default_settings(workspace_id);
            if let Some(threshold) = request.approval_threshold {
                active.approval_threshold = Set(threshold);
            }
            if let Some(require_both) = request.require_both_approval {
                active.require_both_approval = Set(require_both);
            }
            if let Some(goal) = request.monthly_savings_goal {
                active.monthly_savings_goal = Set(goal);
            }
            active.insert(&state.db).await
        }
        Err(db_error) => {
            error!(
                "Failed to retrieve settings for workspace {}: {}",
                workspace_id, db_error
            );
            return Err(internal_error("Failed to retrieve workspace settings"));
        }
    };

    match result {
        Ok(settings) => {
            info!("Settings for workspace {} updated successfully", workspace_id);
            let response = ApiResponse {
                data: WorkspaceSettingsResponse::from(settings),
                message: "Settings updated successfully".to_string(),
                success: true,
            };
            Ok(Json(response))
        }
        Err(db_error) => {
            error!(
                "Failed to update settings for workspace {}: {}",
                workspace_id, db_error
            );
            Err(internal_error("Failed to update workspace settings"))
        }
    }
}
