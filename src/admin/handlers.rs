use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    admin::dto::SetActiveRequest,
    auth::jwt::AdminUser,
    error::ApiError,
    state::AppState,
    swaps::{
        dto::{MessageResponse, UpdateStatusRequest},
        lifecycle::Role,
        repo::{SwapRequest, SwapWithUsers},
        service,
    },
    users::repo::User,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id/active", put(set_user_active))
        .route("/admin/swaps", get(list_swaps))
        .route("/admin/swaps/:id/status", put(set_swap_status))
        .route("/admin/swaps/:id", delete(delete_swap))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users))
}

#[instrument(skip(state, payload))]
pub async fn set_user_active(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetActiveRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if id == admin_id && !payload.is_active {
        warn!(admin_id = %admin_id, "admin attempted self-ban");
        return Err(ApiError::Forbidden(
            "Admins cannot deactivate their own account".into(),
        ));
    }

    if !User::set_active(&state.db, id, payload.is_active).await? {
        return Err(ApiError::NotFound("User not found".into()));
    }

    info!(user_id = %id, is_active = payload.is_active, "user active flag updated");
    Ok(Json(MessageResponse {
        message: format!(
            "User status updated to {}",
            if payload.is_active { "active" } else { "banned" }
        ),
    }))
}

#[instrument(skip(state))]
pub async fn list_swaps(
    State(state): State<AppState>,
    AdminUser(_admin_id): AdminUser,
) -> Result<Json<Vec<SwapWithUsers>>, ApiError> {
    let swaps = SwapRequest::list_all(&state.db).await?;
    Ok(Json(swaps))
}

#[instrument(skip(state, payload))]
pub async fn set_swap_status(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let swap =
        service::transition_swap(&state.db, id, admin_id, Role::Admin, payload.status).await?;
    Ok(Json(MessageResponse {
        message: format!("Swap request status updated to {}", swap.status),
    }))
}

#[instrument(skip(state))]
pub async fn delete_swap(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    service::delete_swap(&state.db, id, admin_id, Role::Admin).await?;
    Ok(Json(MessageResponse {
        message: "Swap request deleted successfully".into(),
    }))
}
