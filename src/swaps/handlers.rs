use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    state::AppState,
    swaps::{
        dto::{CreateSwapRequest, CreateSwapResponse, MessageResponse, UpdateStatusRequest},
        lifecycle::{Role, SwapStatus},
        repo::{SwapRequest, SwapWithUsers},
        service,
    },
};

pub fn swap_routes() -> Router<AppState> {
    Router::new()
        .route("/swaps", post(create_swap))
        .route("/swaps/me", get(list_my_swaps))
        .route("/swaps/:id/status", put(update_status))
        .route("/swaps/:id", delete(delete_swap))
}

#[instrument(skip(state, payload))]
pub async fn create_swap(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateSwapRequest>,
) -> Result<(StatusCode, Json<CreateSwapResponse>), ApiError> {
    let swap = service::create_swap(&state.db, user_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSwapResponse {
            message: "Swap request sent successfully".into(),
            swap_request: swap,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_my_swaps(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<SwapWithUsers>>, ApiError> {
    let swaps = SwapRequest::list_for_user(&state.db, user_id).await?;
    Ok(Json(swaps))
}

#[instrument(skip(state, payload))]
pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    // Ordinary callers may only answer a request; everything else is the
    // admin surface's business.
    if !matches!(payload.status, SwapStatus::Accepted | SwapStatus::Rejected) {
        return Err(ApiError::InvalidArgument("Invalid status provided".into()));
    }

    let swap =
        service::transition_swap(&state.db, id, user_id, Role::User, payload.status).await?;
    Ok(Json(MessageResponse {
        message: format!("Swap request {} successfully", swap.status),
    }))
}

#[instrument(skip(state))]
pub async fn delete_swap(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    service::delete_swap(&state.db, id, user_id, Role::User).await?;
    Ok(Json(MessageResponse {
        message: "Swap request deleted successfully".into(),
    }))
}
