use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    error::ApiError,
    feedback::{dto::FeedbackRequest, service},
    state::AppState,
    swaps::dto::MessageResponse,
};

pub fn feedback_routes() -> Router<AppState> {
    Router::new().route("/users/:user_id/feedback", post(submit_feedback))
}

#[instrument(skip(state, payload))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    AuthUser(rater_id): AuthUser,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    service::submit_feedback(&state.db, rater_id, user_id, &payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Feedback submitted successfully".into(),
        }),
    ))
}
