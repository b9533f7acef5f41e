use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{is_unique_violation, ApiError},
    swaps::{
        dto::CreateSwapRequest,
        lifecycle::{self, Role, SwapStatus},
        repo::SwapRequest,
    },
    users::repo::User,
};

const ACTIVE_PAIR_CONFLICT: &str =
    "A pending or accepted swap request with this user already exists.";

/// Creates a pending request, enforcing the at-most-one-active-swap-per-pair
/// invariant. The pre-check gives a friendly error; the partial unique index
/// on the canonical pair decides races between concurrent creates.
pub async fn create_swap(
    db: &PgPool,
    from_user_id: Uuid,
    req: &CreateSwapRequest,
) -> Result<SwapRequest, ApiError> {
    if req.offered_skill.name.trim().is_empty() || req.wanted_skill.name.trim().is_empty() {
        return Err(ApiError::InvalidArgument(
            "Recipient user ID, offered skill, and wanted skill are required".into(),
        ));
    }
    if from_user_id == req.to_user_id {
        return Err(ApiError::InvalidArgument(
            "Cannot send a swap request to yourself".into(),
        ));
    }

    if User::find_by_id(db, req.to_user_id).await?.is_none() {
        return Err(ApiError::NotFound("Recipient not found".into()));
    }

    let mut tx = db.begin().await?;

    if SwapRequest::find_active_between(&mut *tx, from_user_id, req.to_user_id)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(ACTIVE_PAIR_CONFLICT.into()));
    }

    let swap = match SwapRequest::insert(
        &mut *tx,
        from_user_id,
        req.to_user_id,
        &req.offered_skill,
        &req.wanted_skill,
        req.message.as_deref(),
    )
    .await
    {
        Ok(s) => s,
        Err(e) if is_unique_violation(&e, "swap_requests_active_pair_idx") => {
            warn!(from = %from_user_id, to = %req.to_user_id, "lost create race on active pair");
            return Err(ApiError::Conflict(ACTIVE_PAIR_CONFLICT.into()));
        }
        Err(e) => return Err(e.into()),
    };

    tx.commit().await?;

    info!(swap_id = %swap.id, from = %from_user_id, to = %req.to_user_id, "swap request created");
    Ok(swap)
}

/// Moves a request to `next` on behalf of `actor`. The write is a
/// compare-and-set against the observed status; a lost race is re-read and
/// reported against the fresh state, never silently absorbed.
pub async fn transition_swap(
    db: &PgPool,
    id: Uuid,
    actor: Uuid,
    role: Role,
    next: SwapStatus,
) -> Result<SwapRequest, ApiError> {
    let swap = SwapRequest::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Swap request not found".into()))?;

    lifecycle::authorize_transition(swap.status, swap.to_user_id, actor, role, next)?;

    if SwapRequest::update_status(db, id, swap.status, next).await? {
        info!(swap_id = %id, from_status = %swap.status, to_status = %next, "swap transitioned");
        return Ok(SwapRequest { status: next, ..swap });
    }

    match SwapRequest::find_by_id(db, id).await? {
        None => Err(ApiError::NotFound("Swap request not found".into())),
        Some(current) => Err(ApiError::InvalidTransition(format!(
            "Cannot move a {} request to {next}",
            current.status
        ))),
    }
}

/// Removes a request: its sender while still pending, or an admin at any
/// status.
pub async fn delete_swap(db: &PgPool, id: Uuid, actor: Uuid, role: Role) -> Result<(), ApiError> {
    let swap = SwapRequest::find_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Swap request not found".into()))?;

    lifecycle::authorize_delete(swap.status, swap.from_user_id, actor, role)?;

    if !SwapRequest::delete(db, id).await? {
        return Err(ApiError::NotFound("Swap request not found".into()));
    }

    info!(swap_id = %id, actor = %actor, "swap request deleted");
    Ok(())
}
