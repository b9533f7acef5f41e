use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{is_unique_violation, ApiError},
    feedback::{dto::FeedbackRequest, repo::Feedback},
    swaps::{lifecycle::SwapStatus, repo::SwapRequest},
    users::repo::User,
};

/// Incremental mean update: the ratee's rating after one more review.
pub fn compute_rating(rating: f64, reviews: i32, new_rating: i32) -> f64 {
    (rating * reviews as f64 + new_rating as f64) / (reviews as f64 + 1.0)
}

/// Submits feedback on an accepted swap and completes it.
///
/// One transaction with the swap row locked up front, so concurrent
/// submissions on the same swap serialize: insert the feedback row, fold the
/// new rating into the ratee's counters under a second row lock, then mark
/// the swap completed. Either everything lands or nothing does.
pub async fn submit_feedback(
    db: &PgPool,
    rater_id: Uuid,
    ratee_id: Uuid,
    req: &FeedbackRequest,
) -> Result<Feedback, ApiError> {
    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::InvalidArgument(
            "Rating must be between 1 and 5".into(),
        ));
    }
    if rater_id == ratee_id {
        return Err(ApiError::InvalidArgument(
            "Cannot give feedback to yourself".into(),
        ));
    }

    let mut tx = db.begin().await?;

    let swap = SwapRequest::lock_by_id(&mut *tx, req.swap_request_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Swap request not found".into()))?;

    if swap.from_user_id != rater_id && swap.to_user_id != rater_id {
        return Err(ApiError::Forbidden(
            "Not authorized to leave feedback on this swap".into(),
        ));
    }
    let counterpart = if swap.from_user_id == rater_id {
        swap.to_user_id
    } else {
        swap.from_user_id
    };
    if counterpart != ratee_id {
        return Err(ApiError::Forbidden(
            "Feedback must go to the other party of the swap".into(),
        ));
    }

    if Feedback::exists_for(&mut *tx, req.swap_request_id, rater_id).await? {
        return Err(ApiError::Conflict(
            "Feedback already submitted for this swap.".into(),
        ));
    }

    if swap.status != SwapStatus::Accepted {
        return Err(ApiError::InvalidState(format!(
            "Cannot leave feedback on a {} swap",
            swap.status
        )));
    }

    let feedback = match Feedback::insert(
        &mut *tx,
        req.swap_request_id,
        rater_id,
        ratee_id,
        req.rating,
        req.comment.as_deref(),
    )
    .await
    {
        Ok(f) => f,
        Err(e) if is_unique_violation(&e, "feedback_swap_request_id_key") => {
            warn!(swap_id = %req.swap_request_id, "lost feedback insert race");
            return Err(ApiError::Conflict(
                "Feedback already submitted for this swap.".into(),
            ));
        }
        Err(e) => return Err(e.into()),
    };

    let (rating, reviews) = User::lock_rating(&mut *tx, ratee_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
    let updated = compute_rating(rating, reviews, req.rating);
    User::apply_rating(&mut *tx, ratee_id, updated, reviews + 1).await?;

    SwapRequest::set_status_locked(&mut *tx, swap.id, SwapStatus::Completed).await?;

    tx.commit().await?;

    info!(
        swap_id = %swap.id,
        rater = %rater_id,
        ratee = %ratee_id,
        rating = req.rating,
        "feedback submitted, swap completed"
    );
    Ok(feedback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_review_sets_the_mean() {
        let updated = compute_rating(0.0, 0, 5);
        assert!((updated - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rating_folds_into_running_mean() {
        // 4.0 over 2 reviews plus a 5 lands at 13/3.
        let updated = compute_rating(4.0, 2, 5);
        assert!((updated - 13.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn mean_stays_within_scale_bounds() {
        let mut rating = 0.0;
        for (i, new) in [1, 5, 3, 4, 2, 5].into_iter().enumerate() {
            rating = compute_rating(rating, i as i32, new);
            assert!((1.0..=5.0).contains(&rating));
        }
    }
}
