use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

/// Lifecycle of a swap request.
///
/// `pending → accepted → completed`, `pending → rejected`; deletion is a
/// separate privilege, not a status. `rejected` and `completed` are terminal
/// and `pending` is never re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwapStatus::Pending => write!(f, "pending"),
            SwapStatus::Accepted => write!(f, "accepted"),
            SwapStatus::Rejected => write!(f, "rejected"),
            SwapStatus::Completed => write!(f, "completed"),
        }
    }
}

impl SwapStatus {
    pub fn can_transition_to(self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (SwapStatus::Pending, SwapStatus::Accepted)
                | (SwapStatus::Pending, SwapStatus::Rejected)
                | (SwapStatus::Accepted, SwapStatus::Completed)
        )
    }
}

/// Capability level of the caller, resolved by the authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

/// Checks that `actor` may move a request with `status` (addressed to
/// `to_user_id`) into `next`.
///
/// Ordinary callers: only the recipient, only while pending, only to
/// accepted or rejected. Admins may force any transition but still follow
/// the legal edge set.
pub fn authorize_transition(
    status: SwapStatus,
    to_user_id: Uuid,
    actor: Uuid,
    role: Role,
    next: SwapStatus,
) -> Result<(), ApiError> {
    match role {
        Role::Admin => {
            if status.can_transition_to(next) {
                Ok(())
            } else {
                Err(ApiError::InvalidTransition(format!(
                    "Cannot move a {status} request to {next}"
                )))
            }
        }
        Role::User => {
            if actor != to_user_id
                || !matches!(next, SwapStatus::Accepted | SwapStatus::Rejected)
            {
                return Err(ApiError::Forbidden(
                    "Not authorized to update this request status".into(),
                ));
            }
            if !status.can_transition_to(next) {
                return Err(ApiError::InvalidTransition(format!(
                    "Cannot move a {status} request to {next}"
                )));
            }
            Ok(())
        }
    }
}

/// Deletion: the sender while the request is still pending, or an admin at
/// any status.
pub fn authorize_delete(
    status: SwapStatus,
    from_user_id: Uuid,
    actor: Uuid,
    role: Role,
) -> Result<(), ApiError> {
    if role == Role::Admin {
        return Ok(());
    }
    if actor == from_user_id && status == SwapStatus::Pending {
        return Ok(());
    }
    Err(ApiError::Forbidden(
        "Not authorized to delete this request".into(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids() -> (Uuid, Uuid, Uuid) {
        (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4())
    }

    #[test]
    fn legal_edges() {
        use SwapStatus::*;
        assert!(Pending.can_transition_to(Accepted));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Accepted.can_transition_to(Completed));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Accepted.can_transition_to(Rejected));
        assert!(!Accepted.can_transition_to(Pending));
        assert!(!Rejected.can_transition_to(Accepted));
        assert!(!Rejected.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(Accepted));
        assert!(!Completed.can_transition_to(Pending));
    }

    #[test]
    fn recipient_can_accept_or_reject_pending() {
        let (_from, to, _) = ids();
        for next in [SwapStatus::Accepted, SwapStatus::Rejected] {
            authorize_transition(SwapStatus::Pending, to, to, Role::User, next)
                .expect("recipient decides a pending request");
        }
    }

    #[test]
    fn sender_cannot_accept_own_request() {
        let (from, to, _) = ids();
        assert_ne!(from, to);
        let err =
            authorize_transition(SwapStatus::Pending, to, from, Role::User, SwapStatus::Accepted)
                .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn stranger_cannot_transition() {
        let (_from, to, other) = ids();
        let err =
            authorize_transition(SwapStatus::Pending, to, other, Role::User, SwapStatus::Rejected)
                .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn recipient_cannot_complete_directly() {
        let (_from, to, _) = ids();
        let err = authorize_transition(
            SwapStatus::Accepted,
            to,
            to,
            Role::User,
            SwapStatus::Completed,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn recipient_cannot_reaccept_terminal_request() {
        let (_from, to, _) = ids();
        for status in [SwapStatus::Rejected, SwapStatus::Completed] {
            let err = authorize_transition(status, to, to, Role::User, SwapStatus::Accepted)
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidTransition(_)));
        }
    }

    #[test]
    fn admin_follows_legal_edges() {
        let (_from, to, admin) = ids();
        authorize_transition(SwapStatus::Accepted, to, admin, Role::Admin, SwapStatus::Completed)
            .expect("admin may force accepted to completed");

        // Even admins cannot skip the accepted state or resurrect pending.
        let err = authorize_transition(
            SwapStatus::Pending,
            to,
            admin,
            Role::Admin,
            SwapStatus::Completed,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition(_)));

        let err = authorize_transition(
            SwapStatus::Rejected,
            to,
            admin,
            Role::Admin,
            SwapStatus::Pending,
        )
        .unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition(_)));
    }

    #[test]
    fn sender_deletes_only_while_pending() {
        let (from, _to, other) = ids();
        authorize_delete(SwapStatus::Pending, from, from, Role::User)
            .expect("sender deletes a pending request");

        for status in [SwapStatus::Accepted, SwapStatus::Rejected, SwapStatus::Completed] {
            let err = authorize_delete(status, from, from, Role::User).unwrap_err();
            assert!(matches!(err, ApiError::Forbidden(_)));
        }

        let err = authorize_delete(SwapStatus::Pending, from, other, Role::User).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }

    #[test]
    fn admin_deletes_at_any_status() {
        let (from, _to, admin) = ids();
        for status in [
            SwapStatus::Pending,
            SwapStatus::Accepted,
            SwapStatus::Rejected,
            SwapStatus::Completed,
        ] {
            authorize_delete(status, from, admin, Role::Admin).expect("admin delete");
        }
    }

    #[test]
    fn wire_format_is_lowercase() {
        assert_eq!(
            serde_json::to_string(&SwapStatus::Pending).unwrap(),
            r#""pending""#
        );
        let parsed: SwapStatus = serde_json::from_str(r#""completed""#).unwrap();
        assert_eq!(parsed, SwapStatus::Completed);
    }
}
