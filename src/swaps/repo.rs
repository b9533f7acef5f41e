use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgConnection, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::swaps::lifecycle::SwapStatus;

/// Skill label snapshot carried on a request. Copied at creation; later
/// profile edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: SwapStatus,
    pub offered_skill: Json<Skill>,
    pub wanted_skill: Json<Skill>,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Listing row: a request joined with both parties' display snapshots.
/// Emails are only selected on the admin listing and omitted from user
/// responses.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SwapWithUsers {
    pub id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub status: SwapStatus,
    pub offered_skill: Json<Skill>,
    pub wanted_skill: Json<Skill>,
    pub message: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub from_user_name: String,
    pub from_user_profile_photo: Option<String>,
    pub from_user_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_user_email: Option<String>,
    pub to_user_name: String,
    pub to_user_profile_photo: Option<String>,
    pub to_user_rating: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_user_email: Option<String>,
}

const SWAP_COLUMNS: &str = r#"
    id, from_user_id, to_user_id, status, offered_skill, wanted_skill, message, created_at
"#;

impl SwapRequest {
    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<SwapRequest>> {
        sqlx::query_as::<_, SwapRequest>(&format!(
            "SELECT {SWAP_COLUMNS} FROM swap_requests WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Like [`SwapRequest::find_by_id`] but takes a row lock; serializes all
    /// writers touching the same swap inside a transaction.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> sqlx::Result<Option<SwapRequest>> {
        sqlx::query_as::<_, SwapRequest>(&format!(
            "SELECT {SWAP_COLUMNS} FROM swap_requests WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Any pending or accepted request between the two users, in either
    /// direction.
    pub async fn find_active_between(
        conn: &mut PgConnection,
        a: Uuid,
        b: Uuid,
    ) -> sqlx::Result<Option<SwapRequest>> {
        sqlx::query_as::<_, SwapRequest>(&format!(
            r#"
            SELECT {SWAP_COLUMNS}
            FROM swap_requests
            WHERE ((from_user_id = $1 AND to_user_id = $2)
                OR (from_user_id = $2 AND to_user_id = $1))
              AND status IN ('pending', 'accepted')
            "#
        ))
        .bind(a)
        .bind(b)
        .fetch_optional(conn)
        .await
    }

    pub async fn insert(
        conn: &mut PgConnection,
        from_user_id: Uuid,
        to_user_id: Uuid,
        offered_skill: &Skill,
        wanted_skill: &Skill,
        message: Option<&str>,
    ) -> sqlx::Result<SwapRequest> {
        sqlx::query_as::<_, SwapRequest>(&format!(
            r#"
            INSERT INTO swap_requests (from_user_id, to_user_id, offered_skill, wanted_skill, message)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SWAP_COLUMNS}
            "#
        ))
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(Json(offered_skill))
        .bind(Json(wanted_skill))
        .bind(message)
        .fetch_one(conn)
        .await
    }

    /// All requests the user participates in, newest first, enriched with
    /// both parties' name, photo and rating snapshots.
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<SwapWithUsers>> {
        sqlx::query_as::<_, SwapWithUsers>(
            r#"
            SELECT s.id, s.from_user_id, s.to_user_id, s.status,
                   s.offered_skill, s.wanted_skill, s.message, s.created_at,
                   fu.name AS from_user_name,
                   fu.profile_photo AS from_user_profile_photo,
                   fu.rating AS from_user_rating,
                   NULL::varchar AS from_user_email,
                   tu.name AS to_user_name,
                   tu.profile_photo AS to_user_profile_photo,
                   tu.rating AS to_user_rating,
                   NULL::varchar AS to_user_email
            FROM swap_requests s
            JOIN users fu ON fu.id = s.from_user_id
            JOIN users tu ON tu.id = s.to_user_id
            WHERE s.from_user_id = $1 OR s.to_user_id = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }

    /// System-wide listing for the moderation console; includes both
    /// parties' emails.
    pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<SwapWithUsers>> {
        sqlx::query_as::<_, SwapWithUsers>(
            r#"
            SELECT s.id, s.from_user_id, s.to_user_id, s.status,
                   s.offered_skill, s.wanted_skill, s.message, s.created_at,
                   fu.name AS from_user_name,
                   fu.profile_photo AS from_user_profile_photo,
                   fu.rating AS from_user_rating,
                   fu.email AS from_user_email,
                   tu.name AS to_user_name,
                   tu.profile_photo AS to_user_profile_photo,
                   tu.rating AS to_user_rating,
                   tu.email AS to_user_email
            FROM swap_requests s
            JOIN users fu ON fu.id = s.from_user_id
            JOIN users tu ON tu.id = s.to_user_id
            ORDER BY s.created_at DESC
            "#,
        )
        .fetch_all(db)
        .await
    }

    /// Compare-and-set status update. Returns false when the row no longer
    /// carries `expected` (deleted, or a concurrent transition won).
    pub async fn update_status(
        db: &PgPool,
        id: Uuid,
        expected: SwapStatus,
        next: SwapStatus,
    ) -> sqlx::Result<bool> {
        let result = sqlx::query(
            "UPDATE swap_requests SET status = $3 WHERE id = $1 AND status = $2",
        )
        .bind(id)
        .bind(expected)
        .bind(next)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Status write inside a transaction that already holds the row lock.
    pub async fn set_status_locked(
        conn: &mut PgConnection,
        id: Uuid,
        next: SwapStatus,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE swap_requests SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(next)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM swap_requests WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_request_wire_shape() {
        let swap = SwapRequest {
            id: Uuid::new_v4(),
            from_user_id: Uuid::new_v4(),
            to_user_id: Uuid::new_v4(),
            status: SwapStatus::Pending,
            offered_skill: Json(Skill { name: "Go".into() }),
            wanted_skill: Json(Skill {
                name: "Design".into(),
            }),
            message: Some("hi".into()),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_string(&swap).unwrap();
        assert!(json.contains(r#""status":"pending""#));
        assert!(json.contains(r#""offeredSkill":{"name":"Go"}"#));
        assert!(json.contains(r#""fromUserId""#));
    }

    #[test]
    fn user_listing_omits_absent_emails() {
        let row = SwapWithUsers {
            id: Uuid::new_v4(),
            from_user_id: Uuid::new_v4(),
            to_user_id: Uuid::new_v4(),
            status: SwapStatus::Accepted,
            offered_skill: Json(Skill { name: "Go".into() }),
            wanted_skill: Json(Skill {
                name: "Design".into(),
            }),
            message: None,
            created_at: OffsetDateTime::UNIX_EPOCH,
            from_user_name: "Alice".into(),
            from_user_profile_photo: None,
            from_user_rating: 4.5,
            from_user_email: None,
            to_user_name: "Bob".into(),
            to_user_profile_photo: None,
            to_user_rating: 0.0,
            to_user_email: None,
        };

        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains(r#""fromUserName":"Alice""#));
        assert!(!json.contains("fromUserEmail"));
    }
}
