use serde::Serialize;
use sqlx::{FromRow, PgConnection};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub swap_request_id: Uuid,
    pub from_user_id: Uuid,
    pub to_user_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Feedback {
    pub async fn exists_for(
        conn: &mut PgConnection,
        swap_request_id: Uuid,
        from_user_id: Uuid,
    ) -> sqlx::Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM feedback
                WHERE swap_request_id = $1 AND from_user_id = $2
            )
            "#,
        )
        .bind(swap_request_id)
        .bind(from_user_id)
        .fetch_one(conn)
        .await
    }

    pub async fn insert(
        conn: &mut PgConnection,
        swap_request_id: Uuid,
        from_user_id: Uuid,
        to_user_id: Uuid,
        rating: i32,
        comment: Option<&str>,
    ) -> sqlx::Result<Feedback> {
        sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (swap_request_id, from_user_id, to_user_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, swap_request_id, from_user_id, to_user_id, rating, comment, created_at
            "#,
        )
        .bind(swap_request_id)
        .bind(from_user_id)
        .bind(to_user_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(conn)
        .await
    }
}
