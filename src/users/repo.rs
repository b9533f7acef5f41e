use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgConnection, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::dto::UpdateProfileRequest;

/// Availability tag on a profile. PascalCase on the wire, lowercase in the
/// store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
pub enum Availability {
    Any,
    Weekdays,
    Weekends,
    Evenings,
    Mornings,
}

impl Default for Availability {
    fn default() -> Self {
        Availability::Any
    }
}

/// User record in the database. Serialized directly in API responses; the
/// credential hash never leaves the process.
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_photo: Option<String>,
    pub location: Option<String>,
    pub skills_offered: Json<Vec<String>>,
    pub skills_wanted: Json<Vec<String>>,
    pub availability: Availability,
    pub is_public: bool,
    pub is_admin: bool,
    pub is_active: bool,
    pub rating: f64,
    pub reviews: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const USER_COLUMNS: &str = r#"
    id, name, email, password_hash, profile_photo, location,
    skills_offered, skills_wanted, availability,
    is_public, is_admin, is_active, rating, reviews, created_at
"#;

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(db)
            .await
    }

    /// Create a new user with a hashed credential. New accounts start
    /// public, non-admin, active, unrated.
    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> sqlx::Result<User> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await
    }

    /// Browsable profiles: public and not banned.
    pub async fn list_public(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE is_public = TRUE AND is_active = TRUE
            ORDER BY created_at DESC
            "#
        ))
        .fetch_all(db)
        .await
    }

    pub async fn list_all(db: &PgPool) -> sqlx::Result<Vec<User>> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(db)
        .await
    }

    /// Partial profile update; absent fields keep their stored value. The
    /// admin flag, rating and active flag are not reachable from here.
    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        changes: &UpdateProfileRequest,
    ) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                profile_photo = COALESCE($3, profile_photo),
                location = COALESCE($4, location),
                skills_offered = COALESCE($5, skills_offered),
                skills_wanted = COALESCE($6, skills_wanted),
                availability = COALESCE($7, availability),
                is_public = COALESCE($8, is_public)
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.profile_photo.as_deref())
        .bind(changes.location.as_deref())
        .bind(changes.skills_offered.clone().map(Json))
        .bind(changes.skills_wanted.clone().map(Json))
        .bind(changes.availability)
        .bind(changes.is_public)
        .fetch_optional(db)
        .await
    }

    /// Ban or unban. Returns false when no such user exists.
    pub async fn set_active(db: &PgPool, id: Uuid, is_active: bool) -> sqlx::Result<bool> {
        let result = sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(id)
            .bind(is_active)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Read the rating counters under a row lock; part of the feedback
    /// transaction.
    pub async fn lock_rating(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> sqlx::Result<Option<(f64, i32)>> {
        sqlx::query_as::<_, (f64, i32)>(
            "SELECT rating, reviews FROM users WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(conn)
        .await
    }

    /// Write back recomputed rating counters; the row must already be locked
    /// by [`User::lock_rating`] in the same transaction.
    pub async fn apply_rating(
        conn: &mut PgConnection,
        id: Uuid,
        rating: f64,
        reviews: i32,
    ) -> sqlx::Result<()> {
        sqlx::query("UPDATE users SET rating = $2, reviews = $3 WHERE id = $1")
            .bind(id)
            .bind(rating)
            .bind(reviews)
            .execute(conn)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_never_serializes() {
        let user = User {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            profile_photo: None,
            location: Some("Berlin".into()),
            skills_offered: Json(vec!["Go".into()]),
            skills_wanted: Json(vec!["Design".into()]),
            availability: Availability::Weekends,
            is_public: true,
            is_admin: false,
            is_active: true,
            rating: 4.5,
            reviews: 2,
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("passwordHash"));
        assert!(json.contains(r#""skillsOffered":["Go"]"#));
        assert!(json.contains(r#""availability":"Weekends""#));
        assert!(json.contains(r#""isPublic":true"#));
    }

    #[test]
    fn availability_defaults_to_any() {
        assert_eq!(Availability::default(), Availability::Any);
    }
}
