use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::ApiError;

/// User record in the database. Created administratively, never via the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl User {
    pub async fn find_by_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Insert a new user. A duplicate username surfaces as `DuplicateUser`,
    /// backed by the unique constraint rather than a read-then-write check.
    pub async fn create(db: &PgPool, username: &str, password_hash: &str) -> Result<User, ApiError> {
        let res = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(db)
        .await;

        match res {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(ApiError::DuplicateUser)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Administrative password reset, the only mutation a user ever receives.
    pub async fn set_password_hash(
        db: &PgPool,
        username: &str,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2
            WHERE username = $1
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .execute(db)
        .await
        .map_err(ApiError::from)?;

        if result.rows_affected() == 0 {
            return Err(ApiError::NotFound("user not found"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    async fn duplicate_username_conflicts_and_leaves_one_row(pool: PgPool) {
        User::create(&pool, "alice", "hash-1").await.unwrap();

        let err = User::create(&pool, "alice", "hash-2").await.unwrap_err();
        assert!(matches!(err, ApiError::DuplicateUser));

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE username = 'alice'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(count, 1);

        // The original hash survived the failed insert.
        let user = User::find_by_username(&pool, "alice").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "hash-1");
    }

    #[sqlx::test]
    async fn reset_password_for_unknown_user_is_not_found(pool: PgPool) {
        let err = User::set_password_hash(&pool, "nobody", "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
