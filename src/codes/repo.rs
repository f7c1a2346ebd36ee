use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::codes::dto::ValidCode;

/// Discount code row. Status is never stored here; see `status::code_status`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiscountCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    pub store_name: String,
    pub store_url: Option<String>,
    pub discount_value: Option<String>,
    pub expiry_date: Option<Date>,
    pub notes: Option<String>,
    pub is_used: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

const COLUMNS: &str = "id, user_id, code, store_name, store_url, discount_value, \
                       expiry_date, notes, is_used, created_at";

impl DiscountCode {
    /// All codes owned by `user_id`, soonest expiry first, optionally
    /// filtered by a store name/url substring.
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        search: Option<&str>,
    ) -> anyhow::Result<Vec<DiscountCode>> {
        let rows = sqlx::query_as::<_, DiscountCode>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM discount_codes
            WHERE user_id = $1
              AND ($2::text IS NULL
                   OR store_name ILIKE '%' || $2 || '%'
                   OR store_url ILIKE '%' || $2 || '%')
            ORDER BY expiry_date ASC NULLS LAST, created_at DESC
            "#
        ))
        .bind(user_id)
        .bind(search)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Ownership-scoped lookup: someone else's code is simply absent.
    pub async fn find_by_id(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> anyhow::Result<Option<DiscountCode>> {
        let row = sqlx::query_as::<_, DiscountCode>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM discount_codes
            WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        fields: &ValidCode,
    ) -> anyhow::Result<DiscountCode> {
        let row = sqlx::query_as::<_, DiscountCode>(&format!(
            r#"
            INSERT INTO discount_codes
                (user_id, code, store_name, store_url, discount_value,
                 expiry_date, notes, is_used)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&fields.code)
        .bind(&fields.store_name)
        .bind(&fields.store_url)
        .bind(&fields.discount_value)
        .bind(fields.expiry_date)
        .bind(&fields.notes)
        .bind(fields.is_used)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Full-row update; returns `None` when the code does not exist or is not
    /// owned by `user_id`. Last write wins.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
        fields: &ValidCode,
    ) -> anyhow::Result<Option<DiscountCode>> {
        let row = sqlx::query_as::<_, DiscountCode>(&format!(
            r#"
            UPDATE discount_codes
            SET code = $3, store_name = $4, store_url = $5, discount_value = $6,
                expiry_date = $7, notes = $8, is_used = $9
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .bind(&fields.code)
        .bind(&fields.store_name)
        .bind(&fields.store_url)
        .bind(&fields.discount_value)
        .bind(fields.expiry_date)
        .bind(&fields.notes)
        .bind(fields.is_used)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    pub async fn mark_used(
        db: &PgPool,
        user_id: Uuid,
        id: Uuid,
    ) -> anyhow::Result<Option<DiscountCode>> {
        let row = sqlx::query_as::<_, DiscountCode>(&format!(
            r#"
            UPDATE discount_codes
            SET is_used = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Returns `false` when nothing was deleted, which the handler reports as
    /// `NotFound` — a repeated delete must not silently succeed.
    pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM discount_codes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::User;

    fn fields(code: &str, store: &str) -> ValidCode {
        ValidCode {
            code: code.into(),
            store_name: store.into(),
            store_url: None,
            discount_value: None,
            expiry_date: None,
            notes: None,
            is_used: false,
        }
    }

    #[sqlx::test]
    async fn foreign_codes_read_as_missing(pool: PgPool) -> anyhow::Result<()> {
        let alice = User::create(&pool, "alice", "hash-a").await.unwrap();
        let bob = User::create(&pool, "bob", "hash-b").await.unwrap();

        let code = DiscountCode::create(&pool, alice.id, &fields("SAVE20", "Acme")).await?;

        assert!(DiscountCode::find_by_id(&pool, bob.id, code.id)
            .await?
            .is_none());
        assert!(
            DiscountCode::update(&pool, bob.id, code.id, &fields("TAKEN", "Elsewhere"))
                .await?
                .is_none()
        );
        assert!(DiscountCode::mark_used(&pool, bob.id, code.id)
            .await?
            .is_none());
        assert!(!DiscountCode::delete(&pool, bob.id, code.id).await?);

        // None of the attempts touched the owner's row.
        let seen = DiscountCode::find_by_id(&pool, alice.id, code.id)
            .await?
            .expect("owner still sees the code");
        assert_eq!(seen.code, "SAVE20");
        assert!(!seen.is_used);
        Ok(())
    }

    #[sqlx::test]
    async fn listing_is_scoped_to_the_owner(pool: PgPool) -> anyhow::Result<()> {
        let alice = User::create(&pool, "alice", "hash-a").await.unwrap();
        let bob = User::create(&pool, "bob", "hash-b").await.unwrap();

        DiscountCode::create(&pool, alice.id, &fields("OURS", "Acme")).await?;
        DiscountCode::create(&pool, bob.id, &fields("THEIRS", "Globex")).await?;

        let codes = DiscountCode::list_by_user(&pool, alice.id, None).await?;
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].code, "OURS");
        Ok(())
    }

    #[sqlx::test]
    async fn repeated_delete_reports_missing(pool: PgPool) -> anyhow::Result<()> {
        let alice = User::create(&pool, "alice", "hash-a").await.unwrap();
        let code = DiscountCode::create(&pool, alice.id, &fields("ONCE", "Acme")).await?;

        assert!(DiscountCode::delete(&pool, alice.id, code.id).await?);
        assert!(!DiscountCode::delete(&pool, alice.id, code.id).await?);
        Ok(())
    }
}
