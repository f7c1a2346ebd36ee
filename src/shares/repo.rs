use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::codes::repo::DiscountCode;

/// A minted share link. Immutable after creation; there is no revocation,
/// a share only stops resolving once its window has passed.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Share {
    pub id: Uuid,
    pub discount_code_id: Uuid,
    pub created_by: Uuid,
    pub token: String,
    pub visit_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Share {
    /// Validity is recomputed on every call, never cached: a share is live
    /// strictly before `expires_at` and expired from that instant on.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    pub async fn create(
        db: &PgPool,
        code_id: Uuid,
        created_by: Uuid,
        token: &str,
        expires_at: OffsetDateTime,
    ) -> anyhow::Result<Share> {
        let share = sqlx::query_as::<_, Share>(
            r#"
            INSERT INTO shares (discount_code_id, created_by, token, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, discount_code_id, created_by, token, visit_count,
                      created_at, expires_at
            "#,
        )
        .bind(code_id)
        .bind(created_by)
        .bind(token)
        .bind(expires_at)
        .fetch_one(db)
        .await?;
        Ok(share)
    }

    /// Resolve a token to the share and its referenced code in one query.
    pub async fn find_by_token(
        db: &PgPool,
        token: &str,
    ) -> anyhow::Result<Option<(Share, DiscountCode)>> {
        let row = sqlx::query_as::<_, ShareWithCode>(
            r#"
            SELECT s.id, s.discount_code_id, s.created_by, s.token, s.visit_count,
                   s.created_at, s.expires_at,
                   c.id AS code_id, c.user_id, c.code, c.store_name, c.store_url,
                   c.discount_value, c.expiry_date, c.notes, c.is_used,
                   c.created_at AS code_created_at
            FROM shares s
            JOIN discount_codes c ON c.id = s.discount_code_id
            WHERE s.token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(db)
        .await?;
        Ok(row.map(ShareWithCode::split))
    }

    /// Owner-side audit listing, newest first, expired rows included.
    pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<(Share, String)>> {
        let rows = sqlx::query_as::<_, ShareListRow>(
            r#"
            SELECT s.id, s.discount_code_id, s.created_by, s.token, s.visit_count,
                   s.created_at, s.expires_at, c.store_name
            FROM shares s
            JOIN discount_codes c ON c.id = s.discount_code_id
            WHERE s.created_by = $1
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows.into_iter().map(|r| (r.share, r.store_name)).collect())
    }

    pub async fn record_visit(db: &PgPool, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("UPDATE shares SET visit_count = visit_count + 1 WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }
}

#[derive(FromRow)]
struct ShareWithCode {
    id: Uuid,
    discount_code_id: Uuid,
    created_by: Uuid,
    token: String,
    visit_count: i64,
    created_at: OffsetDateTime,
    expires_at: OffsetDateTime,
    code_id: Uuid,
    user_id: Uuid,
    code: String,
    store_name: String,
    store_url: Option<String>,
    discount_value: Option<String>,
    expiry_date: Option<time::Date>,
    notes: Option<String>,
    is_used: bool,
    code_created_at: OffsetDateTime,
}

impl ShareWithCode {
    fn split(self) -> (Share, DiscountCode) {
        (
            Share {
                id: self.id,
                discount_code_id: self.discount_code_id,
                created_by: self.created_by,
                token: self.token,
                visit_count: self.visit_count,
                created_at: self.created_at,
                expires_at: self.expires_at,
            },
            DiscountCode {
                id: self.code_id,
                user_id: self.user_id,
                code: self.code,
                store_name: self.store_name,
                store_url: self.store_url,
                discount_value: self.discount_value,
                expiry_date: self.expiry_date,
                notes: self.notes,
                is_used: self.is_used,
                created_at: self.code_created_at,
            },
        )
    }
}

#[derive(FromRow)]
struct ShareListRow {
    #[sqlx(flatten)]
    share: Share,
    store_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn share_expiring_at(expires_at: OffsetDateTime) -> Share {
        Share {
            id: Uuid::new_v4(),
            discount_code_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            token: "deadbeef".into(),
            visit_count: 0,
            created_at: expires_at - Duration::hours(24),
            expires_at,
        }
    }

    #[test]
    fn live_strictly_before_expiry() {
        let expires_at = OffsetDateTime::now_utc();
        let share = share_expiring_at(expires_at);
        assert!(!share.is_expired_at(expires_at - Duration::hours(1)));
        assert!(!share.is_expired_at(expires_at - Duration::seconds(1)));
        assert!(!share.is_expired_at(share.created_at));
    }

    #[test]
    fn expired_from_the_boundary_on() {
        let expires_at = OffsetDateTime::now_utc();
        let share = share_expiring_at(expires_at);
        assert!(share.is_expired_at(expires_at));
        assert!(share.is_expired_at(expires_at + Duration::hours(1)));
    }

    #[test]
    fn twenty_four_hour_window() {
        // Default policy: 23h after minting resolves, 25h after is expired.
        let created = OffsetDateTime::now_utc();
        let share = share_expiring_at(created + Duration::hours(24));
        assert!(!share.is_expired_at(created + Duration::hours(23)));
        assert!(share.is_expired_at(created + Duration::hours(25)));
    }
}
