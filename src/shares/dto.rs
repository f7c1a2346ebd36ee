use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::codes::status::CodeStatus;

/// Response for a freshly minted share.
#[derive(Debug, Serialize)]
pub struct ShareResponse {
    pub id: Uuid,
    pub token: String,
    /// Public resolution path for the token.
    pub path: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Owner-side audit line. Expired shares stay visible here.
#[derive(Debug, Serialize)]
pub struct ShareListItem {
    pub id: Uuid,
    pub token: String,
    pub code_id: Uuid,
    pub store_name: String,
    pub visit_count: i64,
    pub expired: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

/// Read-only public projection of a shared code. Deliberately carries no
/// owner-identifying fields.
#[derive(Debug, Serialize)]
pub struct SharedCodeView {
    pub code: String,
    pub store_name: String,
    pub store_url: Option<String>,
    pub discount_value: Option<String>,
    pub expiry_date: Option<String>,
    pub notes: Option<String>,
    pub status: CodeStatus,
}
