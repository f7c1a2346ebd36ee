use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    codes::{
        dto::format_date,
        repo::DiscountCode,
        status::{code_status, is_shareable},
    },
    error::ApiError,
    shares::{
        dto::{ShareListItem, ShareResponse, SharedCodeView},
        repo::Share,
        token::generate_token,
    },
    state::AppState,
};

pub fn owner_routes() -> Router<AppState> {
    Router::new()
        .route("/codes/:id/share", post(mint_share))
        .route("/shares", get(list_shares))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/shares/:token", get(resolve_share))
}

/// Mint a share for an owned code. Ownership is checked through the ledger,
/// so a foreign code id reads as missing; used and already-expired codes
/// cannot be shared at all.
#[instrument(skip(state))]
pub async fn mint_share(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(code_id): Path<Uuid>,
) -> Result<(StatusCode, Json<ShareResponse>), ApiError> {
    let code = DiscountCode::find_by_id(&state.db, user_id, code_id)
        .await?
        .ok_or(ApiError::NotFound("code not found"))?;

    let now = OffsetDateTime::now_utc();
    let status = code_status(
        code.expiry_date,
        code.is_used,
        now.date(),
        state.config.policy.expiring_soon_days,
    );
    if !is_shareable(status) {
        warn!(user_id = %user_id, code_id = %code.id, ?status, "unshareable code");
        return Err(ApiError::validation("used or expired codes cannot be shared"));
    }

    let token = generate_token();
    let expires_at = now + Duration::hours(state.config.policy.share_ttl_hours);
    let share = Share::create(&state.db, code.id, user_id, &token, expires_at).await?;

    info!(user_id = %user_id, code_id = %code.id, share_id = %share.id, "share minted");
    Ok((
        StatusCode::CREATED,
        Json(ShareResponse {
            id: share.id,
            path: format!("/api/v1/shares/{}", share.token),
            token: share.token,
            created_at: share.created_at,
            expires_at: share.expires_at,
        }),
    ))
}

#[instrument(skip(state))]
pub async fn list_shares(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<ShareListItem>>, ApiError> {
    let now = OffsetDateTime::now_utc();
    let shares = Share::list_by_user(&state.db, user_id).await?;
    let items = shares
        .into_iter()
        .map(|(share, store_name)| ShareListItem {
            id: share.id,
            code_id: share.discount_code_id,
            store_name,
            visit_count: share.visit_count,
            expired: share.is_expired_at(now),
            token: share.token,
            created_at: share.created_at,
            expires_at: share.expires_at,
        })
        .collect();
    Ok(Json(items))
}

/// Public, unauthenticated resolution. An unknown token is `NotFound`; a
/// known token past its window is `Expired`, never the code itself.
#[instrument(skip(state))]
pub async fn resolve_share(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<SharedCodeView>, ApiError> {
    let (share, code) = Share::find_by_token(&state.db, &token)
        .await?
        .ok_or(ApiError::NotFound("share not found"))?;

    let now = OffsetDateTime::now_utc();
    if share.is_expired_at(now) {
        warn!(share_id = %share.id, "expired share resolution attempt");
        return Err(ApiError::Expired);
    }

    Share::record_visit(&state.db, share.id).await?;

    let status = code_status(
        code.expiry_date,
        code.is_used,
        now.date(),
        state.config.policy.expiring_soon_days,
    );
    Ok(Json(SharedCodeView {
        code: code.code,
        store_name: code.store_name,
        store_url: code.store_url,
        discount_value: code.discount_value,
        expiry_date: code.expiry_date.map(format_date),
        notes: code.notes,
        status,
    }))
}
