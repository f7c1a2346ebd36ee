use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::jwt::AuthUser,
    codes::{
        dto::{format_date, CodePayload, CodeResponse, ListParams},
        repo::DiscountCode,
        status::{code_status, days_until},
    },
    error::ApiError,
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/codes", get(list_codes))
        .route("/codes/:id", get(get_code))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/codes", post(create_code))
        .route("/codes/:id", put(update_code))
        .route("/codes/:id", delete(delete_code))
        .route("/codes/:id/used", post(mark_used))
}

fn to_response(code: DiscountCode, lookahead_days: i64) -> CodeResponse {
    let today = OffsetDateTime::now_utc().date();
    let status = code_status(code.expiry_date, code.is_used, today, lookahead_days);
    CodeResponse {
        id: code.id,
        code: code.code,
        store_name: code.store_name,
        store_url: code.store_url,
        discount_value: code.discount_value,
        expiry_date: code.expiry_date.map(format_date),
        notes: code.notes,
        is_used: code.is_used,
        status,
        expires_in_days: code.expiry_date.map(|d| days_until(d, today)),
        created_at: code.created_at,
    }
}

#[instrument(skip(state))]
pub async fn list_codes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CodeResponse>>, ApiError> {
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let lookahead = state.config.policy.expiring_soon_days;

    let codes = DiscountCode::list_by_user(&state.db, user_id, search).await?;
    let items = codes
        .into_iter()
        .map(|c| to_response(c, lookahead))
        .filter(|c| params.status.matches(c.status))
        .collect();
    Ok(Json(items))
}

#[instrument(skip(state))]
pub async fn get_code(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CodeResponse>, ApiError> {
    let code = DiscountCode::find_by_id(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("code not found"))?;
    Ok(Json(to_response(code, state.config.policy.expiring_soon_days)))
}

#[instrument(skip(state, payload))]
pub async fn create_code(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CodePayload>,
) -> Result<(StatusCode, Json<CodeResponse>), ApiError> {
    let fields = payload.validate()?;
    let code = DiscountCode::create(&state.db, user_id, &fields).await?;
    info!(user_id = %user_id, code_id = %code.id, store = %code.store_name, "code created");
    Ok((
        StatusCode::CREATED,
        Json(to_response(code, state.config.policy.expiring_soon_days)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_code(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CodePayload>,
) -> Result<Json<CodeResponse>, ApiError> {
    let fields = payload.validate()?;
    let code = DiscountCode::update(&state.db, user_id, id, &fields)
        .await?
        .ok_or(ApiError::NotFound("code not found"))?;
    info!(user_id = %user_id, code_id = %code.id, "code updated");
    Ok(Json(to_response(code, state.config.policy.expiring_soon_days)))
}

#[instrument(skip(state))]
pub async fn mark_used(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CodeResponse>, ApiError> {
    let code = DiscountCode::mark_used(&state.db, user_id, id)
        .await?
        .ok_or(ApiError::NotFound("code not found"))?;
    info!(user_id = %user_id, code_id = %code.id, "code marked used");
    Ok(Json(to_response(code, state.config.policy.expiring_soon_days)))
}

#[instrument(skip(state))]
pub async fn delete_code(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if !DiscountCode::delete(&state.db, user_id, id).await? {
        return Err(ApiError::NotFound("code not found"));
    }
    info!(user_id = %user_id, code_id = %id, "code deleted");
    Ok(StatusCode::NO_CONTENT)
}
