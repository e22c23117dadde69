use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::CurrentUser;
use super::types::double_option;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::{ProfileChanges, ProfileDto, UserDto};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    pub phone_number: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub telegram_id: Option<Option<i64>>,
}

impl From<UpdateProfileRequest> for ProfileChanges {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            telegram_id: req.telegram_id,
        }
    }
}

/// POST /user/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let Json(payload) = payload?;

    let registration = state
        .auth_service()
        .register(payload.email.trim(), &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(registration.user.to_dto())),
    ))
}

/// GET /user/activate/{token}
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service().activate(&token).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Account activated",
    ))))
}

/// GET /user
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.auth_service().get_user(user.id).await?;
    Ok(Json(ApiResponse::success(user.to_dto())))
}

/// DELETE /user
pub async fn delete_current_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    session: Session,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.auth_service().delete_account(user.id).await?;
    let _ = session.flush().await;

    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Account deleted",
    ))))
}

/// PUT /user/phone
pub async fn update_phone(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<PhoneRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let Json(payload) = payload?;

    let user = state
        .auth_service()
        .update_phone(user.id, payload.phone_number.trim())
        .await?;
    Ok(Json(ApiResponse::success(user.to_dto())))
}

/// GET /user/profile
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let profile = state.profile_service().get(user.id).await?;
    Ok(Json(ApiResponse::success(profile.to_dto())))
}

/// PUT /user/profile
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ProfileDto>>, ApiError> {
    let Json(payload) = payload?;

    let profile = state
        .profile_service()
        .update(user.id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(profile.to_dto())))
}
