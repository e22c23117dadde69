use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::{validate_id, validate_way_name};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::{WayDto, WayWithRoutesDto};

#[derive(Debug, Deserialize)]
pub struct CreateWayRequest {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWayRequest {
    pub name: Option<String>,
}

/// GET /way
pub async fn list_ways(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<WayWithRoutesDto>>>, ApiError> {
    let ways = state.way_service().list(user.id).await?;
    Ok(Json(ApiResponse::success(ways)))
}

/// POST /way
pub async fn create_way(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreateWayRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<WayDto>>), ApiError> {
    let Json(payload) = payload?;
    let name = validate_way_name(payload.name.trim())?;

    let way = state.way_service().create(user.id, name).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(way.to_dto())),
    ))
}

/// GET /way/{id}
pub async fn get_way(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<WayWithRoutesDto>>, ApiError> {
    let id = validate_id("way", id)?;
    let way = state.way_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(way)))
}

/// PUT /way/{id}
pub async fn update_way(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateWayRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<WayWithRoutesDto>>, ApiError> {
    let id = validate_id("way", id)?;
    let Json(payload) = payload?;
    let Some(name) = payload.name else {
        return Err(ApiError::validation("No fields to update"));
    };
    let name = validate_way_name(name.trim())?;

    let way = state.way_service().rename(user.id, id, name).await?;
    Ok(Json(ApiResponse::success(way)))
}

/// DELETE /way/{id}
pub async fn delete_way(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("way", id)?;
    state.way_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Way deleted",
    ))))
}
