use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::types::double_option;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::{NewPlace, PlaceChanges, PlaceDto};

#[derive(Debug, Deserialize)]
pub struct CreatePlaceRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub name: String,
    pub stop_id: Option<i32>,
}

impl From<CreatePlaceRequest> for NewPlace {
    fn from(req: CreatePlaceRequest) -> Self {
        Self {
            latitude: req.latitude,
            longitude: req.longitude,
            address: req.address,
            name: req.name,
            stop_id: req.stop_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePlaceRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub stop_id: Option<Option<i32>>,
}

impl From<UpdatePlaceRequest> for PlaceChanges {
    fn from(req: UpdatePlaceRequest) -> Self {
        Self {
            latitude: req.latitude,
            longitude: req.longitude,
            address: req.address,
            name: req.name,
            stop_id: req.stop_id,
        }
    }
}

/// GET /place
pub async fn list_places(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<PlaceDto>>>, ApiError> {
    let places = state.place_service().list(user.id).await?;
    let dtos = places.iter().map(|p| p.to_dto()).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /place
pub async fn create_place(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CreatePlaceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<PlaceDto>>), ApiError> {
    let Json(payload) = payload?;

    let place = state
        .place_service()
        .create(user.id, payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(place.to_dto())),
    ))
}

/// GET /place/{id}
pub async fn get_place(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<PlaceDto>>, ApiError> {
    let id = validate_id("place", id)?;
    let place = state.place_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(place.to_dto())))
}

/// PUT /place/{id}
pub async fn update_place(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdatePlaceRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<PlaceDto>>, ApiError> {
    let id = validate_id("place", id)?;
    let Json(payload) = payload?;

    let place = state
        .place_service()
        .update(user.id, id, payload.into())
        .await?;
    Ok(Json(ApiResponse::success(place.to_dto())))
}

/// DELETE /place/{id}
pub async fn delete_place(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("place", id)?;
    state.place_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Place deleted",
    ))))
}
