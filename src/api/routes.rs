use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::NaiveTime;
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::types::double_option;
use super::validation::{validate_id, validate_position, validate_transport_name};
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::{NewRoute, RouteChanges, RouteDto};

#[derive(Debug, Deserialize)]
pub struct CreateRouteRequest {
    pub start_place: i32,
    pub end_place: i32,
    pub time: NaiveTime,
    pub position: i32,
    pub transport_id: Option<i32>,
    #[serde(default)]
    pub transport_name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRouteRequest {
    pub start_place: Option<i32>,
    pub end_place: Option<i32>,
    pub time: Option<NaiveTime>,
    pub position: Option<i32>,
    #[serde(default, deserialize_with = "double_option")]
    pub transport_id: Option<Option<i32>>,
    pub transport_name: Option<String>,
}

/// POST /way/{id}/route
pub async fn create_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(way_id): Path<i32>,
    payload: Result<Json<CreateRouteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<RouteDto>>), ApiError> {
    let way_id = validate_id("way", way_id)?;
    let Json(payload) = payload?;
    let position = validate_position(payload.position)?;
    let transport_name = validate_transport_name(&payload.transport_name)?.to_string();

    let route = state
        .route_service()
        .create(
            user.id,
            way_id,
            NewRoute {
                start_place_id: payload.start_place,
                end_place_id: payload.end_place,
                time: payload.time,
                position,
                transport_id: payload.transport_id,
                transport_name,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(route.to_dto())),
    ))
}

/// GET /way/{id}/route/{position}
pub async fn get_route_by_position(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path((way_id, position)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<RouteDto>>, ApiError> {
    let way_id = validate_id("way", way_id)?;
    let position = validate_position(position)?;

    let route = state
        .route_service()
        .get_by_position(user.id, way_id, position)
        .await?;
    Ok(Json(ApiResponse::success(route.to_dto())))
}

/// GET /route/{id}
pub async fn get_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<RouteDto>>, ApiError> {
    let id = validate_id("route", id)?;
    let route = state.route_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(route.to_dto())))
}

/// PUT /route/{id}
pub async fn update_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateRouteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<RouteDto>>, ApiError> {
    let id = validate_id("route", id)?;
    let Json(payload) = payload?;
    if let Some(position) = payload.position {
        validate_position(position)?;
    }
    if let Some(name) = &payload.transport_name {
        validate_transport_name(name)?;
    }

    let changes = RouteChanges {
        start_place_id: payload.start_place,
        end_place_id: payload.end_place,
        time: payload.time,
        position: payload.position,
        transport_id: payload.transport_id,
        transport_name: payload.transport_name,
    };

    let route = state.route_service().update(user.id, id, changes).await?;
    Ok(Json(ApiResponse::success(route.to_dto())))
}

/// DELETE /route/{id}
pub async fn delete_route(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("route", id)?;
    state.route_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Route deleted",
    ))))
}
