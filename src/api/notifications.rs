use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;

use super::auth::CurrentUser;
use super::validation::validate_id;
use super::{ApiError, ApiResponse, AppState, MessageResponse};
use crate::models::{NewNotification, NotificationChanges, NotificationDto};

#[derive(Debug, Deserialize)]
pub struct CreateNotificationRequest {
    pub start_time: NaiveDate,
    pub end_time: NaiveDate,
    pub week_day: i32,
    pub time: NaiveTime,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotificationRequest {
    pub start_time: Option<NaiveDate>,
    pub end_time: Option<NaiveDate>,
    pub week_day: Option<i32>,
    pub time: Option<NaiveTime>,
}

/// GET /way/{id}/notification
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(way_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<NotificationDto>>>, ApiError> {
    let way_id = validate_id("way", way_id)?;
    let notifications = state.notification_service().list(user.id, way_id).await?;
    let dtos = notifications.iter().map(|n| n.to_dto()).collect();
    Ok(Json(ApiResponse::success(dtos)))
}

/// POST /way/{id}/notification
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(way_id): Path<i32>,
    payload: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<NotificationDto>>), ApiError> {
    let way_id = validate_id("way", way_id)?;
    let Json(payload) = payload?;

    let notification = state
        .notification_service()
        .create(
            user.id,
            way_id,
            NewNotification {
                start_time: payload.start_time,
                end_time: payload.end_time,
                week_day: payload.week_day,
                time: payload.time,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(notification.to_dto())),
    ))
}

/// GET /notification/{id}
pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let id = validate_id("notification", id)?;
    let notification = state.notification_service().get(user.id, id).await?;
    Ok(Json(ApiResponse::success(notification.to_dto())))
}

/// PUT /notification/{id}
pub async fn update_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
    payload: Result<Json<UpdateNotificationRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<NotificationDto>>, ApiError> {
    let id = validate_id("notification", id)?;
    let Json(payload) = payload?;

    let changes = NotificationChanges {
        start_time: payload.start_time,
        end_time: payload.end_time,
        week_day: payload.week_day,
        time: payload.time,
    };

    let notification = state
        .notification_service()
        .update(user.id, id, changes)
        .await?;
    Ok(Json(ApiResponse::success(notification.to_dto())))
}

/// DELETE /notification/{id}
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_id("notification", id)?;
    state.notification_service().delete(user.id, id).await?;
    Ok(Json(ApiResponse::success(MessageResponse::new(
        "Notification deleted",
    ))))
}
