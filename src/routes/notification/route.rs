use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use wither::bson::oid::ObjectId;

use crate::app_state::AppState;
use crate::enums::{Channel, EntityType};
use crate::errors::Error;
use crate::models::notification::{
    Notification, NotificationFilters, NotificationInput, NotificationPatch,
};
use crate::routes::notification::dto::{
    BulkCreateNotificationsRequestDto, BulkCreateNotificationsResponseDto, CleanupQuery,
    CleanupResponseDto, DeletedNotificationResponseDto, MarkAllReadResponseDto, NotificationDto,
    PendingQuery, TypeStatsDto, UnreadCountResponseDto,
};

pub fn create_route() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_pending_notifications))
        .routes(routes!(create_notification))
        .routes(routes!(create_bulk_notifications))
        .routes(routes!(
            get_notification_by_id,
            update_notification,
            delete_notification
        ))
        .routes(routes!(get_user_notifications))
        .routes(routes!(get_unread_count))
        .routes(routes!(get_notification_stats))
        .routes(routes!(mark_notification_read))
        .routes(routes!(mark_all_notifications_read))
        .routes(routes!(mark_notification_sent))
        .routes(routes!(get_notifications_by_entity))
        .routes(routes!(cleanup_user_notifications))
}

fn parse_object_id(id: &str) -> Result<ObjectId, Error> {
    ObjectId::parse_str(id).map_err(|_| Error::ParseObjectID(id.to_string()))
}

#[utoipa::path(
    summary = "Create a notification",
    post,
    request_body(
        content = NotificationInput,
        content_type = "application/json",
    ),
    tag = "Notification APIs",
    path = "/",
    responses(
        (status = 201, description = "Notification created", body = NotificationDto),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn create_notification(
    Json(input): Json<NotificationInput>,
) -> Result<(StatusCode, Json<NotificationDto>), Error> {
    let notification = Notification::create_one(input).await?;

    Ok((StatusCode::CREATED, Json(notification.into())))
}

#[utoipa::path(
    summary = "Create notifications in bulk",
    description = "Items are inserted independently; a failing item does not roll back siblings created before it.",
    post,
    request_body(
        content = BulkCreateNotificationsRequestDto,
        content_type = "application/json",
    ),
    tag = "Notification APIs",
    path = "/bulk",
    responses(
        (status = 201, description = "Notifications created", body = BulkCreateNotificationsResponseDto),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn create_bulk_notifications(
    Json(request): Json<BulkCreateNotificationsRequestDto>,
) -> Result<(StatusCode, Json<BulkCreateNotificationsResponseDto>), Error> {
    if request.notifications.is_empty() {
        return Err(Error::bad_request("Notifications array is required"));
    }

    let created = Notification::create_bulk(request.notifications).await?;
    let notifications: Vec<NotificationDto> = created.into_iter().map(Into::into).collect();

    Ok((
        StatusCode::CREATED,
        Json(BulkCreateNotificationsResponseDto {
            count: notifications.len(),
            notifications,
        }),
    ))
}

#[utoipa::path(
    summary = "Get a notification by id",
    get,
    tag = "Notification APIs",
    path = "/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification found", body = NotificationDto),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_notification_by_id(
    Path(id): Path<String>,
) -> Result<Json<NotificationDto>, Error> {
    let id = parse_object_id(&id)?;
    let notification = Notification::get_by_id(&id).await?;

    Ok(Json(notification.into()))
}

#[utoipa::path(
    summary = "List a user's notifications",
    get,
    tag = "Notification APIs",
    path = "/user/{user_id}",
    params(
        ("user_id" = String, Path, description = "Owning user id"),
        NotificationFilters,
    ),
    responses(
        (status = 200, description = "Notifications sorted newest first", body = Vec<NotificationDto>),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_user_notifications(
    Path(user_id): Path<String>,
    Query(filters): Query<NotificationFilters>,
) -> Result<Json<Vec<NotificationDto>>, Error> {
    let notifications = Notification::list_for_user(&user_id, &filters).await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    summary = "Count a user's unread notifications",
    get,
    tag = "Notification APIs",
    path = "/user/{user_id}/unread-count",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponseDto),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_unread_count(
    Path(user_id): Path<String>,
) -> Result<Json<UnreadCountResponseDto>, Error> {
    let count = Notification::unread_count(&user_id).await?;

    Ok(Json(UnreadCountResponseDto { count }))
}

#[utoipa::path(
    summary = "Per-type read/unread stats for a user",
    get,
    tag = "Notification APIs",
    path = "/user/{user_id}/stats",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Totals and unread counts keyed by notification type"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_notification_stats(
    Path(user_id): Path<String>,
) -> Result<Json<HashMap<String, TypeStatsDto>>, Error> {
    let stats = Notification::stats_by_type(&user_id).await?;
    let by_type = stats
        .into_iter()
        .map(|row| (row.r#type.to_string(), row.into()))
        .collect();

    Ok(Json(by_type))
}

#[utoipa::path(
    summary = "Mark a notification as read",
    description = "Idempotent: repeat calls leave the original readAt untouched.",
    patch,
    tag = "Notification APIs",
    path = "/{id}/read",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked as read", body = NotificationDto),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn mark_notification_read(
    Path(id): Path<String>,
) -> Result<Json<NotificationDto>, Error> {
    let id = parse_object_id(&id)?;
    let notification = Notification::mark_read(&id).await?;

    Ok(Json(notification.into()))
}

#[utoipa::path(
    summary = "Mark all of a user's notifications as read",
    patch,
    tag = "Notification APIs",
    path = "/user/{user_id}/read-all",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Unread notifications updated", body = MarkAllReadResponseDto),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn mark_all_notifications_read(
    Path(user_id): Path<String>,
) -> Result<Json<MarkAllReadResponseDto>, Error> {
    let modified_count = Notification::mark_all_read(&user_id).await?;

    Ok(Json(MarkAllReadResponseDto {
        message: "All notifications marked as read".to_string(),
        modified_count,
    }))
}

#[utoipa::path(
    summary = "Mark a notification as sent",
    description = "Idempotent: repeat calls leave the original sentAt untouched.",
    patch,
    tag = "Notification APIs",
    path = "/{id}/sent",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked as sent", body = NotificationDto),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn mark_notification_sent(
    Path(id): Path<String>,
) -> Result<Json<NotificationDto>, Error> {
    let id = parse_object_id(&id)?;
    let notification = Notification::mark_sent(&id).await?;

    Ok(Json(notification.into()))
}

#[utoipa::path(
    summary = "Update a notification's content fields",
    put,
    request_body(
        content = NotificationPatch,
        content_type = "application/json",
    ),
    tag = "Notification APIs",
    path = "/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification updated", body = NotificationDto),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn update_notification(
    Path(id): Path<String>,
    Json(patch): Json<NotificationPatch>,
) -> Result<Json<NotificationDto>, Error> {
    let id = parse_object_id(&id)?;
    let notification = Notification::update_fields(&id, patch).await?;

    Ok(Json(notification.into()))
}

#[utoipa::path(
    summary = "Delete a notification",
    delete,
    tag = "Notification APIs",
    path = "/{id}",
    params(("id" = String, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification deleted", body = DeletedNotificationResponseDto),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn delete_notification(
    Path(id): Path<String>,
) -> Result<Json<DeletedNotificationResponseDto>, Error> {
    let id = parse_object_id(&id)?;
    let notification = Notification::delete_by_id(&id).await?;

    Ok(Json(DeletedNotificationResponseDto {
        message: "Notification deleted successfully".to_string(),
        notification: notification.into(),
    }))
}

#[utoipa::path(
    summary = "Delete a user's old read notifications",
    description = "Only notifications that are both read and older than the retention window are removed.",
    delete,
    tag = "Notification APIs",
    path = "/user/{user_id}/cleanup",
    params(
        ("user_id" = String, Path, description = "Owning user id"),
        CleanupQuery,
    ),
    responses(
        (status = 200, description = "Old notifications deleted", body = CleanupResponseDto),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn cleanup_user_notifications(
    Path(user_id): Path<String>,
    Query(query): Query<CleanupQuery>,
) -> Result<Json<CleanupResponseDto>, Error> {
    let deleted_count = Notification::cleanup_for_user(&user_id, query.older_than_days()).await?;

    Ok(Json(CleanupResponseDto {
        message: "Old notifications deleted successfully".to_string(),
        deleted_count,
    }))
}

#[utoipa::path(
    summary = "List pending (unsent) notifications",
    description = "Oldest first for fair delivery ordering; capped at 100 per poll.",
    get,
    tag = "Notification APIs",
    path = "/pending",
    params(PendingQuery),
    responses(
        (status = 200, description = "Pending notifications", body = Vec<NotificationDto>),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_pending_notifications(
    Query(query): Query<PendingQuery>,
) -> Result<Json<Vec<NotificationDto>>, Error> {
    let channel = query
        .channel
        .as_deref()
        .map(Channel::parse)
        .transpose()?;
    let notifications = Notification::pending(channel).await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    summary = "List notifications for a business entity",
    get,
    tag = "Notification APIs",
    path = "/entity/{entity_type}/{entity_id}",
    params(
        ("entity_type" = String, Path, description = "Parcel, Consolidation or Warehouse"),
        ("entity_id" = String, Path, description = "Entity id"),
    ),
    responses(
        (status = 200, description = "Notifications sorted newest first", body = Vec<NotificationDto>),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_notifications_by_entity(
    Path((entity_type, entity_id)): Path<(String, String)>,
) -> Result<Json<Vec<NotificationDto>>, Error> {
    let entity_type = EntityType::parse(&entity_type)?;
    let notifications = Notification::by_entity(entity_type, &entity_id).await?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}
