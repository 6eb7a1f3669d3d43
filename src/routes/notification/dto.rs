use crate::enums::{Channel, EntityType, NotificationType};
use crate::models::notification::{Notification, NotificationInput, NotificationTypeStats};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationDto {
    pub id: String,
    pub user_id: String,
    pub r#type: NotificationType,
    pub title: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub channels: Vec<Channel>,
    pub is_read: bool,
    pub is_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<String>,
    pub created_timestamp: String,
}

impl From<Notification> for NotificationDto {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification
                .id
                .map(|id| id.to_hex())
                .unwrap_or_default(),
            user_id: notification.user_id,
            r#type: notification.r#type,
            title: notification.title,
            message: notification.message,
            entity_type: notification.entity_type,
            entity_id: notification.entity_id,
            channels: notification.channels,
            is_read: notification.is_read,
            is_sent: notification.is_sent,
            read_at: notification.read_at.map(|at| at.to_chrono().to_rfc3339()),
            sent_at: notification.sent_at.map(|at| at.to_chrono().to_rfc3339()),
            created_timestamp: notification.created_timestamp.to_chrono().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct BulkCreateNotificationsRequestDto {
    pub notifications: Vec<NotificationInput>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkCreateNotificationsResponseDto {
    pub count: usize,
    pub notifications: Vec<NotificationDto>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UnreadCountResponseDto {
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAllReadResponseDto {
    pub message: String,
    pub modified_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponseDto {
    pub message: String,
    pub deleted_count: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeletedNotificationResponseDto {
    pub message: String,
    pub notification: NotificationDto,
}

/// One per-category row of the stats response.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TypeStatsDto {
    pub total: i64,
    pub unread: i64,
}

impl From<NotificationTypeStats> for TypeStatsDto {
    fn from(stats: NotificationTypeStats) -> Self {
        Self {
            total: stats.total,
            unread: stats.unread,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct PendingQuery {
    /// Restrict to notifications whose channel set contains this channel.
    pub channel: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct CleanupQuery {
    pub older_than_days: Option<i64>,
}

impl CleanupQuery {
    pub fn older_than_days(&self) -> i64 {
        let days = self.older_than_days.unwrap_or(30);
        if days > 0 { days } else { 30 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_retention_defaults_to_30_days() {
        assert_eq!(CleanupQuery::default().older_than_days(), 30);
        assert_eq!(
            CleanupQuery {
                older_than_days: Some(7)
            }
            .older_than_days(),
            7
        );
        assert_eq!(
            CleanupQuery {
                older_than_days: Some(0)
            }
            .older_than_days(),
            30
        );
    }
}
