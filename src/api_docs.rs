use utoipa::OpenApi;

use crate::enums::{Channel, EntityType, NotificationType};
use crate::models::notification::{NotificationInput, NotificationPatch};
use crate::models::notification_preference::{
    CategoryChannels, DoNotDisturb, PreferenceInput, PreferencePatch,
};
use crate::routes::notification::dto::{
    BulkCreateNotificationsRequestDto, BulkCreateNotificationsResponseDto, CleanupResponseDto,
    DeletedNotificationResponseDto, MarkAllReadResponseDto, NotificationDto, TypeStatsDto,
    UnreadCountResponseDto,
};
use crate::routes::preference::dto::{
    ChannelsResponseDto, DeletedPreferenceResponseDto, DoNotDisturbStatusResponseDto,
    EnableDoNotDisturbRequestDto, PreferenceDto, SetCategoryChannelsRequestDto,
};

#[derive(OpenApi)]
#[openapi(
    servers(
        (url = "/"),
    ),
    components(
        schemas(
            // Shared enums
            Channel,
            NotificationType,
            EntityType,

            // Notification DTOs
            NotificationInput,
            NotificationPatch,
            NotificationDto,
            BulkCreateNotificationsRequestDto,
            BulkCreateNotificationsResponseDto,
            UnreadCountResponseDto,
            MarkAllReadResponseDto,
            CleanupResponseDto,
            DeletedNotificationResponseDto,
            TypeStatsDto,

            // Preference DTOs
            CategoryChannels,
            DoNotDisturb,
            PreferenceInput,
            PreferencePatch,
            PreferenceDto,
            SetCategoryChannelsRequestDto,
            EnableDoNotDisturbRequestDto,
            ChannelsResponseDto,
            DoNotDisturbStatusResponseDto,
            DeletedPreferenceResponseDto,
        )
    ),
    tags(
        (name = "Notification APIs", description = "Notification lifecycle and listing endpoints"),
        (name = "Preference APIs", description = "Delivery preference and Do-Not-Disturb endpoints"),
        (name = "Health", description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;
