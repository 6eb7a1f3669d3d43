use crate::enums::Channel;
use crate::models::notification_preference::{CategoryChannels, DoNotDisturb, NotificationPreference};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceDto {
    pub id: String,
    pub user_id: String,
    pub preferences: CategoryChannels,
    pub do_not_disturb: DoNotDisturb,
    pub created_at: String,
    pub updated_at: String,
}

impl From<NotificationPreference> for PreferenceDto {
    fn from(preference: NotificationPreference) -> Self {
        Self {
            id: preference
                .id
                .map(|id| id.to_hex())
                .unwrap_or_default(),
            user_id: preference.user_id,
            preferences: preference.preferences,
            do_not_disturb: preference.do_not_disturb,
            created_at: preference.created_at.to_chrono().to_rfc3339(),
            updated_at: preference.updated_at.to_chrono().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SetCategoryChannelsRequestDto {
    pub channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EnableDoNotDisturbRequestDto {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChannelsResponseDto {
    pub channels: Vec<Channel>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoNotDisturbStatusResponseDto {
    pub is_in_do_not_disturb_period: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeletedPreferenceResponseDto {
    pub message: String,
    pub preference: PreferenceDto,
}
