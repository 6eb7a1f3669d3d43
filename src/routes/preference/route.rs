use axum::Json;
use axum::extract::Path;
use axum::http::StatusCode;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::app_state::AppState;
use crate::enums::NotificationType;
use crate::errors::Error;
use crate::models::notification_preference::{
    NotificationPreference, PreferenceInput, PreferencePatch,
};
use crate::routes::preference::dto::{
    ChannelsResponseDto, DeletedPreferenceResponseDto, DoNotDisturbStatusResponseDto,
    EnableDoNotDisturbRequestDto, PreferenceDto, SetCategoryChannelsRequestDto,
};

pub fn create_route() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(get_all_preferences, create_preference))
        .routes(routes!(
            get_preference_by_user_id,
            update_preference,
            delete_preference
        ))
        .routes(routes!(set_category_channels))
        .routes(routes!(get_channels_for_type))
        .routes(routes!(enable_do_not_disturb))
        .routes(routes!(disable_do_not_disturb))
        .routes(routes!(get_do_not_disturb_status))
        .routes(routes!(reset_preference_to_default))
}

#[utoipa::path(
    summary = "List every preference record",
    get,
    tag = "Preference APIs",
    path = "/",
    responses(
        (status = 200, description = "All stored preferences", body = Vec<PreferenceDto>),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_all_preferences() -> Result<Json<Vec<PreferenceDto>>, Error> {
    let preferences = NotificationPreference::list_all().await?;

    Ok(Json(preferences.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    summary = "Create a preference record",
    post,
    request_body(
        content = PreferenceInput,
        content_type = "application/json",
    ),
    tag = "Preference APIs",
    path = "/",
    responses(
        (status = 201, description = "Preference created", body = PreferenceDto),
        (status = 400, description = "Bad Request"),
        (status = 409, description = "Preference already exists"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn create_preference(
    Json(input): Json<PreferenceInput>,
) -> Result<(StatusCode, Json<PreferenceDto>), Error> {
    let preference = NotificationPreference::create_for_user(input).await?;

    Ok((StatusCode::CREATED, Json(preference.into())))
}

#[utoipa::path(
    summary = "Get a user's preference record",
    description = "Creates and returns the default record on first access.",
    get,
    tag = "Preference APIs",
    path = "/user/{user_id}",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Preference record", body = PreferenceDto),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_preference_by_user_id(
    Path(user_id): Path<String>,
) -> Result<Json<PreferenceDto>, Error> {
    let preference = NotificationPreference::get_or_create(&user_id).await?;

    Ok(Json(preference.into()))
}

#[utoipa::path(
    summary = "Replace a user's preference record",
    put,
    request_body(
        content = PreferencePatch,
        content_type = "application/json",
    ),
    tag = "Preference APIs",
    path = "/user/{user_id}",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Preference updated", body = PreferenceDto),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn update_preference(
    Path(user_id): Path<String>,
    Json(patch): Json<PreferencePatch>,
) -> Result<Json<PreferenceDto>, Error> {
    let preference = NotificationPreference::update_for_user(&user_id, patch).await?;

    Ok(Json(preference.into()))
}

#[utoipa::path(
    summary = "Replace the channel set for one notification type",
    patch,
    request_body(
        content = SetCategoryChannelsRequestDto,
        content_type = "application/json",
    ),
    tag = "Preference APIs",
    path = "/user/{user_id}/type/{notification_type}",
    params(
        ("user_id" = String, Path, description = "Owning user id"),
        ("notification_type" = String, Path, description = "Notification category"),
    ),
    responses(
        (status = 200, description = "Channel set replaced", body = PreferenceDto),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn set_category_channels(
    Path((user_id, notification_type)): Path<(String, String)>,
    Json(request): Json<SetCategoryChannelsRequestDto>,
) -> Result<Json<PreferenceDto>, Error> {
    let category = NotificationType::parse(&notification_type)?;
    let preference =
        NotificationPreference::set_category(&user_id, category, &request.channels).await?;

    Ok(Json(preference.into()))
}

#[utoipa::path(
    summary = "Effective channels for one notification type",
    description = "Falls back to the system default for the category when the user has no stored preference.",
    get,
    tag = "Preference APIs",
    path = "/user/{user_id}/type/{notification_type}/channels",
    params(
        ("user_id" = String, Path, description = "Owning user id"),
        ("notification_type" = String, Path, description = "Notification category"),
    ),
    responses(
        (status = 200, description = "Effective channel set", body = ChannelsResponseDto),
        (status = 400, description = "Bad Request"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_channels_for_type(
    Path((user_id, notification_type)): Path<(String, String)>,
) -> Result<Json<ChannelsResponseDto>, Error> {
    let category = NotificationType::parse(&notification_type)?;
    let channels = NotificationPreference::channels_for(&user_id, category).await?;

    Ok(Json(ChannelsResponseDto { channels }))
}

#[utoipa::path(
    summary = "Enable the Do-Not-Disturb window",
    post,
    request_body(
        content = EnableDoNotDisturbRequestDto,
        content_type = "application/json",
    ),
    tag = "Preference APIs",
    path = "/user/{user_id}/dnd/enable",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Do-Not-Disturb enabled", body = PreferenceDto),
        (status = 400, description = "Bad Request"),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn enable_do_not_disturb(
    Path(user_id): Path<String>,
    Json(request): Json<EnableDoNotDisturbRequestDto>,
) -> Result<Json<PreferenceDto>, Error> {
    let preference =
        NotificationPreference::enable_do_not_disturb(&user_id, &request.from, &request.to).await?;

    Ok(Json(preference.into()))
}

#[utoipa::path(
    summary = "Disable the Do-Not-Disturb window",
    description = "Leaves the stored window bounds untouched so re-enabling restores them.",
    post,
    tag = "Preference APIs",
    path = "/user/{user_id}/dnd/disable",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Do-Not-Disturb disabled", body = PreferenceDto),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn disable_do_not_disturb(
    Path(user_id): Path<String>,
) -> Result<Json<PreferenceDto>, Error> {
    let preference = NotificationPreference::disable_do_not_disturb(&user_id).await?;

    Ok(Json(preference.into()))
}

#[utoipa::path(
    summary = "Whether delivery is currently suppressed for the user",
    get,
    tag = "Preference APIs",
    path = "/user/{user_id}/dnd/status",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Suppression status", body = DoNotDisturbStatusResponseDto),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn get_do_not_disturb_status(
    Path(user_id): Path<String>,
) -> Result<Json<DoNotDisturbStatusResponseDto>, Error> {
    let suppressed = NotificationPreference::is_suppressed(&user_id).await?;

    Ok(Json(DoNotDisturbStatusResponseDto {
        is_in_do_not_disturb_period: suppressed,
    }))
}

#[utoipa::path(
    summary = "Reset a user's preferences to the system defaults",
    post,
    tag = "Preference APIs",
    path = "/user/{user_id}/reset",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Preference reset", body = PreferenceDto),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn reset_preference_to_default(
    Path(user_id): Path<String>,
) -> Result<Json<PreferenceDto>, Error> {
    let preference = NotificationPreference::reset_to_default(&user_id).await?;

    Ok(Json(preference.into()))
}

#[utoipa::path(
    summary = "Delete a user's preference record",
    delete,
    tag = "Preference APIs",
    path = "/user/{user_id}",
    params(("user_id" = String, Path, description = "Owning user id")),
    responses(
        (status = 200, description = "Preference deleted", body = DeletedPreferenceResponseDto),
        (status = 404, description = "Not Found"),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn delete_preference(
    Path(user_id): Path<String>,
) -> Result<Json<DeletedPreferenceResponseDto>, Error> {
    let preference = NotificationPreference::delete_for_user(&user_id).await?;

    Ok(Json(DeletedPreferenceResponseDto {
        message: "Preference deleted successfully".to_string(),
        preference: preference.into(),
    }))
}
