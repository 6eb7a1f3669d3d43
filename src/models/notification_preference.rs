use crate::database;
use crate::enums::{Channel, NotificationType};
use crate::errors::Error;
use crate::utils::models::ModelExt;
use crate::utils::time_window;
use async_trait::async_trait;
use chrono::Timelike;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;
use wither::Model as WitherModel;
use wither::bson::{self, DateTime, Document, doc, oid::ObjectId};
use wither::mongodb::Database;

#[async_trait]
impl ModelExt for NotificationPreference {
    async fn get_connection() -> &'static Database {
        database::connection().await
    }
}

/// Per-user delivery preferences. At most one record per `userId`,
/// enforced by the unique index; first reads materialize the record
/// lazily from the system defaults.
#[derive(Debug, Clone, Serialize, Deserialize, WitherModel, Validate)]
#[model(collection_name = "notification_preferences")]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreference {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[validate(length(min = 1))]
    pub user_id: String,
    pub preferences: CategoryChannels,
    pub do_not_disturb: DoNotDisturb,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

/// Channel sets per notification category. Field names double as the
/// stored document keys.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CategoryChannels {
    #[serde(default)]
    pub parcel_update: Vec<Channel>,
    #[serde(default)]
    pub consolidation_update: Vec<Channel>,
    #[serde(default)]
    pub warehouse_update: Vec<Channel>,
    #[serde(default)]
    pub system_alert: Vec<Channel>,
    #[serde(default)]
    pub payment_update: Vec<Channel>,
}

impl CategoryChannels {
    /// The shared defaults table. Read-only; duplicated freely across
    /// workers and never mutated at runtime.
    pub fn system_default() -> Self {
        Self {
            parcel_update: vec![Channel::Email, Channel::InApp],
            consolidation_update: vec![Channel::Email, Channel::InApp],
            warehouse_update: vec![Channel::InApp],
            system_alert: vec![Channel::Email, Channel::InApp],
            payment_update: vec![Channel::Email, Channel::InApp],
        }
    }

    pub fn channels_for(&self, category: NotificationType) -> &[Channel] {
        match category {
            NotificationType::ParcelUpdate => &self.parcel_update,
            NotificationType::ConsolidationUpdate => &self.consolidation_update,
            NotificationType::WarehouseUpdate => &self.warehouse_update,
            NotificationType::SystemAlert => &self.system_alert,
            NotificationType::PaymentUpdate => &self.payment_update,
        }
    }
}

/// Quiet-hours window. `from`/`to` are `HH:MM` and survive a disable so
/// a later enable can restore the previous window.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DoNotDisturb {
    #[serde(default)]
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl DoNotDisturb {
    pub fn validate_bounds(&self) -> Result<(), Error> {
        if !self.enabled {
            return Ok(());
        }

        match (&self.from, &self.to) {
            (Some(from), Some(to)) => {
                validate_hhmm(from)?;
                validate_hhmm(to)?;
                Ok(())
            }
            _ => Err(Error::bad_request(
                "From and to times are required (format: HH:MM)",
            )),
        }
    }
}

/// Explicit creation payload; omitted sections fall back to the system
/// defaults.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceInput {
    pub user_id: String,
    pub preferences: Option<CategoryChannels>,
    pub do_not_disturb: Option<DoNotDisturb>,
}

/// Full-replace payload for the PUT surface; absent sections are left
/// untouched on an existing record and defaulted on an upserted one.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencePatch {
    pub preferences: Option<CategoryChannels>,
    pub do_not_disturb: Option<DoNotDisturb>,
}

impl NotificationPreference {
    pub async fn create_for_user(input: PreferenceInput) -> Result<Self, Error> {
        if input.user_id.trim().is_empty() {
            return Err(Error::bad_request("User ID is required"));
        }
        if <Self as ModelExt>::exists(doc! { "userId": &input.user_id }).await? {
            return Err(Error::conflict("Preference already exists for this user"));
        }

        let do_not_disturb = input.do_not_disturb.unwrap_or_default();
        do_not_disturb.validate_bounds()?;

        let now = DateTime::now();
        let preference = Self {
            id: None,
            user_id: input.user_id,
            preferences: input.preferences.unwrap_or_else(CategoryChannels::system_default),
            do_not_disturb,
            created_at: now,
            updated_at: now,
        };

        // The exists check above can lose a race; the unique index is the
        // source of truth for "already exists".
        <Self as ModelExt>::create(preference).await.map_err(|e| {
            if e.is_duplicate_key() {
                Error::conflict("Preference already exists for this user")
            } else {
                e
            }
        })
    }

    pub async fn find_for_user(user_id: &str) -> Result<Option<Self>, Error> {
        <Self as ModelExt>::find_one(doc! { "userId": user_id }, None).await
    }

    /// Atomic insert-if-absent: concurrent first accesses for the same
    /// user all converge on the single index-backed record.
    pub async fn get_or_create(user_id: &str) -> Result<Self, Error> {
        if user_id.trim().is_empty() {
            return Err(Error::bad_request("User ID is required"));
        }

        let update = default_record_update(user_id, DateTime::now())?;
        <Self as ModelExt>::find_one_and_update(doc! { "userId": user_id }, update, true)
            .await?
            .ok_or_else(|| {
                Error::internal_err(&format!("Failed to load preference for user {user_id}"))
            })
    }

    pub async fn list_all() -> Result<Vec<Self>, Error> {
        <Self as ModelExt>::find(doc! {}, None).await
    }

    pub async fn update_for_user(user_id: &str, patch: PreferencePatch) -> Result<Self, Error> {
        if let Some(do_not_disturb) = &patch.do_not_disturb {
            do_not_disturb.validate_bounds()?;
        }

        let update = replace_update(&patch, DateTime::now())?;
        <Self as ModelExt>::find_one_and_update(doc! { "userId": user_id }, update, true)
            .await?
            .ok_or_else(|| {
                Error::internal_err(&format!("Failed to update preference for user {user_id}"))
            })
    }

    /// Replaces one category's channel set; every entry is validated and
    /// invalid ones are reported by name.
    pub async fn set_category(
        user_id: &str,
        category: NotificationType,
        raw_channels: &[String],
    ) -> Result<Self, Error> {
        let channels = Channel::parse_list(raw_channels)?;
        let update = set_category_update(category, &channels, DateTime::now())?;

        <Self as ModelExt>::find_one_and_update(doc! { "userId": user_id }, update, false)
            .await?
            .ok_or_else(|| preference_not_found(user_id))
    }

    pub async fn enable_do_not_disturb(user_id: &str, from: &str, to: &str) -> Result<Self, Error> {
        validate_hhmm(from)?;
        validate_hhmm(to)?;

        let update = enable_dnd_update(from, to, DateTime::now());
        <Self as ModelExt>::find_one_and_update(doc! { "userId": user_id }, update, false)
            .await?
            .ok_or_else(|| preference_not_found(user_id))
    }

    pub async fn disable_do_not_disturb(user_id: &str) -> Result<Self, Error> {
        let update = disable_dnd_update(DateTime::now());
        <Self as ModelExt>::find_one_and_update(doc! { "userId": user_id }, update, false)
            .await?
            .ok_or_else(|| preference_not_found(user_id))
    }

    /// Stored set for the category when a record exists, otherwise the
    /// system default for that category. Read-only; never materializes.
    pub async fn channels_for(
        user_id: &str,
        category: NotificationType,
    ) -> Result<Vec<Channel>, Error> {
        match Self::find_for_user(user_id).await? {
            Some(preference) => Ok(preference.preferences.channels_for(category).to_vec()),
            None => Ok(CategoryChannels::system_default()
                .channels_for(category)
                .to_vec()),
        }
    }

    /// Whether delivery for the user is currently inside the configured
    /// quiet-hours window, evaluated against server-local time.
    pub async fn is_suppressed(user_id: &str) -> Result<bool, Error> {
        let Some(preference) = Self::find_for_user(user_id).await? else {
            return Ok(false);
        };
        let dnd = &preference.do_not_disturb;
        if !dnd.enabled {
            return Ok(false);
        }
        let (Some(from), Some(to)) = (&dnd.from, &dnd.to) else {
            return Ok(false);
        };

        let from = time_window::parse_hhmm(from)
            .ok_or_else(|| Error::internal_err(&format!("Stored DND window is malformed for user {user_id}")))?;
        let to = time_window::parse_hhmm(to)
            .ok_or_else(|| Error::internal_err(&format!("Stored DND window is malformed for user {user_id}")))?;

        let now = chrono::Local::now();
        let now_minutes = (now.hour() * 60 + now.minute()) as u16;

        Ok(time_window::is_within_window(now_minutes, from, to))
    }

    pub async fn reset_to_default(user_id: &str) -> Result<Self, Error> {
        let update = reset_update(DateTime::now())?;
        <Self as ModelExt>::find_one_and_update(doc! { "userId": user_id }, update, false)
            .await?
            .ok_or_else(|| preference_not_found(user_id))
    }

    pub async fn delete_for_user(user_id: &str) -> Result<Self, Error> {
        <Self as ModelExt>::find_one_and_delete(doc! { "userId": user_id })
            .await?
            .ok_or_else(|| preference_not_found(user_id))
    }
}

fn preference_not_found(user_id: &str) -> Error {
    Error::not_found(&format!("Notification preference not found for user {user_id}"))
}

fn validate_hhmm(value: &str) -> Result<(), Error> {
    time_window::parse_hhmm(value)
        .map(|_| ())
        .ok_or_else(|| Error::bad_request("Invalid time format. Use HH:MM (24-hour format)"))
}

fn default_record_update(user_id: &str, now: DateTime) -> Result<Document, Error> {
    Ok(doc! {
        "$setOnInsert": {
            "userId": user_id,
            "preferences": bson::to_bson(&CategoryChannels::system_default())?,
            "doNotDisturb": { "enabled": false },
            "createdAt": now,
            "updatedAt": now,
        }
    })
}

fn replace_update(patch: &PreferencePatch, now: DateTime) -> Result<Document, Error> {
    let mut set = doc! { "updatedAt": now };
    let mut set_on_insert = doc! { "createdAt": now };

    match &patch.preferences {
        Some(preferences) => {
            set.insert("preferences", bson::to_bson(preferences)?);
        }
        None => {
            set_on_insert.insert("preferences", bson::to_bson(&CategoryChannels::system_default())?);
        }
    }
    match &patch.do_not_disturb {
        Some(do_not_disturb) => {
            set.insert("doNotDisturb", bson::to_bson(do_not_disturb)?);
        }
        None => {
            set_on_insert.insert("doNotDisturb", bson::to_bson(&DoNotDisturb::default())?);
        }
    }

    Ok(doc! { "$set": set, "$setOnInsert": set_on_insert })
}

fn set_category_update(
    category: NotificationType,
    channels: &[Channel],
    now: DateTime,
) -> Result<Document, Error> {
    let mut set = Document::new();
    set.insert(format!("preferences.{category}"), bson::to_bson(channels)?);
    set.insert("updatedAt", now);

    Ok(doc! { "$set": set })
}

fn enable_dnd_update(from: &str, to: &str, now: DateTime) -> Document {
    doc! {
        "$set": {
            "doNotDisturb.enabled": true,
            "doNotDisturb.from": from,
            "doNotDisturb.to": to,
            "updatedAt": now,
        }
    }
}

// Only the flag: the bounds survive so re-enabling restores the window.
fn disable_dnd_update(now: DateTime) -> Document {
    doc! {
        "$set": {
            "doNotDisturb.enabled": false,
            "updatedAt": now,
        }
    }
}

fn reset_update(now: DateTime) -> Result<Document, Error> {
    Ok(doc! {
        "$set": {
            "preferences": bson::to_bson(&CategoryChannels::system_default())?,
            "doNotDisturb": bson::to_bson(&DoNotDisturb::default())?,
            "updatedAt": now,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wither::bson::Bson;

    fn names(channels: &[Channel]) -> Vec<String> {
        channels.iter().map(Channel::to_string).collect()
    }

    #[test]
    fn system_defaults_match_the_published_table() {
        let defaults = CategoryChannels::system_default();

        assert_eq!(names(&defaults.parcel_update), ["email", "in_app"]);
        assert_eq!(names(&defaults.consolidation_update), ["email", "in_app"]);
        assert_eq!(names(&defaults.warehouse_update), ["in_app"]);
        assert_eq!(names(&defaults.system_alert), ["email", "in_app"]);
        assert_eq!(names(&defaults.payment_update), ["email", "in_app"]);
    }

    #[test]
    fn channels_for_maps_every_category() {
        let defaults = CategoryChannels::system_default();

        assert_eq!(
            defaults.channels_for(NotificationType::WarehouseUpdate),
            &[Channel::InApp]
        );
        assert_eq!(
            defaults.channels_for(NotificationType::PaymentUpdate),
            &[Channel::Email, Channel::InApp]
        );
    }

    #[test]
    fn dnd_bounds_are_required_together_only_when_enabled() {
        let disabled = DoNotDisturb::default();
        assert!(disabled.validate_bounds().is_ok());

        let enabled_without_bounds = DoNotDisturb {
            enabled: true,
            from: Some("22:00".to_string()),
            to: None,
        };
        assert!(enabled_without_bounds.validate_bounds().is_err());

        let enabled_bad_format = DoNotDisturb {
            enabled: true,
            from: Some("22:00".to_string()),
            to: Some("7:00".to_string()),
        };
        assert!(enabled_bad_format.validate_bounds().is_err());

        let enabled = DoNotDisturb {
            enabled: true,
            from: Some("22:00".to_string()),
            to: Some("07:00".to_string()),
        };
        assert!(enabled.validate_bounds().is_ok());
    }

    #[test]
    fn lazily_materialized_record_carries_the_defaults() {
        let update = default_record_update("user-1", DateTime::now()).unwrap();
        let on_insert = update.get_document("$setOnInsert").unwrap();

        assert_eq!(on_insert.get_str("userId").unwrap(), "user-1");

        let preferences = on_insert.get_document("preferences").unwrap();
        assert_eq!(
            preferences.get_array("warehouse_update").unwrap(),
            &vec![Bson::String("in_app".to_string())]
        );
        assert_eq!(
            preferences.get_array("parcel_update").unwrap(),
            &vec![
                Bson::String("email".to_string()),
                Bson::String("in_app".to_string())
            ]
        );

        let dnd = on_insert.get_document("doNotDisturb").unwrap();
        assert_eq!(dnd.get_bool("enabled").unwrap(), false);

        // nothing outside $setOnInsert: an existing record is left untouched
        assert_eq!(update.keys().count(), 1);
    }

    #[test]
    fn set_category_update_targets_one_dotted_path() {
        let update =
            set_category_update(NotificationType::ParcelUpdate, &[Channel::Sms], DateTime::now())
                .unwrap();
        let set = update.get_document("$set").unwrap();

        assert_eq!(
            set.get_array("preferences.parcel_update").unwrap(),
            &vec![Bson::String("sms".to_string())]
        );
        assert!(set.get("preferences").is_none());
    }

    #[test]
    fn disable_keeps_the_stored_window_bounds() {
        let update = disable_dnd_update(DateTime::now());
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_bool("doNotDisturb.enabled").unwrap(), false);
        assert!(set.get("doNotDisturb.from").is_none());
        assert!(set.get("doNotDisturb.to").is_none());
    }

    #[test]
    fn enable_sets_flag_and_both_bounds() {
        let update = enable_dnd_update("22:00", "07:00", DateTime::now());
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_bool("doNotDisturb.enabled").unwrap(), true);
        assert_eq!(set.get_str("doNotDisturb.from").unwrap(), "22:00");
        assert_eq!(set.get_str("doNotDisturb.to").unwrap(), "07:00");
    }

    #[test]
    fn reset_clears_the_window_and_restores_defaults() {
        let update = reset_update(DateTime::now()).unwrap();
        let set = update.get_document("$set").unwrap();

        let dnd = set.get_document("doNotDisturb").unwrap();
        assert_eq!(dnd.get_bool("enabled").unwrap(), false);
        assert!(dnd.get("from").is_none());

        let preferences = set.get_document("preferences").unwrap();
        assert_eq!(
            preferences.get_array("warehouse_update").unwrap(),
            &vec![Bson::String("in_app".to_string())]
        );
    }

    #[test]
    fn replace_update_defaults_missing_sections_only_on_insert() {
        let patch = PreferencePatch {
            preferences: None,
            do_not_disturb: Some(DoNotDisturb {
                enabled: true,
                from: Some("21:00".to_string()),
                to: Some("06:30".to_string()),
            }),
        };
        let update = replace_update(&patch, DateTime::now()).unwrap();

        let set = update.get_document("$set").unwrap();
        let dnd = set.get_document("doNotDisturb").unwrap();
        assert_eq!(dnd.get_bool("enabled").unwrap(), true);
        assert!(set.get("preferences").is_none());

        let on_insert = update.get_document("$setOnInsert").unwrap();
        assert!(on_insert.get_document("preferences").is_ok());
        assert!(on_insert.get("doNotDisturb").is_none());
    }

    #[test]
    fn preference_document_round_trips_through_bson() {
        let now = DateTime::now();
        let preference = NotificationPreference {
            id: None,
            user_id: "user-1".to_string(),
            preferences: CategoryChannels::system_default(),
            do_not_disturb: DoNotDisturb::default(),
            created_at: now,
            updated_at: now,
        };

        let document = bson::to_document(&preference).unwrap();
        assert!(document.get("_id").is_none());
        assert_eq!(document.get_str("userId").unwrap(), "user-1");

        let decoded: NotificationPreference = bson::from_document(document).unwrap();
        assert_eq!(decoded.preferences.warehouse_update, vec![Channel::InApp]);
        assert!(!decoded.do_not_disturb.enabled);
    }
}
