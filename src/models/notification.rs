use crate::database;
use crate::enums::{Channel, EntityType, NotificationType};
use crate::errors::Error;
use crate::utils::models::ModelExt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;
use wither::Model as WitherModel;
use wither::bson::{self, DateTime, Document, doc, oid::ObjectId};
use wither::mongodb::Database;
use wither::mongodb::options::FindOptions;

/// Listing page size when the caller does not ask for one.
const DEFAULT_LIST_LIMIT: i64 = 50;
/// Hard cap on a pending-delivery poll; callers needing more re-poll.
const PENDING_BATCH_LIMIT: i64 = 100;

#[async_trait]
impl ModelExt for Notification {
    async fn get_connection() -> &'static Database {
        database::connection().await
    }
}

/// A persisted notification. `isRead`/`readAt` and `isSent`/`sentAt` are
/// independent pairs; each timestamp is stamped exactly once, on the
/// false-to-true transition, and never moves again.
#[derive(Debug, Clone, Serialize, Deserialize, WitherModel, Validate)]
#[model(collection_name = "notifications")]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[validate(length(min = 1))]
    pub user_id: String,
    pub r#type: NotificationType,
    #[validate(length(min = 1))]
    pub title: String,
    #[validate(length(min = 1))]
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub channels: Vec<Channel>,
    pub is_read: bool,
    pub is_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub read_at: Option<DateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime>,
    pub created_timestamp: DateTime,
}

/// Creation payload. Enumerated fields arrive as raw strings so every
/// invalid entry can be named in the rejection instead of surfacing as an
/// opaque deserialization failure.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationInput {
    pub user_id: String,
    pub r#type: String,
    pub title: String,
    pub message: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub channels: Option<Vec<String>>,
}

/// Content-field patch for the generic update operation. Identity
/// (`_id`, `userId`) and the lifecycle pairs are deliberately absent;
/// the dedicated mark operations own those.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPatch {
    pub title: Option<String>,
    pub message: Option<String>,
    pub r#type: Option<String>,
    pub channels: Option<Vec<String>>,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
}

/// Optional equality filters plus paging for per-user listings.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilters {
    pub is_read: Option<bool>,
    pub r#type: Option<NotificationType>,
    pub is_sent: Option<bool>,
    pub limit: Option<i64>,
    pub skip: Option<u64>,
}

impl NotificationFilters {
    pub fn limit(&self) -> i64 {
        let limit = self.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit > 0 { limit } else { DEFAULT_LIST_LIMIT }
    }

    pub fn skip(&self) -> u64 {
        self.skip.unwrap_or(0)
    }
}

/// One row of the per-type aggregation: `_id` carries the group key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationTypeStats {
    #[serde(rename = "_id")]
    pub r#type: NotificationType,
    pub total: i64,
    pub unread: i64,
}

impl Notification {
    fn from_input(input: NotificationInput) -> Result<Self, Error> {
        if input.user_id.trim().is_empty() {
            return Err(Error::bad_request("User ID is required"));
        }
        if input.title.trim().is_empty() || input.message.trim().is_empty() {
            return Err(Error::bad_request("Title and message are required"));
        }

        let r#type = NotificationType::parse(&input.r#type)?;
        let entity_type = input
            .entity_type
            .as_deref()
            .map(EntityType::parse)
            .transpose()?;
        if entity_type.is_some() != input.entity_id.is_some() {
            return Err(Error::bad_request(
                "entityType and entityId must be provided together",
            ));
        }

        let channels = match &input.channels {
            Some(raw) => Channel::parse_list(raw)?,
            None => Vec::new(),
        };

        Ok(Self {
            id: None,
            user_id: input.user_id,
            r#type,
            title: input.title,
            message: input.message,
            entity_type,
            entity_id: input.entity_id,
            channels,
            is_read: false,
            is_sent: false,
            read_at: None,
            sent_at: None,
            created_timestamp: DateTime::now(),
        })
    }

    pub async fn create_one(input: NotificationInput) -> Result<Self, Error> {
        let notification = Self::from_input(input)?;
        <Self as ModelExt>::create(notification).await
    }

    /// Items are inserted independently, in order. A failing item aborts
    /// the batch but does not roll back siblings inserted before it.
    pub async fn create_bulk(inputs: Vec<NotificationInput>) -> Result<Vec<Self>, Error> {
        let mut created = Vec::with_capacity(inputs.len());
        for input in inputs {
            let notification = Self::from_input(input)?;
            created.push(<Self as ModelExt>::create(notification).await?);
        }

        Ok(created)
    }

    pub async fn get_by_id(id: &ObjectId) -> Result<Self, Error> {
        <Self as ModelExt>::find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(&format!("Notification {id} not found")))
    }

    /// Stamps `readAt` only on the false-to-true transition; repeat calls
    /// return the record with the original timestamp intact.
    pub async fn mark_read(id: &ObjectId) -> Result<Self, Error> {
        let query = doc! { "_id": id, "isRead": false };
        let updated =
            <Self as ModelExt>::find_one_and_update(query, read_transition_update(DateTime::now()), false)
                .await?;

        match updated {
            Some(notification) => Ok(notification),
            None => Self::get_by_id(id).await,
        }
    }

    /// One batch timestamp for every unread notification of the user.
    /// Zero matches is a normal success, not an error.
    pub async fn mark_all_read(user_id: &str) -> Result<u64, Error> {
        let query = doc! { "userId": user_id, "isRead": false };
        let result =
            <Self as ModelExt>::update_many(query, read_transition_update(DateTime::now()), None)
                .await?;

        Ok(result.modified_count)
    }

    pub async fn mark_sent(id: &ObjectId) -> Result<Self, Error> {
        let query = doc! { "_id": id, "isSent": false };
        let updated =
            <Self as ModelExt>::find_one_and_update(query, sent_transition_update(DateTime::now()), false)
                .await?;

        match updated {
            Some(notification) => Ok(notification),
            None => Self::get_by_id(id).await,
        }
    }

    pub async fn update_fields(id: &ObjectId, patch: NotificationPatch) -> Result<Self, Error> {
        let update = patch.into_update()?;
        <Self as ModelExt>::find_one_and_update(doc! { "_id": id }, update, false)
            .await?
            .ok_or_else(|| Error::not_found(&format!("Notification {id} not found")))
    }

    pub async fn delete_by_id(id: &ObjectId) -> Result<Self, Error> {
        <Self as ModelExt>::find_one_and_delete(doc! { "_id": id })
            .await?
            .ok_or_else(|| Error::not_found(&format!("Notification {id} not found")))
    }

    /// Removes the user's read notifications older than the cutoff.
    /// Unread notifications are never auto-deleted, regardless of age.
    pub async fn cleanup_for_user(user_id: &str, older_than_days: i64) -> Result<u64, Error> {
        let cutoff = DateTime::from_chrono(chrono::Utc::now() - chrono::Duration::days(older_than_days));
        let result = <Self as ModelExt>::delete_many(cleanup_filter(user_id, cutoff)).await?;

        Ok(result.deleted_count)
    }

    pub async fn list_for_user(
        user_id: &str,
        filters: &NotificationFilters,
    ) -> Result<Vec<Self>, Error> {
        let options = FindOptions::builder()
            .sort(doc! { "createdTimestamp": -1 })
            .limit(filters.limit())
            .skip(filters.skip())
            .build();

        <Self as ModelExt>::find(list_filter(user_id, filters), options).await
    }

    pub async fn unread_count(user_id: &str) -> Result<u64, Error> {
        <Self as ModelExt>::count(doc! { "userId": user_id, "isRead": false }).await
    }

    /// Oldest-first so delivery ordering stays fair across polls.
    pub async fn pending(channel: Option<Channel>) -> Result<Vec<Self>, Error> {
        let options = FindOptions::builder()
            .sort(doc! { "createdTimestamp": 1 })
            .limit(PENDING_BATCH_LIMIT)
            .build();

        <Self as ModelExt>::find(pending_filter(channel), options).await
    }

    pub async fn by_entity(entity_type: EntityType, entity_id: &str) -> Result<Vec<Self>, Error> {
        let query = doc! {
            "entityType": entity_type.to_string(),
            "entityId": entity_id,
        };
        let options = FindOptions::builder()
            .sort(doc! { "createdTimestamp": -1 })
            .build();

        <Self as ModelExt>::find(query, options).await
    }

    pub async fn stats_by_type(user_id: &str) -> Result<Vec<NotificationTypeStats>, Error> {
        <Self as ModelExt>::aggregate(stats_pipeline(user_id)).await
    }
}

impl NotificationPatch {
    fn into_update(self) -> Result<Document, Error> {
        let mut set = Document::new();

        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err(Error::bad_request("Title must not be empty"));
            }
            set.insert("title", title);
        }
        if let Some(message) = self.message {
            if message.trim().is_empty() {
                return Err(Error::bad_request("Message must not be empty"));
            }
            set.insert("message", message);
        }
        if let Some(raw) = self.r#type {
            set.insert("type", NotificationType::parse(&raw)?.to_string());
        }
        if let Some(raw) = self.channels {
            set.insert("channels", bson::to_bson(&Channel::parse_list(&raw)?)?);
        }
        if let Some(raw) = self.entity_type {
            set.insert("entityType", EntityType::parse(&raw)?.to_string());
        }
        if let Some(entity_id) = self.entity_id {
            set.insert("entityId", entity_id);
        }

        if set.is_empty() {
            return Err(Error::bad_request("No updatable fields provided"));
        }

        Ok(doc! { "$set": set })
    }
}

fn read_transition_update(now: DateTime) -> Document {
    doc! { "$set": { "isRead": true, "readAt": now } }
}

fn sent_transition_update(now: DateTime) -> Document {
    doc! { "$set": { "isSent": true, "sentAt": now } }
}

fn list_filter(user_id: &str, filters: &NotificationFilters) -> Document {
    let mut query = doc! { "userId": user_id };

    if let Some(is_read) = filters.is_read {
        query.insert("isRead", is_read);
    }
    if let Some(r#type) = filters.r#type {
        query.insert("type", r#type.to_string());
    }
    if let Some(is_sent) = filters.is_sent {
        query.insert("isSent", is_sent);
    }

    query
}

fn pending_filter(channel: Option<Channel>) -> Document {
    let mut query = doc! { "isSent": false };

    if let Some(channel) = channel {
        query.insert("channels", channel.to_string());
    }

    query
}

fn cleanup_filter(user_id: &str, cutoff: DateTime) -> Document {
    doc! {
        "userId": user_id,
        "isRead": true,
        "createdTimestamp": { "$lt": cutoff },
    }
}

fn stats_pipeline(user_id: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "userId": user_id } },
        doc! { "$group": {
            "_id": "$type",
            "total": { "$sum": 1 },
            "unread": { "$sum": { "$cond": [{ "$eq": ["$isRead", false] }, 1, 0] } },
        } },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(user_id: &str, r#type: &str, title: &str, message: &str) -> NotificationInput {
        NotificationInput {
            user_id: user_id.to_string(),
            r#type: r#type.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            entity_type: None,
            entity_id: None,
            channels: None,
        }
    }

    #[test]
    fn from_input_builds_an_unread_unsent_record() {
        let notification =
            Notification::from_input(input("user-1", "parcel_update", "Arrived", "Your parcel arrived"))
                .unwrap();

        assert_eq!(notification.r#type, NotificationType::ParcelUpdate);
        assert!(!notification.is_read);
        assert!(!notification.is_sent);
        assert!(notification.read_at.is_none());
        assert!(notification.sent_at.is_none());
        assert!(notification.channels.is_empty());
        assert!(notification.id.is_none());
    }

    #[test]
    fn from_input_rejects_unknown_type_by_name() {
        let err = Notification::from_input(input("user-1", "pigeon_update", "t", "m")).unwrap_err();
        assert!(err.to_string().contains("pigeon_update"));
    }

    #[test]
    fn from_input_rejects_blank_title_and_message() {
        assert!(Notification::from_input(input("user-1", "system_alert", "", "m")).is_err());
        assert!(Notification::from_input(input("user-1", "system_alert", "t", "  ")).is_err());
        assert!(Notification::from_input(input("", "system_alert", "t", "m")).is_err());
    }

    #[test]
    fn from_input_requires_entity_fields_together() {
        let mut half = input("user-1", "parcel_update", "t", "m");
        half.entity_type = Some("Parcel".to_string());
        assert!(Notification::from_input(half).is_err());

        let mut other_half = input("user-1", "parcel_update", "t", "m");
        other_half.entity_id = Some("abc123".to_string());
        assert!(Notification::from_input(other_half).is_err());

        let mut both = input("user-1", "parcel_update", "t", "m");
        both.entity_type = Some("Parcel".to_string());
        both.entity_id = Some("abc123".to_string());
        let notification = Notification::from_input(both).unwrap();
        assert_eq!(notification.entity_type, Some(EntityType::Parcel));
    }

    #[test]
    fn from_input_parses_channels_and_names_invalid_ones() {
        let mut with_channels = input("user-1", "payment_update", "t", "m");
        with_channels.channels = Some(vec!["email".to_string(), "push".to_string()]);
        let notification = Notification::from_input(with_channels).unwrap();
        assert_eq!(notification.channels, vec![Channel::Email, Channel::Push]);

        let mut bad = input("user-1", "payment_update", "t", "m");
        bad.channels = Some(vec!["carrier_pigeon".to_string()]);
        let err = Notification::from_input(bad).unwrap_err();
        assert!(err.to_string().contains("carrier_pigeon"));
    }

    #[test]
    fn read_transition_stamps_both_fields() {
        let now = DateTime::now();
        let update = read_transition_update(now);
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_bool("isRead").unwrap(), true);
        assert_eq!(set.get_datetime("readAt").unwrap(), &now);
        assert!(set.get("isSent").is_none());
    }

    #[test]
    fn sent_transition_stamps_both_fields() {
        let now = DateTime::now();
        let update = sent_transition_update(now);
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_bool("isSent").unwrap(), true);
        assert_eq!(set.get_datetime("sentAt").unwrap(), &now);
        assert!(set.get("isRead").is_none());
    }

    #[test]
    fn list_filter_applies_only_provided_constraints() {
        let empty = NotificationFilters::default();
        assert_eq!(list_filter("user-1", &empty), doc! { "userId": "user-1" });

        let filters = NotificationFilters {
            is_read: Some(false),
            r#type: Some(NotificationType::SystemAlert),
            is_sent: Some(true),
            ..Default::default()
        };
        let query = list_filter("user-1", &filters);
        assert_eq!(query.get_bool("isRead").unwrap(), false);
        assert_eq!(query.get_str("type").unwrap(), "system_alert");
        assert_eq!(query.get_bool("isSent").unwrap(), true);
    }

    #[test]
    fn filters_default_to_limit_50_skip_0() {
        let filters = NotificationFilters::default();
        assert_eq!(filters.limit(), 50);
        assert_eq!(filters.skip(), 0);

        let nonsense = NotificationFilters {
            limit: Some(-3),
            ..Default::default()
        };
        assert_eq!(nonsense.limit(), 50);
    }

    #[test]
    fn pending_filter_optionally_matches_channel_containment() {
        assert_eq!(pending_filter(None), doc! { "isSent": false });

        let query = pending_filter(Some(Channel::Sms));
        assert_eq!(query.get_bool("isSent").unwrap(), false);
        assert_eq!(query.get_str("channels").unwrap(), "sms");
    }

    #[test]
    fn pending_poll_is_capped_at_100() {
        assert_eq!(PENDING_BATCH_LIMIT, 100);
    }

    #[test]
    fn cleanup_filter_targets_read_records_older_than_cutoff() {
        let cutoff = DateTime::now();
        let query = cleanup_filter("user-1", cutoff);

        assert_eq!(query.get_str("userId").unwrap(), "user-1");
        assert_eq!(query.get_bool("isRead").unwrap(), true);
        let age = query.get_document("createdTimestamp").unwrap();
        assert_eq!(age.get_datetime("$lt").unwrap(), &cutoff);
    }

    #[test]
    fn stats_pipeline_groups_by_type_with_unread_breakdown() {
        let pipeline = stats_pipeline("user-1");
        assert_eq!(pipeline.len(), 2);

        let matching = pipeline[0].get_document("$match").unwrap();
        assert_eq!(matching.get_str("userId").unwrap(), "user-1");

        let group = pipeline[1].get_document("$group").unwrap();
        assert_eq!(group.get_str("_id").unwrap(), "$type");
        assert!(group.get_document("total").is_ok());
        assert!(group.get_document("unread").is_ok());
    }

    #[test]
    fn patch_builds_a_set_document_from_present_fields() {
        let patch = NotificationPatch {
            title: Some("New title".to_string()),
            channels: Some(vec!["in_app".to_string()]),
            ..Default::default()
        };
        let update = patch.into_update().unwrap();
        let set = update.get_document("$set").unwrap();

        assert_eq!(set.get_str("title").unwrap(), "New title");
        assert_eq!(
            set.get_array("channels").unwrap(),
            &vec![bson::Bson::String("in_app".to_string())]
        );
        assert!(set.get("message").is_none());
    }

    #[test]
    fn patch_rejects_empty_and_invalid_updates() {
        assert!(NotificationPatch::default().into_update().is_err());

        let blank_title = NotificationPatch {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank_title.into_update().is_err());

        let bad_type = NotificationPatch {
            r#type: Some("pigeon_update".to_string()),
            ..Default::default()
        };
        assert!(bad_type.into_update().is_err());
    }
}
