use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::VariantNames as _;
use strum_macros::{Display, EnumString, VariantNames};
use utoipa::ToSchema;

use crate::errors::Error;

/// Delivery medium a notification can be routed through.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    EnumString,
    VariantNames,
    Display,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Push,
    InApp,
}

/// Notification category.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    EnumString,
    VariantNames,
    Display,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationType {
    ParcelUpdate,
    ConsolidationUpdate,
    WarehouseUpdate,
    SystemAlert,
    PaymentUpdate,
}

/// Business object a notification may reference.
#[derive(
    Debug,
    Serialize,
    Deserialize,
    Clone,
    Copy,
    EnumString,
    VariantNames,
    Display,
    PartialEq,
    Eq,
    Hash,
    ToSchema,
)]
pub enum EntityType {
    Parcel,
    Consolidation,
    Warehouse,
}

impl Channel {
    pub fn parse(value: &str) -> Result<Self, Error> {
        Channel::from_str(value).map_err(|_| {
            Error::bad_request(&format!(
                "Invalid channel: {value}. Expected one of: {}",
                Channel::VARIANTS.join(", ")
            ))
        })
    }

    /// Parses a raw channel list, collecting every invalid entry so the
    /// caller sees them all in one rejection.
    pub fn parse_list(raw: &[String]) -> Result<Vec<Channel>, Error> {
        let mut channels = Vec::with_capacity(raw.len());
        let mut invalid = Vec::new();

        for value in raw {
            match Channel::from_str(value) {
                Ok(channel) => channels.push(channel),
                Err(_) => invalid.push(value.as_str()),
            }
        }

        if invalid.is_empty() {
            Ok(channels)
        } else {
            Err(Error::bad_request(&format!(
                "Invalid channels: {}",
                invalid.join(", ")
            )))
        }
    }
}

impl NotificationType {
    pub fn parse(value: &str) -> Result<Self, Error> {
        NotificationType::from_str(value).map_err(|_| {
            Error::bad_request(&format!(
                "Invalid notification type: {value}. Expected one of: {}",
                NotificationType::VARIANTS.join(", ")
            ))
        })
    }
}

impl EntityType {
    pub fn parse(value: &str) -> Result<Self, Error> {
        EntityType::from_str(value).map_err(|_| {
            Error::bad_request(&format!(
                "Invalid entity type: {value}. Expected one of: {}",
                EntityType::VARIANTS.join(", ")
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_round_trips_through_snake_case() {
        assert_eq!(Channel::from_str("in_app").unwrap(), Channel::InApp);
        assert_eq!(Channel::InApp.to_string(), "in_app");
        assert_eq!(Channel::Sms.to_string(), "sms");
    }

    #[test]
    fn parse_list_accepts_known_channels() {
        let raw = vec!["email".to_string(), "push".to_string()];
        let channels = Channel::parse_list(&raw).unwrap();
        assert_eq!(channels, vec![Channel::Email, Channel::Push]);
    }

    #[test]
    fn parse_list_names_every_invalid_entry() {
        let raw = vec![
            "email".to_string(),
            "carrier_pigeon".to_string(),
            "smoke_signal".to_string(),
        ];
        let err = Channel::parse_list(&raw).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("carrier_pigeon"));
        assert!(message.contains("smoke_signal"));
        assert!(!message.contains("email,"));
    }

    #[test]
    fn notification_type_parse_rejects_unknown_category() {
        assert_eq!(
            NotificationType::parse("parcel_update").unwrap(),
            NotificationType::ParcelUpdate
        );
        assert!(NotificationType::parse("pigeon_update").is_err());
    }

    #[test]
    fn entity_type_uses_pascal_case_names() {
        assert_eq!(EntityType::parse("Warehouse").unwrap(), EntityType::Warehouse);
        assert!(EntityType::parse("warehouse").is_err());
    }
}
