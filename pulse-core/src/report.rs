//! Persisted records produced by the collection flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::IndexSlug;
use crate::message::UserId;

/// A registered volunteer, upserted at first contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    pub id: UserId,
    pub full_name: String,
    pub registered_at: DateTime<Utc>,
}

impl Volunteer {
    /// Create a volunteer record stamped now.
    pub fn new(id: UserId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            registered_at: Utc::now(),
        }
    }
}

/// One finalized price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: UserId,
    pub index_slug: IndexSlug,
    pub location_type: String,
    /// Price in the smallest currency unit.
    pub price: u64,
    /// Opaque photo reference; `None` when the volunteer skipped the photo.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_serialization() {
        let submission = Submission {
            id: Uuid::new_v4(),
            user_id: UserId(42),
            index_slug: IndexSlug::StrawberryEgg,
            location_type: "🎪 Базар / Частник".to_string(),
            price: 15000,
            photo_url: None,
            submitted_at: Utc::now(),
        };

        let json = serde_json::to_string(&submission).unwrap();
        assert!(json.contains("\"index_slug\":\"strawberry_egg\""));
        assert!(json.contains("\"price\":15000"));
        assert!(!json.contains("photo_url"));

        let parsed: Submission = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, submission);
    }

    #[test]
    fn photo_reference_survives_round_trip() {
        let submission = Submission {
            id: Uuid::new_v4(),
            user_id: UserId(1),
            index_slug: IndexSlug::Tutor,
            location_type: "🏫 Учебный центр".to_string(),
            price: 250000,
            photo_url: Some("AgACAgIAAxkBAAIB".to_string()),
            submitted_at: Utc::now(),
        };

        let json = serde_json::to_string(&submission).unwrap();
        let parsed: Submission = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.photo_url.as_deref(), Some("AgACAgIAAxkBAAIB"));
    }
}
