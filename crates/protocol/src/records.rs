//! Pass-through record shapes.
//!
//! The gateway never owns these records; the upstream services do. They exist
//! so the declared return shape of each operation can be validated before the
//! upstream JSON is handed back to the client unmodified. Fields the mobile
//! client relies on are required; everything else is optional, and unknown
//! upstream fields are tolerated.

use serde::{Deserialize, Serialize};

/// One reconstructed activity block from the timeline service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub category: String,
    pub started_at: String,
    pub ended_at: String,
    pub confidence: f64,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo_context: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_event_ids: Option<Vec<String>>,
}

/// A user attribute maintained by the label service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub label_key: String,
    pub label_value: String,
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<String>,
    pub last_updated: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A social-feed post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub post_id: String,
    pub user_id: String,
    pub timeline_id: String,
    pub category: String,
    pub message: String,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A community listing from the community service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Community {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub is_pro_only: bool,
    pub access_level: String,
    pub created_at: String,
}

/// A community membership created by a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub community_id: String,
    pub user_id: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined_at: Option<String>,
}

/// The billing service's subscription record for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    pub user_id: String,
    pub tier: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renewal_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stripe_subscription_id: Option<String>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use {super::*, serde_json::json};

    #[test]
    fn feed_item_parses_without_metadata() {
        let item: FeedItem = serde_json::from_value(json!({
            "post_id": "p1",
            "user_id": "u1",
            "timeline_id": "t1",
            "category": "reflection",
            "message": "hi",
            "created_at": "2024-01-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(item.post_id, "p1");
        assert!(item.metadata.is_none());
    }

    #[test]
    fn feed_item_rejects_missing_message() {
        let result: Result<FeedItem, _> = serde_json::from_value(json!({
            "post_id": "p1",
            "user_id": "u1",
            "timeline_id": "t1",
            "category": "reflection",
            "created_at": "2024-01-01T00:00:00Z",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn timeline_entry_tolerates_unknown_fields() {
        let entry: TimelineEntry = serde_json::from_value(json!({
            "category": "walking",
            "started_at": "2024-01-01T09:00:00Z",
            "ended_at": "2024-01-01T09:30:00Z",
            "confidence": 0.92,
            "source": "device",
            "some_future_field": {"nested": true},
        }))
        .unwrap();
        assert_eq!(entry.category, "walking");
        assert!(entry.event_id.is_none());
    }

    #[test]
    fn label_parses_with_nullable_verified_at() {
        let label: Label = serde_json::from_value(json!({
            "label_key": "sleep_goal",
            "label_value": "8h",
            "is_verified": false,
            "verified_at": null,
            "last_updated": "2024-02-01T00:00:00Z",
        }))
        .unwrap();
        assert!(label.verified_at.is_none());
    }

    #[test]
    fn community_defaults_empty_description() {
        let community: Community = serde_json::from_value(json!({
            "id": "c1",
            "title": "Morning walkers",
            "is_pro_only": false,
            "access_level": "public",
            "created_at": "2024-03-01T00:00:00Z",
        }))
        .unwrap();
        assert_eq!(community.description, "");
    }

    #[test]
    fn entitlement_parses_minimal() {
        let ent: Entitlement = serde_json::from_value(json!({
            "user_id": "u1",
            "tier": "pro",
            "status": "active",
        }))
        .unwrap();
        assert!(ent.renewal_date.is_none());
        assert!(ent.stripe_subscription_id.is_none());
    }
}
