use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{FeedItemKind, OfficialMark};

// Custom serde module for DateTime. The backend emits RFC3339, but naive
// timestamps (no offset) also show up and are read as UTC.
mod datetime_format {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let s = date.to_rfc3339();
        serializer.serialize_str(&s)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse(s: &str) -> Result<DateTime<Utc>, String> {
        if let Ok(date) = s.parse::<DateTime<Utc>>() {
            return Ok(date);
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| naive.and_utc())
            .map_err(|e| format!("invalid timestamp '{}': {}", s, e))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{self, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(date: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match date {
                Some(date) => serializer.serialize_some(&date.to_rfc3339()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = Option::<String>::deserialize(deserializer)?;
            match s {
                Some(s) => super::parse(&s).map(Some).map_err(serde::de::Error::custom),
                None => Ok(None),
            }
        }
    }
}

/// An isolated workspace owning characters, tweaks and trends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "datetime_format::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A fictional account that authors tweaks inside one universe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub universe_id: i64,
    pub name: String,
    pub username: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub pro_category: Option<String>,
    #[serde(default)]
    pub official_mark: OfficialMark,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub display_followers_count: i64,
    #[serde(default)]
    pub display_following_count: i64,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "datetime_format::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A single post. Replies point at their parent through `reply_to_tweak_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tweak {
    pub id: i64,
    pub universe_id: i64,
    pub character_id: i64,
    pub content: String,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub comment_count: i64,
    #[serde(default)]
    pub retweet_count: i64,
    #[serde(default)]
    pub quote_count: i64,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default = "default_source_label")]
    pub source_label: String,
    /// Overrides `created_at` for ordering and display when set
    #[serde(default, with = "datetime_format::option")]
    pub custom_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reply_to_tweak_id: Option<i64>,
    #[serde(default)]
    pub quoted_tweak_id: Option<i64>,
    #[serde(default)]
    pub is_retweet: Option<bool>,
    #[serde(with = "datetime_format")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "datetime_format::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_source_label() -> String {
    "Twitter for iPhone".to_string()
}

impl Tweak {
    /// Timestamp shown to the user: `custom_date` if set, else `created_at`
    pub fn display_date(&self) -> DateTime<Utc> {
        self.custom_date.unwrap_or(self.created_at)
    }

    pub fn is_reply(&self) -> bool {
        self.reply_to_tweak_id.is_some()
    }

    pub fn has_media(&self) -> bool {
        self.images.as_ref().is_some_and(|images| !images.is_empty())
    }
}

/// Timeline item wrapping a tweak with retweet context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(rename = "type")]
    pub kind: FeedItemKind,
    pub tweak: Tweak,
    #[serde(default)]
    pub retweeted_by_character_id: Option<i64>,
    #[serde(with = "datetime_format")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub quoted_tweak: Option<Tweak>,
}

/// The tweaks endpoint returns either bare tweaks or feed items
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeedEntry {
    Item(FeedItem),
    Tweak(Tweak),
}

impl FeedEntry {
    pub fn tweak(&self) -> &Tweak {
        match self {
            FeedEntry::Item(item) => &item.tweak,
            FeedEntry::Tweak(tweak) => tweak,
        }
    }

    /// Retweeting character, only for retweet feed items
    pub fn retweeted_by(&self) -> Option<i64> {
        match self {
            FeedEntry::Item(item) if item.kind == FeedItemKind::Retweet => {
                item.retweeted_by_character_id
            }
            _ => None,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            FeedEntry::Item(item) => item.timestamp,
            FeedEntry::Tweak(tweak) => tweak.display_date(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountUser {
    pub id: i64,
    pub email: String,
    pub username: String,
}

// Request/Response types for API
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTweakRequest {
    pub universe_id: i64,
    pub character_id: i64,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retweet_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub like_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "datetime_format::option", default)]
    pub custom_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_tweak_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quoted_tweak_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RetweetRequest {
    pub character_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FollowStatusResponse {
    pub is_following: bool,
    pub followers_count: i64,
    pub following_count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
