use serde::{Deserialize, Serialize};

/// Verification badge rendered next to a character's name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OfficialMark {
    Blue,
    Gold,
    Grey,
    #[default]
    None,
}

impl OfficialMark {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfficialMark::Blue => "Blue",
            OfficialMark::Gold => "Gold",
            OfficialMark::Grey => "Grey",
            OfficialMark::None => "None",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Blue" => Some(OfficialMark::Blue),
            "Gold" => Some(OfficialMark::Gold),
            "Grey" => Some(OfficialMark::Grey),
            "None" => Some(OfficialMark::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedItemKind {
    #[default]
    Tweet,
    Retweet,
    Quote,
    #[serde(other)]
    Unknown,
}

impl FeedItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedItemKind::Tweet => "tweet",
            FeedItemKind::Retweet => "retweet",
            FeedItemKind::Quote => "quote",
            FeedItemKind::Unknown => "unknown",
        }
    }
}

/// Activity derivable from a feed snapshot. Likes and follows never appear
/// in the feed, so they have no kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Reply,
    Retweet,
    Quote,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Reply => "reply",
            NotificationKind::Retweet => "retweet",
            NotificationKind::Quote => "quote",
        }
    }

    /// Text shown next to the actor in the notifications list
    pub fn action_label(&self) -> &'static str {
        match self {
            NotificationKind::Reply => "Replying to",
            NotificationKind::Retweet => "Retweeted your tweet",
            NotificationKind::Quote => "Quoted your tweet",
        }
    }

    /// Replies and quotes are the only kinds listed under "Mentions"
    pub fn is_mention(&self) -> bool {
        matches!(self, NotificationKind::Reply | NotificationKind::Quote)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProfileTab {
    #[default]
    Tweets,
    Replies,
    Media,
    Likes,
}

impl ProfileTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileTab::Tweets => "tweets",
            ProfileTab::Replies => "replies",
            ProfileTab::Media => "media",
            ProfileTab::Likes => "likes",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "tweets" => Some(ProfileTab::Tweets),
            "replies" => Some(ProfileTab::Replies),
            "media" => Some(ProfileTab::Media),
            "likes" => Some(ProfileTab::Likes),
            _ => None,
        }
    }
}
