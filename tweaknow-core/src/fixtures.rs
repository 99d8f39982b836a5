use chrono::{DateTime, TimeZone, Utc};
use tweaknow_types::{Character, Tweak};

pub fn at_minute(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap()
}

pub fn tweak(id: i64, character_id: i64, parent: Option<i64>, minute: u32) -> Tweak {
    Tweak {
        id,
        universe_id: 1,
        character_id,
        content: format!("tweak {}", id),
        images: None,
        comment_count: 0,
        retweet_count: 0,
        quote_count: 0,
        like_count: 0,
        view_count: 0,
        source_label: "Twitter for iPhone".to_string(),
        custom_date: None,
        reply_to_tweak_id: parent,
        quoted_tweak_id: None,
        is_retweet: None,
        created_at: at_minute(minute),
        updated_at: None,
    }
}

pub fn character(id: i64, username: &str) -> Character {
    serde_json::from_value(serde_json::json!({
        "id": id, "universe_id": 1, "name": username, "username": username,
        "created_at": "2024-01-01T00:00:00Z"
    }))
    .unwrap()
}
