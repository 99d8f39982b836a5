use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tweaknow_types::{Character, FeedEntry, NotificationKind, Tweak};

/// Activity by another character on one of the current character's tweaks
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    /// Stable key, e.g. `reply-12` or `rt-4-9`
    pub id: String,
    pub kind: NotificationKind,
    pub actor: Character,
    /// The current character's tweak that was replied to, quoted or retweeted
    pub tweak: Tweak,
    /// The actor's own tweak, for replies and quotes
    pub actor_tweak: Option<Tweak>,
    pub timestamp: DateTime<Utc>,
}

/// Derive notifications for `current_character_id` from a feed snapshot.
///
/// Result is newest first, with each notification id appearing once.
pub fn build_notifications(
    feed: &[FeedEntry],
    characters: &[Character],
    current_character_id: i64,
) -> Vec<Notification> {
    let characters_by_id: HashMap<i64, &Character> =
        characters.iter().map(|character| (character.id, character)).collect();

    let mut tweaks_by_id: HashMap<i64, &Tweak> = HashMap::new();
    for entry in feed {
        tweaks_by_id.entry(entry.tweak().id).or_insert(entry.tweak());
    }

    let owned_by_me = |id: Option<i64>| {
        id.and_then(|id| tweaks_by_id.get(&id).copied())
            .filter(|tweak| tweak.character_id == current_character_id)
    };

    let mut notifications = Vec::new();

    for entry in feed {
        let tweak = entry.tweak();
        let Some(actor) = characters_by_id.get(&tweak.character_id) else {
            continue;
        };

        if actor.id != current_character_id {
            if let Some(parent) = owned_by_me(tweak.reply_to_tweak_id) {
                notifications.push(Notification {
                    id: format!("reply-{}", tweak.id),
                    kind: NotificationKind::Reply,
                    actor: (*actor).clone(),
                    tweak: parent.clone(),
                    actor_tweak: Some(tweak.clone()),
                    timestamp: tweak.display_date(),
                });
            }

            if let Some(quoted) = owned_by_me(tweak.quoted_tweak_id) {
                notifications.push(Notification {
                    id: format!("quote-{}", tweak.id),
                    kind: NotificationKind::Quote,
                    actor: (*actor).clone(),
                    tweak: quoted.clone(),
                    actor_tweak: Some(tweak.clone()),
                    timestamp: tweak.display_date(),
                });
            }
        }

        if let Some(retweeter_id) = entry.retweeted_by() {
            if let Some(retweeter) = characters_by_id.get(&retweeter_id) {
                if retweeter.id != current_character_id
                    && tweak.character_id == current_character_id
                {
                    notifications.push(Notification {
                        id: format!("rt-{}-{}", tweak.id, retweeter.id),
                        kind: NotificationKind::Retweet,
                        actor: (*retweeter).clone(),
                        tweak: tweak.clone(),
                        actor_tweak: None,
                        timestamp: entry.timestamp(),
                    });
                }
            }
        }
    }

    // Stable, so equal timestamps keep feed order
    notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    let mut seen = HashSet::new();
    notifications.retain(|notification| seen.insert(notification.id.clone()));

    log::debug!(
        "{} notifications for character {}",
        notifications.len(),
        current_character_id
    );
    notifications
}

/// Replies and quotes only
pub fn mentions(notifications: &[Notification]) -> Vec<&Notification> {
    notifications
        .iter()
        .filter(|notification| notification.kind.is_mention())
        .collect()
}
