//! Plain-text rendering for the command line

use std::collections::HashSet;
use std::fmt::Write;

use chrono::{DateTime, Utc};
use tweaknow_core::{Notification, ThreadView};
use tweaknow_types::{Character, OfficialMark, ProfileTab, Tweak, Universe};

/// Column width for wrapped tweak content
pub const WRAP_WIDTH: usize = 72;

/// Nesting deeper than this is drawn at the same indent
const MAX_INDENT_DEPTH: usize = 5;

/// Compact counter: `1.2M`, `3.4K`, or the plain number
pub fn format_count(n: i64) -> String {
    if n >= 1_000_000 {
        format!("{:.1}M", n as f64 / 1_000_000.0)
    } else if n >= 1_000 {
        format!("{:.1}K", n as f64 / 1_000.0)
    } else {
        n.to_string()
    }
}

/// Short age of `time` relative to `now`, falling back to a date after a week
pub fn relative_time(time: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(time);
    if elapsed.num_minutes() < 1 {
        "now".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}m", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}h", elapsed.num_hours())
    } else if elapsed.num_days() < 7 {
        format!("{}d", elapsed.num_days())
    } else {
        time.format("%b %-d").to_string()
    }
}

fn mark_suffix(mark: OfficialMark) -> &'static str {
    match mark {
        OfficialMark::Blue | OfficialMark::Gold | OfficialMark::Grey => " ✓",
        OfficialMark::None => "",
    }
}

fn author_line(tweak: &Tweak, characters: &[Character], now: DateTime<Utc>) -> String {
    let when = relative_time(tweak.display_date(), now);
    match characters.iter().find(|character| character.id == tweak.character_id) {
        Some(character) => format!(
            "{}{} @{} · {}",
            character.name,
            mark_suffix(character.official_mark),
            character.username,
            when
        ),
        None => format!("character #{} · {}", tweak.character_id, when),
    }
}

fn counters_line(tweak: &Tweak, replies: usize) -> String {
    format!(
        "💬 {}  🔁 {}  ♥ {}  👁 {}",
        format_count(replies as i64),
        format_count(tweak.retweet_count),
        format_count(tweak.like_count),
        format_count(tweak.view_count)
    )
}

fn push_wrapped(out: &mut String, prefix: &str, content: &str) {
    for line in textwrap::wrap(content, WRAP_WIDTH) {
        let _ = writeln!(out, "{}{}", prefix, line);
    }
}

/// Render a thread. With `expand_all` every reply is shown; otherwise only
/// the direct replies are listed, each with its reply count.
pub fn render_thread(
    view: &ThreadView,
    characters: &[Character],
    expand_all: bool,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", author_line(&view.root, characters, now));
    push_wrapped(&mut out, "", &view.root.content);
    let _ = writeln!(out, "{}", counters_line(&view.root, view.tree.len()));

    if view.is_empty() {
        let _ = writeln!(out, "\nNo replies yet.");
        return out;
    }
    let _ = writeln!(out);

    let expanded: HashSet<i64> = if expand_all {
        view.replies.iter().map(|reply| reply.id).collect()
    } else {
        HashSet::new()
    };

    for row in view.flatten(&expanded) {
        let tweak = &row.node.post;
        let indent = "  ".repeat(row.node.depth.min(MAX_INDENT_DEPTH));
        let body_indent = format!("{}   ", indent);

        let _ = writeln!(out, "{}├─ {}", indent, author_line(tweak, characters, now));
        if row.node.depth > 0 {
            if let Some(username) = view.replying_to(tweak, characters) {
                let _ = writeln!(out, "{}Replying to @{}", body_indent, username);
            }
        }
        push_wrapped(&mut out, &body_indent, &tweak.content);

        let replies = view.reply_count(tweak.id);
        let _ = writeln!(out, "{}{}", body_indent, counters_line(tweak, replies));
        if row.has_children && !expand_all {
            let _ = writeln!(out, "{}({} more in thread)", body_indent, row.node.size() - 1);
        }
    }

    out
}

pub fn render_notifications<'a>(
    notifications: impl IntoIterator<Item = &'a Notification>,
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    for notification in notifications {
        let _ = writeln!(
            out,
            "[{}] @{} {} · {}",
            notification.kind.as_str(),
            notification.actor.username,
            notification.kind.action_label(),
            relative_time(notification.timestamp, now)
        );
        let shown = notification.actor_tweak.as_ref().unwrap_or(&notification.tweak);
        push_wrapped(&mut out, "    ", &shown.content);
    }

    if out.is_empty() {
        out.push_str("No notifications.\n");
    }
    out
}

pub fn render_profile(
    character: &Character,
    tab: ProfileTab,
    tweaks: &[Tweak],
    characters: &[Character],
    now: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{}{} @{}",
        character.name,
        mark_suffix(character.official_mark),
        character.username
    );
    if let Some(bio) = character.bio.as_deref().filter(|bio| !bio.is_empty()) {
        push_wrapped(&mut out, "", bio);
    }
    let _ = writeln!(
        out,
        "{} Following  {} Followers",
        format_count(character.display_following_count),
        format_count(character.display_followers_count)
    );
    let _ = writeln!(out, "\n-- {} --", tab.as_str());

    if tweaks.is_empty() {
        let _ = writeln!(out, "Nothing to show.");
        return out;
    }

    for tweak in tweaks {
        let _ = writeln!(out, "{}", author_line(tweak, characters, now));
        push_wrapped(&mut out, "  ", &tweak.content);
    }
    out
}

pub fn render_universes(universes: &[Universe]) -> String {
    if universes.is_empty() {
        return "No universes.\n".to_string();
    }

    let mut out = String::new();
    for universe in universes {
        let _ = writeln!(out, "{:>6}  {}", universe.id, universe.name);
        if let Some(description) = universe.description.as_deref().filter(|d| !d.is_empty()) {
            push_wrapped(&mut out, "        ", description);
        }
    }
    out
}

/// One-line follow state as seen by the viewing character
pub fn render_follow_status(is_following: bool, followers: i64) -> String {
    let state = if is_following { "Following" } else { "Not following" };
    format!("{} · {} Followers", state, format_count(followers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn tweak(id: i64, character_id: i64, parent: Option<i64>, content: &str) -> Tweak {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "universe_id": 1,
            "character_id": character_id,
            "content": content,
            "reply_to_tweak_id": parent,
            "like_count": 1500,
            "created_at": (now() - Duration::minutes(100 - id)).to_rfc3339(),
        }))
        .unwrap()
    }

    fn characters() -> Vec<Character> {
        serde_json::from_value(serde_json::json!([
            {"id": 10, "universe_id": 1, "name": "Ada", "username": "ada",
             "official_mark": "Blue", "created_at": "2024-01-01T00:00:00Z"},
            {"id": 11, "universe_id": 1, "name": "Bea", "username": "bea",
             "created_at": "2024-01-01T00:00:00Z"}
        ]))
        .unwrap()
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1.0K");
        assert_eq!(format_count(1_240), "1.2K");
        assert_eq!(format_count(2_500_000), "2.5M");
    }

    #[test]
    fn test_relative_time() {
        let now = now();
        assert_eq!(relative_time(now - Duration::seconds(20), now), "now");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5m");
        assert_eq!(relative_time(now - Duration::hours(3), now), "3h");
        assert_eq!(relative_time(now - Duration::days(2), now), "2d");
        assert_eq!(relative_time(now - Duration::days(30), now), "Apr 10");
    }

    #[test]
    fn test_render_thread_expanded_and_collapsed() {
        let tweaks = vec![
            tweak(1, 10, None, "root post"),
            tweak(2, 11, Some(1), "first reply"),
            tweak(3, 10, Some(2), "nested answer"),
        ];
        let view = ThreadView::from_snapshot(1, &tweaks).unwrap();
        let characters = characters();

        let expanded = render_thread(&view, &characters, true, now());
        assert!(expanded.starts_with("Ada ✓ @ada"));
        assert!(expanded.contains("├─ Bea @bea"));
        assert!(expanded.contains("  ├─ Ada ✓ @ada"));
        assert!(expanded.contains("Replying to @bea"));
        assert!(expanded.contains("♥ 1.5K"));

        let collapsed = render_thread(&view, &characters, false, now());
        assert!(!collapsed.contains("nested answer"));
        assert!(collapsed.contains("(1 more in thread)"));
    }

    #[test]
    fn test_render_thread_without_replies() {
        let tweaks = vec![tweak(1, 10, None, "alone")];
        let view = ThreadView::from_snapshot(1, &tweaks).unwrap();

        let out = render_thread(&view, &[], true, now());
        assert!(out.starts_with("character #10"));
        assert!(out.contains("No replies yet."));
    }

    #[test]
    fn test_render_profile_empty_tab() {
        let characters = characters();
        let out = render_profile(&characters[1], ProfileTab::Likes, &[], &characters, now());
        assert!(out.contains("-- likes --"));
        assert!(out.contains("Nothing to show."));
    }

    #[test]
    fn test_render_universes_and_follow_status() {
        let universes: Vec<Universe> = serde_json::from_value(serde_json::json!([
            {"id": 3, "user_id": 1, "name": "Stormhaven",
             "description": "Coastal city drama", "created_at": "2024-01-01T00:00:00"}
        ]))
        .unwrap();

        let out = render_universes(&universes);
        assert!(out.starts_with("     3  Stormhaven"));
        assert!(out.contains("        Coastal city drama"));
        assert_eq!(render_universes(&[]), "No universes.\n");

        assert_eq!(render_follow_status(true, 1_500), "Following · 1.5K Followers");
        assert_eq!(render_follow_status(false, 0), "Not following · 0 Followers");
    }
}
