use std::collections::HashSet;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use tweaknow_types::{Character, Tweak};

use crate::thread::{self, FlatRow, TreeNode};

/// A loaded thread: the root tweak, every reply below it (oldest first) and
/// the nested tree built from those replies.
#[derive(Debug, Clone)]
pub struct ThreadView {
    pub root: Tweak,
    pub replies: Vec<Tweak>,
    pub tree: Vec<TreeNode<Tweak>>,
}

impl ThreadView {
    /// Assemble the thread rooted at `root_id` from a universe snapshot.
    /// Returns `None` when the root itself is not in the snapshot.
    pub fn from_snapshot(root_id: i64, tweaks: &[Tweak]) -> Option<Self> {
        let root = tweaks.iter().find(|tweak| tweak.id == root_id)?.clone();

        let mut replies = thread::collect_descendants(root_id, tweaks);
        thread::sort_chronologically(&mut replies);
        let tree = thread::build_tree(Some(root_id), &replies, 0);

        log::debug!(
            "thread {}: {} replies, {} direct",
            root_id,
            replies.len(),
            tree.len()
        );

        Some(Self { root, replies, tree })
    }

    /// Tweak shown in "Replying to" for `tweak`
    pub fn parent_of(&self, tweak: &Tweak) -> Option<&Tweak> {
        let parent_id = tweak.reply_to_tweak_id?;
        thread::resolve_parent(parent_id, &self.root, &self.replies)
    }

    /// Direct replies to `tweak_id` within this thread
    pub fn reply_count(&self, tweak_id: i64) -> usize {
        thread::count_direct_replies(tweak_id, &self.replies)
    }

    /// Username of the character behind the parent of `tweak`
    pub fn replying_to<'a>(&self, tweak: &Tweak, characters: &'a [Character]) -> Option<&'a str> {
        let parent = self.parent_of(tweak)?;
        characters
            .iter()
            .find(|character| character.id == parent.character_id)
            .map(|character| character.username.as_str())
    }

    pub fn flatten(&self, expanded: &HashSet<i64>) -> Vec<FlatRow<'_, Tweak>> {
        thread::flatten(&self.tree, expanded)
    }

    pub fn is_empty(&self) -> bool {
        self.replies.is_empty()
    }
}

/// One reply in the serialized thread, in display order
#[derive(Serialize)]
struct ThreadRow<'a> {
    #[serde(flatten)]
    tweak: &'a Tweak,
    depth: usize,
    parent_id: Option<i64>,
}

/// Serialized as `{"root": .., "rows": [..]}` with every reply expanded, one
/// row per reply carrying its depth and parent id.
impl Serialize for ThreadView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let expanded: HashSet<i64> = self.replies.iter().map(|reply| reply.id).collect();
        let rows: Vec<ThreadRow<'_>> = self
            .flatten(&expanded)
            .into_iter()
            .map(|row| ThreadRow {
                tweak: &row.node.post,
                depth: row.node.depth,
                parent_id: row.node.post.reply_to_tweak_id,
            })
            .collect();

        let mut state = serializer.serialize_struct("ThreadView", 2)?;
        state.serialize_field("root", &self.root)?;
        state.serialize_field("rows", &rows)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{character, tweak};
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_replies_are_ordered_oldest_first() {
        let snapshot = vec![
            tweak(1, 10, None, 0),
            tweak(3, 11, Some(1), 30),
            tweak(2, 12, Some(1), 10),
            tweak(4, 10, Some(2), 20),
            tweak(5, 12, None, 40),
        ];

        let view = ThreadView::from_snapshot(1, &snapshot).unwrap();

        let direct: Vec<i64> = view.tree.iter().map(|n| n.post.id).collect();
        assert_eq!(direct, vec![2, 3]);
        assert_eq!(view.tree[0].children[0].post.id, 4);
        assert_eq!(view.replies.len(), 3);
        assert_eq!(view.reply_count(1), 2);
        assert_eq!(view.reply_count(2), 1);
    }

    #[test]
    fn test_custom_date_drives_order() {
        let mut late = tweak(2, 11, Some(1), 5);
        late.custom_date = Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        let snapshot = vec![tweak(1, 10, None, 0), late, tweak(3, 12, Some(1), 50)];

        let view = ThreadView::from_snapshot(1, &snapshot).unwrap();

        let direct: Vec<i64> = view.tree.iter().map(|n| n.post.id).collect();
        assert_eq!(direct, vec![3, 2]);
    }

    #[test]
    fn test_missing_root() {
        assert!(ThreadView::from_snapshot(7, &[tweak(1, 10, None, 0)]).is_none());
    }

    #[test]
    fn test_replying_to_resolves_usernames() {
        let snapshot = vec![
            tweak(1, 10, None, 0),
            tweak(2, 11, Some(1), 1),
            tweak(3, 10, Some(2), 2),
        ];
        let characters = vec![character(10, "root_author"), character(11, "replier")];
        let view = ThreadView::from_snapshot(1, &snapshot).unwrap();

        assert_eq!(view.replying_to(&snapshot[1], &characters), Some("root_author"));
        assert_eq!(view.replying_to(&snapshot[2], &characters), Some("replier"));
        assert_eq!(view.replying_to(&snapshot[0], &characters), None);
    }

    #[test]
    fn test_parent_deleted_between_loads() {
        // Reply 3's parent (2) is gone from the snapshot
        let snapshot = vec![tweak(1, 10, None, 0), tweak(3, 11, Some(2), 1)];
        let view = ThreadView::from_snapshot(1, &snapshot).unwrap();

        assert!(view.is_empty());
        assert!(view.parent_of(&snapshot[1]).is_none());
    }

    #[test]
    fn test_json_lists_rows_in_display_order() {
        let snapshot = vec![
            tweak(1, 10, None, 0),
            tweak(2, 11, Some(1), 1),
            tweak(3, 10, Some(2), 2),
            tweak(4, 12, Some(1), 3),
        ];
        let view = ThreadView::from_snapshot(1, &snapshot).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["root"]["id"], 1);
        let rows = json["rows"].as_array().unwrap();
        let ids: Vec<i64> = rows.iter().map(|row| row["id"].as_i64().unwrap()).collect();
        assert_eq!(ids, vec![2, 3, 4]);
        assert_eq!(rows[1]["depth"], 1);
        assert_eq!(rows[1]["parent_id"], 2);
        assert!(rows[0].get("children").is_none());
    }

    #[test]
    fn test_deep_thread_serializes_and_drops() {
        let mut snapshot = vec![tweak(0, 10, None, 0)];
        snapshot.extend((1..=50_000).map(|id| tweak(id, 11, Some(id - 1), 1)));

        let view = ThreadView::from_snapshot(0, &snapshot).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        let rows = json["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 50_000);
        assert_eq!(rows[49_999]["depth"], 49_999);
        drop(view);
    }
}
