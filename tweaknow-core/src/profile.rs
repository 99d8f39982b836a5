use tweaknow_types::{ProfileTab, Tweak};

/// Tweaks authored by `character_id`, in snapshot order
pub fn authored_by(tweaks: &[Tweak], character_id: i64) -> Vec<&Tweak> {
    tweaks
        .iter()
        .filter(|tweak| tweak.character_id == character_id)
        .collect()
}

/// Tweaks listed under a profile tab. Likes are not tracked, so that tab is
/// always empty.
pub fn filter_tab<'a>(tweaks: &[&'a Tweak], tab: ProfileTab) -> Vec<&'a Tweak> {
    match tab {
        ProfileTab::Tweets => tweaks.iter().copied().filter(|tweak| !tweak.is_reply()).collect(),
        ProfileTab::Replies => tweaks.to_vec(),
        ProfileTab::Media => tweaks.iter().copied().filter(|tweak| tweak.has_media()).collect(),
        ProfileTab::Likes => Vec::new(),
    }
}
