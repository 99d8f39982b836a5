//! Snapshot loading: fetch everything for a universe, then derive views.
//!
//! Each load issues fresh requests and computes synchronously once they
//! return. Overlapping loads are not coordinated; whichever finishes last
//! is what the caller keeps.

use async_trait::async_trait;
use tweaknow_core::notifications::{self, Notification};
use tweaknow_core::{profile, thread, ThreadView};
use tweaknow_types::{Character, FeedEntry, ProfileTab, Tweak};

use crate::api::{ApiClient, ApiError, ApiResult};

/// Where universe snapshots come from
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn feed(&self, universe_id: i64) -> ApiResult<Vec<FeedEntry>>;

    async fn characters(&self, universe_id: i64) -> ApiResult<Vec<Character>>;
}

#[async_trait]
impl SnapshotSource for ApiClient {
    async fn feed(&self, universe_id: i64) -> ApiResult<Vec<FeedEntry>> {
        self.get_feed(universe_id).await
    }

    async fn characters(&self, universe_id: i64) -> ApiResult<Vec<Character>> {
        self.get_characters(universe_id).await
    }
}

/// Everything fetched for one universe at one point in time
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub universe_id: i64,
    pub feed: Vec<FeedEntry>,
    pub characters: Vec<Character>,
}

impl Snapshot {
    pub async fn fetch<S: SnapshotSource + ?Sized>(source: &S, universe_id: i64) -> ApiResult<Self> {
        let (feed, characters) =
            tokio::try_join!(source.feed(universe_id), source.characters(universe_id))?;
        log::debug!(
            "universe {}: {} feed entries, {} characters",
            universe_id,
            feed.len(),
            characters.len()
        );
        Ok(Self { universe_id, feed, characters })
    }

    /// Distinct tweaks in feed order. A retweet item repeats its original,
    /// so only the first entry per id is kept.
    pub fn tweaks(&self) -> Vec<Tweak> {
        let mut seen = std::collections::HashSet::new();
        self.feed
            .iter()
            .map(FeedEntry::tweak)
            .filter(|tweak| seen.insert(tweak.id))
            .cloned()
            .collect()
    }

    pub fn character(&self, character_id: i64) -> Option<&Character> {
        self.characters.iter().find(|character| character.id == character_id)
    }

    pub fn thread(&self, tweak_id: i64) -> ApiResult<ThreadView> {
        ThreadView::from_snapshot(tweak_id, &self.tweaks())
            .ok_or_else(|| ApiError::NotFound(format!("Tweak {} not found", tweak_id)))
    }

    /// Top of the reply chain containing `tweak_id`, as far as it is loaded
    pub fn thread_root(&self, tweak_id: i64) -> i64 {
        let tweaks = self.tweaks();
        thread::ancestors(tweak_id, &tweaks)
            .last()
            .map(|root| root.id)
            .unwrap_or(tweak_id)
    }

    pub fn notifications(&self, character_id: i64) -> Vec<Notification> {
        notifications::build_notifications(&self.feed, &self.characters, character_id)
    }

    pub fn profile(&self, character_id: i64, tab: ProfileTab) -> ApiResult<(Character, Vec<Tweak>)> {
        let character = self
            .character(character_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("Character {} not found", character_id)))?;
        let tweaks = self.tweaks();
        let authored = profile::authored_by(&tweaks, character_id);
        let listed = profile::filter_tab(&authored, tab).into_iter().cloned().collect();
        Ok((character, listed))
    }
}
