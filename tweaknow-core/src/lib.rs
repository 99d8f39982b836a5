pub mod notifications;
pub mod profile;
pub mod thread;
pub mod view;

#[cfg(test)]
mod fixtures;

pub use notifications::{build_notifications, mentions, Notification};
pub use thread::{
    build_tree, collect_descendants, count_direct_replies, resolve_parent, ThreadPost, TreeNode,
};
pub use view::ThreadView;
