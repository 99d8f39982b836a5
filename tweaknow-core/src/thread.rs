//! Reply-thread construction over a flat snapshot of posts.
//!
//! Every function here is pure and infallible. A snapshot that is partially
//! loaded or malformed (dangling parents, duplicate ids, parent cycles)
//! produces a smaller tree instead of an error:
//!
//! - a post whose parent is missing from the snapshot is never attached;
//! - duplicate ids keep the first entry in input order;
//! - a post already placed in the tree is never placed again, which is what
//!   breaks parent cycles (a self-reply is a cycle of length one).

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use tweaknow_types::Tweak;

/// The two relational fields the thread builder needs from a post.
/// Everything else on the post is carried through untouched.
pub trait ThreadPost {
    type Id: Copy + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;

    /// `None` for a top-level post
    fn parent_id(&self) -> Option<Self::Id>;
}

impl ThreadPost for Tweak {
    type Id = i64;

    fn id(&self) -> i64 {
        self.id
    }

    fn parent_id(&self) -> Option<i64> {
        self.reply_to_tweak_id
    }
}

impl<P: ThreadPost> ThreadPost for &P {
    type Id = P::Id;

    fn id(&self) -> P::Id {
        (**self).id()
    }

    fn parent_id(&self) -> Option<P::Id> {
        (**self).parent_id()
    }
}

/// A post placed in a thread, with its nesting level and direct replies.
///
/// Dropping, cloning and comparing walk the subtree with an explicit stack,
/// so a reply chain of any length is safe to hold. The nested form is not
/// serializable; [`flatten`] the tree for output instead.
#[derive(Debug)]
pub struct TreeNode<P> {
    pub post: P,
    pub depth: usize,
    pub children: Vec<TreeNode<P>>,
}

impl<P> Drop for TreeNode<P> {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}

impl<P: Clone> Clone for TreeNode<P> {
    fn clone(&self) -> Self {
        // Breadth-first, so every node's parent sits at a lower index
        let mut order: Vec<(&TreeNode<P>, usize)> = vec![(self, 0)];
        let mut cursor = 0;
        while cursor < order.len() {
            let node = order[cursor].0;
            order.extend(node.children.iter().map(|child| (child, cursor)));
            cursor += 1;
        }

        let mut built: Vec<TreeNode<P>> = order
            .iter()
            .map(|(node, _)| TreeNode {
                post: node.post.clone(),
                depth: node.depth,
                children: Vec::with_capacity(node.children.len()),
            })
            .collect();

        // Popping from the back hands over each node once its own children
        // are attached; siblings arrive last-first.
        while built.len() > 1 {
            let parent = order[built.len() - 1].1;
            if let Some(mut node) = built.pop() {
                node.children.reverse();
                built[parent].children.push(node);
            }
        }
        let mut root = built.swap_remove(0);
        root.children.reverse();
        root
    }
}

impl<P: PartialEq> PartialEq for TreeNode<P> {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.depth != b.depth || a.children.len() != b.children.len() || a.post != b.post {
                return false;
            }
            stack.extend(a.children.iter().zip(b.children.iter()));
        }
        true
    }
}

impl<P: ThreadPost> TreeNode<P> {
    pub fn id(&self) -> P::Id {
        self.post.id()
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of nodes in this subtree, including this one
    pub fn size(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

/// Group post indices by parent id, keeping input order within each group.
/// Later entries reusing an id that was already seen are left out.
fn index_by_parent<P: ThreadPost>(posts: &[P]) -> HashMap<Option<P::Id>, Vec<usize>> {
    let mut seen = HashSet::with_capacity(posts.len());
    let mut index: HashMap<Option<P::Id>, Vec<usize>> = HashMap::new();

    for (i, post) in posts.iter().enumerate() {
        if !seen.insert(post.id()) {
            log::trace!("duplicate post id {:?} at position {}, keeping first", post.id(), i);
            continue;
        }
        index.entry(post.parent_id()).or_default().push(i);
    }

    index
}

/// Every transitive reply to `root_id`, the root itself excluded.
///
/// Output is breadth-first: direct replies first, then their replies, each
/// level in input order. Callers wanting chronological order sort afterwards.
pub fn collect_descendants<P: ThreadPost + Clone>(root_id: P::Id, all_posts: &[P]) -> Vec<P> {
    let index = index_by_parent(all_posts);

    let mut visited = HashSet::from([root_id]);
    let mut queue = VecDeque::from([root_id]);
    let mut descendants = Vec::new();

    while let Some(parent) = queue.pop_front() {
        let Some(children) = index.get(&Some(parent)) else {
            continue;
        };
        for &i in children {
            let post = &all_posts[i];
            if !visited.insert(post.id()) {
                log::debug!("reply cycle at post {:?} under {:?}, skipping", post.id(), parent);
                continue;
            }
            queue.push_back(post.id());
            descendants.push(post.clone());
        }
    }

    log::trace!("collected {} descendants of {:?}", descendants.len(), root_id);
    descendants
}

struct Slot {
    index: usize,
    depth: usize,
    parent: Option<usize>,
}

/// Build the nested thread below `parent_id` (`None` selects top-level
/// posts). Direct children of `parent_id` sit at `depth`, their replies at
/// `depth + 1`, and so on.
///
/// Siblings keep their relative order from `candidates`; nothing is
/// re-sorted. Pre-sort with [`sort_chronologically`] for oldest-first
/// display.
pub fn build_tree<P: ThreadPost + Clone>(
    parent_id: Option<P::Id>,
    candidates: &[P],
    depth: usize,
) -> Vec<TreeNode<P>> {
    let index = index_by_parent(candidates);

    let mut visited = HashSet::new();
    if let Some(id) = parent_id {
        visited.insert(id);
    }

    // Breadth-first placement. A slot's parent always precedes it.
    let mut slots: Vec<Slot> = Vec::new();
    if let Some(top) = index.get(&parent_id) {
        for &i in top {
            if visited.insert(candidates[i].id()) {
                slots.push(Slot { index: i, depth, parent: None });
            }
        }
    }

    let mut cursor = 0;
    while cursor < slots.len() {
        let id = candidates[slots[cursor].index].id();
        let child_depth = slots[cursor].depth + 1;
        if let Some(children) = index.get(&Some(id)) {
            for &i in children {
                if visited.insert(candidates[i].id()) {
                    slots.push(Slot { index: i, depth: child_depth, parent: Some(cursor) });
                } else {
                    log::debug!("reply cycle at post {:?} under {:?}, skipping", candidates[i].id(), id);
                }
            }
        }
        cursor += 1;
    }

    // Assemble bottom-up: walking slots in reverse, every child is complete
    // before it is moved into its parent.
    let mut nodes: Vec<Option<TreeNode<P>>> = slots
        .iter()
        .map(|slot| {
            Some(TreeNode {
                post: candidates[slot.index].clone(),
                depth: slot.depth,
                children: Vec::new(),
            })
        })
        .collect();

    let mut roots = Vec::new();
    for i in (0..slots.len()).rev() {
        let Some(mut node) = nodes[i].take() else {
            continue;
        };
        // Siblings were pushed last-first
        node.children.reverse();
        match slots[i].parent {
            Some(parent) => {
                if let Some(parent_node) = nodes[parent].as_mut() {
                    parent_node.children.push(node);
                }
            }
            None => roots.push(node),
        }
    }
    roots.reverse();
    roots
}

/// Number of posts in `all_replies` replying directly to `post_id`
pub fn count_direct_replies<P: ThreadPost>(post_id: P::Id, all_replies: &[P]) -> usize {
    all_replies
        .iter()
        .filter(|reply| reply.parent_id() == Some(post_id))
        .count()
}

/// The post a reply answers, for "Replying to @user" display.
///
/// `None` means the parent is not in the loaded snapshot; callers should show
/// no parent rather than fail.
pub fn resolve_parent<'a, P: ThreadPost>(
    reply_to_id: P::Id,
    root: &'a P,
    all_replies: &'a [P],
) -> Option<&'a P> {
    if root.id() == reply_to_id {
        return Some(root);
    }
    all_replies.iter().find(|reply| reply.id() == reply_to_id)
}

/// Chain of loaded ancestors of `post_id`, nearest first. Stops at the first
/// parent missing from `all_posts` or on a repeated id.
pub fn ancestors<P: ThreadPost>(post_id: P::Id, all_posts: &[P]) -> Vec<&P> {
    let by_id = index_by_id(all_posts);
    let mut visited = HashSet::from([post_id]);
    let mut chain = Vec::new();

    let mut current = by_id.get(&post_id).and_then(|post| post.parent_id());
    while let Some(parent_id) = current {
        if !visited.insert(parent_id) {
            break;
        }
        let Some(parent) = by_id.get(&parent_id) else {
            break;
        };
        chain.push(*parent);
        current = parent.parent_id();
    }

    chain
}

/// Whether `post` sits anywhere below `ancestor_id`
pub fn is_descendant_of<P: ThreadPost>(post: &P, ancestor_id: P::Id, all_posts: &[P]) -> bool {
    if post.parent_id() == Some(ancestor_id) {
        return true;
    }
    ancestors(post.id(), all_posts)
        .iter()
        .any(|ancestor| ancestor.parent_id() == Some(ancestor_id))
}

fn index_by_id<P: ThreadPost>(posts: &[P]) -> HashMap<P::Id, &P> {
    let mut by_id = HashMap::with_capacity(posts.len());
    for post in posts {
        by_id.entry(post.id()).or_insert(post);
    }
    by_id
}

/// Stable oldest-first sort on `custom_date`, falling back to `created_at`
pub fn sort_chronologically(tweaks: &mut [Tweak]) {
    tweaks.sort_by_key(|tweak| tweak.display_date());
}

/// One visible row of a flattened thread
#[derive(Debug, Clone, Copy)]
pub struct FlatRow<'a, P> {
    pub node: &'a TreeNode<P>,
    pub has_children: bool,
}

/// Depth-first rows for display. Children are listed only under nodes whose
/// id is in `expanded`.
pub fn flatten<'a, P: ThreadPost>(
    nodes: &'a [TreeNode<P>],
    expanded: &HashSet<P::Id>,
) -> Vec<FlatRow<'a, P>> {
    let mut rows = Vec::new();
    let mut stack: Vec<&TreeNode<P>> = nodes.iter().rev().collect();

    while let Some(node) = stack.pop() {
        rows.push(FlatRow { node, has_children: node.has_children() });
        if expanded.contains(&node.id()) {
            stack.extend(node.children.iter().rev());
        }
    }

    rows
}
