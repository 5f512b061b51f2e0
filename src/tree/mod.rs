//! Partition trees consumed by the multi-tree search.
//!
//! The search only needs the read-only view in [`PartitionNode`]: a
//! contiguous index range over the tree's point ordering, a bounding box,
//! and zero or two children. [`KdTree`] is the provided implementation.

mod hrect;
mod kdtree;

pub use hrect::Hrect;
pub use kdtree::{KdNode, KdTree, KdTreeParams, SplitRule, TreeStats};

/// Read-only node of a binary space-partitioning tree.
///
/// Invariants the search relies on (maintained by construction, not
/// re-checked):
/// - `bound()` contains every point with index in `begin()..end()`;
/// - the two children's ranges partition the parent's range, left first.
pub trait PartitionNode {
    /// First point index owned by this node.
    fn begin(&self) -> usize;

    /// One past the last point index owned by this node.
    fn end(&self) -> usize;

    fn bound(&self) -> &Hrect;

    /// `(left, right)` for internal nodes, `None` for leaves.
    fn children(&self) -> Option<(&Self, &Self)>;

    #[inline]
    fn count(&self) -> usize {
        self.end() - self.begin()
    }

    #[inline]
    fn is_leaf(&self) -> bool {
        self.children().is_none()
    }

    #[inline]
    fn left(&self) -> Option<&Self> {
        self.children().map(|(l, _)| l)
    }

    #[inline]
    fn right(&self) -> Option<&Self> {
        self.children().map(|(_, r)| r)
    }
}
