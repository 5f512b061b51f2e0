//! KD-tree over a weighted point store.
//!
//! Each node owns a contiguous range of a reordered copy of the input store
//! and a tight bounding box around that range.
//!
//! Algorithm:
//! - Split along the dimension of largest extent
//! - `SplitRule::Median` puts half the points on each side (balanced tree)
//! - `SplitRule::Midpoint` cuts the box in half (adapts to clustering)
//! - Stop at `max_leaf_size` points, at `max_depth`, or when every point in
//!   the node is identical
//!
//! The reordering is recorded so results can be mapped back to input order.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Hrect, PartitionNode};
use crate::error::{NPointError, Result};
use crate::points::PointStore;

/// How an internal node chooses its cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRule {
    /// Cut at the median coordinate of the widest dimension.
    #[default]
    Median,
    /// Cut at the middle of the bounding box along the widest dimension.
    Midpoint,
}

/// KD-tree parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdTreeParams {
    /// Maximum points per leaf
    pub max_leaf_size: usize,

    /// Maximum depth
    pub max_depth: usize,

    pub split_rule: SplitRule,
}

impl Default for KdTreeParams {
    fn default() -> Self {
        Self {
            max_leaf_size: 16,
            max_depth: 48,
            split_rule: SplitRule::Median,
        }
    }
}

impl KdTreeParams {
    #[must_use]
    pub fn with_leaf_size(mut self, max_leaf_size: usize) -> Self {
        self.max_leaf_size = max_leaf_size;
        self
    }

    #[must_use]
    pub fn with_split_rule(mut self, split_rule: SplitRule) -> Self {
        self.split_rule = split_rule;
        self
    }
}

/// KD-tree node.
#[derive(Debug, Clone)]
pub enum KdNode {
    /// Internal node: range, bound, and exactly two children
    Internal {
        begin: usize,
        end: usize,
        bound: Hrect,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
    /// Leaf node: range and bound only
    Leaf {
        begin: usize,
        end: usize,
        bound: Hrect,
    },
}

impl PartitionNode for KdNode {
    #[inline]
    fn begin(&self) -> usize {
        match self {
            KdNode::Internal { begin, .. } | KdNode::Leaf { begin, .. } => *begin,
        }
    }

    #[inline]
    fn end(&self) -> usize {
        match self {
            KdNode::Internal { end, .. } | KdNode::Leaf { end, .. } => *end,
        }
    }

    #[inline]
    fn bound(&self) -> &Hrect {
        match self {
            KdNode::Internal { bound, .. } | KdNode::Leaf { bound, .. } => bound,
        }
    }

    #[inline]
    fn children(&self) -> Option<(&Self, &Self)> {
        match self {
            KdNode::Internal { left, right, .. } => Some((&**left, &**right)),
            KdNode::Leaf { .. } => None,
        }
    }
}

/// Shape summary of a built tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeStats {
    pub num_nodes: usize,
    pub num_leaves: usize,
    pub max_depth: usize,
    pub largest_leaf: usize,
}

/// KD-tree with its reordered point store.
#[derive(Debug, Clone)]
pub struct KdTree {
    points: PointStore,
    root: KdNode,
    old_from_new: Vec<usize>,
    params: KdTreeParams,
    stats: TreeStats,
}

impl KdTree {
    /// Build a tree over `points`.
    ///
    /// The store is copied in tree order; point `i` of [`KdTree::points`] is
    /// point `old_from_new()[i]` of the input.
    pub fn build(points: &PointStore, params: KdTreeParams) -> Result<Self> {
        if params.max_leaf_size == 0 {
            return Err(NPointError::InvalidParameter(
                "max_leaf_size must be greater than 0".to_string(),
            ));
        }
        if points.is_empty() {
            return Err(NPointError::EmptyPointSet);
        }

        let mut order: Vec<usize> = (0..points.len()).collect();
        let mut stats = TreeStats::default();
        let root = build_node(points, &params, &mut order, 0, 0, &mut stats)?;

        if stats.largest_leaf > params.max_leaf_size {
            warn!(
                largest_leaf = stats.largest_leaf,
                max_leaf_size = params.max_leaf_size,
                max_depth = params.max_depth,
                "kd-tree leaf exceeds max_leaf_size (depth limit or duplicate points)"
            );
        }
        debug!(
            points = points.len(),
            nodes = stats.num_nodes,
            leaves = stats.num_leaves,
            depth = stats.max_depth,
            "built kd-tree"
        );

        Ok(Self {
            points: points.permuted(&order),
            root,
            old_from_new: order,
            params,
            stats,
        })
    }

    pub fn root(&self) -> &KdNode {
        &self.root
    }

    /// Points in tree order.
    pub fn points(&self) -> &PointStore {
        &self.points
    }

    /// Input index of each tree-order point.
    pub fn old_from_new(&self) -> &[usize] {
        &self.old_from_new
    }

    pub fn params(&self) -> &KdTreeParams {
        &self.params
    }

    pub fn stats(&self) -> TreeStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Build the subtree owning `order[..]`, whose first element sits at global
/// position `offset` of the final ordering.
fn build_node(
    points: &PointStore,
    params: &KdTreeParams,
    order: &mut [usize],
    offset: usize,
    depth: usize,
    stats: &mut TreeStats,
) -> Result<KdNode> {
    let begin = offset;
    let end = offset + order.len();

    let bound = Hrect::from_points(order.iter().map(|&i| points.point(i)))
        .ok_or(NPointError::EmptyPointSet)?;

    stats.num_nodes += 1;
    stats.max_depth = stats.max_depth.max(depth);

    let (split_dim, width) = bound.widest_dimension();
    if order.len() <= params.max_leaf_size || depth >= params.max_depth || width <= 0.0 {
        stats.num_leaves += 1;
        stats.largest_leaf = stats.largest_leaf.max(order.len());
        return Ok(KdNode::Leaf { begin, end, bound });
    }

    let mid = match params.split_rule {
        SplitRule::Median => median_split(points, order, split_dim),
        SplitRule::Midpoint => {
            let cut = bound.lo()[split_dim] + 0.5 * width;
            let mut store = 0;
            for i in 0..order.len() {
                if points.point(order[i])[split_dim] < cut {
                    order.swap(i, store);
                    store += 1;
                }
            }
            // A box a few ulps wide can round the cut onto an edge.
            if store == 0 || store == order.len() {
                median_split(points, order, split_dim)
            } else {
                store
            }
        }
    };

    let (left_order, right_order) = order.split_at_mut(mid);
    let left = build_node(points, params, left_order, begin, depth + 1, stats)?;
    let right = build_node(points, params, right_order, begin + mid, depth + 1, stats)?;

    Ok(KdNode::Internal {
        begin,
        end,
        bound,
        left: Box::new(left),
        right: Box::new(right),
    })
}

/// Partition `order` around its median along `dim`; returns the left size.
///
/// Both sides are non-empty when `order` holds at least two points.
fn median_split(points: &PointStore, order: &mut [usize], dim: usize) -> usize {
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| {
        points.point(a)[dim].total_cmp(&points.point(b)[dim])
    });
    mid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::uniform_points;

    fn check_node(tree: &KdTree, node: &KdNode) {
        assert!(node.begin() < node.end());
        for i in node.begin()..node.end() {
            assert!(node.bound().contains(tree.points().point(i)));
        }
        if let Some((left, right)) = node.children() {
            assert_eq!(left.begin(), node.begin());
            assert_eq!(left.end(), right.begin());
            assert_eq!(right.end(), node.end());
            check_node(tree, left);
            check_node(tree, right);
        }
    }

    #[test]
    fn ranges_are_contiguous_and_bounded() {
        let store = uniform_points(200, 3, 7).unwrap();
        for rule in [SplitRule::Median, SplitRule::Midpoint] {
            let params = KdTreeParams::default().with_leaf_size(5).with_split_rule(rule);
            let tree = KdTree::build(&store, params).unwrap();
            assert_eq!(tree.root().count(), 200);
            check_node(&tree, tree.root());
            assert!(tree.stats().largest_leaf <= 5);
        }
    }

    #[test]
    fn reordering_is_a_permutation() {
        let store = uniform_points(64, 2, 11).unwrap();
        let tree = KdTree::build(&store, KdTreeParams::default().with_leaf_size(4)).unwrap();

        let mut seen = tree.old_from_new().to_vec();
        seen.sort_unstable();
        assert_eq!(seen, (0..64).collect::<Vec<_>>());

        for (new, &old) in tree.old_from_new().iter().enumerate() {
            assert_eq!(tree.points().point(new), store.point(old));
        }
    }

    #[test]
    fn duplicate_points_stop_splitting() {
        let store = PointStore::new(2, vec![1.0; 2 * 40]).unwrap();
        let tree = KdTree::build(&store, KdTreeParams::default().with_leaf_size(4)).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.stats().largest_leaf, 40);
    }

    #[test]
    fn depth_limit_is_respected() {
        let store = uniform_points(100, 2, 3).unwrap();
        let params = KdTreeParams {
            max_leaf_size: 1,
            max_depth: 2,
            split_rule: SplitRule::Median,
        };
        let tree = KdTree::build(&store, params).unwrap();
        assert_eq!(tree.stats().max_depth, 2);
        assert_eq!(tree.stats().num_leaves, 4);
    }

    #[test]
    fn midpoint_split_of_adjacent_floats() {
        let next = f64::from_bits(1.0f64.to_bits() + 1);
        let store = PointStore::new(1, vec![next, 1.0, next, 1.0]).unwrap();
        let params = KdTreeParams::default()
            .with_leaf_size(1)
            .with_split_rule(SplitRule::Midpoint);

        let tree = KdTree::build(&store, params).unwrap();
        check_node(&tree, tree.root());
        assert!(!tree.root().is_leaf());
        assert_eq!(tree.root().count(), 4);

        let pair = PointStore::new(1, vec![1.0, next]).unwrap();
        let params = KdTreeParams::default()
            .with_leaf_size(1)
            .with_split_rule(SplitRule::Midpoint);
        let tree = KdTree::build(&pair, params).unwrap();
        assert_eq!(tree.stats().num_leaves, 2);
    }

    #[test]
    fn rejects_bad_input() {
        let store = uniform_points(10, 2, 1).unwrap();
        let params = KdTreeParams::default().with_leaf_size(0);
        assert!(KdTree::build(&store, params).is_err());

        let empty = PointStore::new(2, Vec::new()).unwrap();
        assert_eq!(
            KdTree::build(&empty, KdTreeParams::default()).unwrap_err(),
            NPointError::EmptyPointSet
        );
    }

    #[test]
    fn params_fill_defaults_from_partial_json() {
        let params: KdTreeParams =
            serde_json::from_str(r#"{"max_leaf_size": 4, "split_rule": "midpoint"}"#).unwrap();
        assert_eq!(params.max_leaf_size, 4);
        assert_eq!(params.split_rule, SplitRule::Midpoint);
        assert_eq!(params.max_depth, KdTreeParams::default().max_depth);
    }
}
