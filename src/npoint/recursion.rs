//! Depth-first recursion over node sets.

use smallvec::SmallVec;

use crate::matcher::{BoundStatus, Matcher};
use crate::tree::PartitionNode;

use super::{NPointCounter, TupleCount};

impl<'a, M: Matcher> NPointCounter<'a, M> {
    /// Count every valid tuple drawn from `nodes` (position `i` from
    /// `nodes[i]`) into `acc`.
    ///
    /// `nodes` is the caller's working array: split positions are
    /// substituted with children during recursion and restored before
    /// returning. `inherited` is the parent's per-permutation status and
    /// `previous_split` the position the parent split (`None` at the top).
    pub(super) fn depth_first<'n, N: PartitionNode>(
        &mut self,
        nodes: &mut [&'n N],
        inherited: &[BoundStatus],
        previous_split: Option<usize>,
        acc: &mut TupleCount,
    ) {
        let tuple_size = nodes.len();
        debug_assert_eq!(tuple_size, self.matcher.tuple_size());
        debug_assert_eq!(inherited.len(), self.matcher.num_permutations());

        let mut status: SmallVec<[BoundStatus; 8]> = SmallVec::from_slice(inherited);
        let changed = if self.params.reuse_parent_status {
            previous_split
        } else {
            status.fill(BoundStatus::Subsume);
            None
        };

        for i in 0..tuple_size {
            for j in (i + 1)..tuple_size {
                // Pairs not touching the split node were settled by the parent.
                if changed.is_some_and(|s| s != i && s != j) {
                    continue;
                }

                let (node_i, node_j) = (nodes[i], nodes[j]);
                if self.params.prune_order && node_j.end() <= node_i.begin() {
                    self.stats.order_prunes += 1;
                    return;
                }

                if self.params.prune_exclusion {
                    self.stats.node_pair_tests += 1;
                    let verdict =
                        self.matcher
                            .test_hrect_pair(node_i.bound(), node_j.bound(), i, j, &mut status);
                    if verdict == BoundStatus::Exclude {
                        self.stats.exclusion_prunes += 1;
                        return;
                    }
                }
            }
        }

        // Largest non-leaf, first position on ties.
        let mut split: Option<(usize, usize)> = None;
        for (i, node) in nodes.iter().enumerate() {
            if !node.is_leaf() && split.map_or(true, |(_, count)| node.count() > count) {
                split = Some((i, node.count()));
            }
        }

        let Some((split_index, _)) = split else {
            for (list, node) in self.candidates.iter_mut().zip(nodes.iter()) {
                list.clear();
                list.extend(node.begin()..node.end());
            }
            self.base_case.run(&self.candidates, acc, &mut self.stats);
            return;
        };

        let parent = nodes[split_index];
        let Some((left, right)) = parent.children() else {
            unreachable!("split candidate is not a leaf");
        };

        nodes[split_index] = left;
        self.depth_first(nodes, &status, Some(split_index), acc);
        nodes[split_index] = right;
        self.depth_first(nodes, &status, Some(split_index), acc);
        nodes[split_index] = parent;
    }
}

#[cfg(test)]
mod tests {
    use crate::datasets::uniform_points;
    use crate::matcher::{DistanceMatcher, PermutationMode};
    use crate::npoint::{count_brute_force, CountParams};
    use crate::tree::{KdTree, KdTreeParams, PartitionNode};

    #[test]
    fn inherited_status_matches_fresh_tests() {
        let store = uniform_points(120, 2, 5).unwrap();
        let tree = KdTree::build(&store, KdTreeParams::default().with_leaf_size(3)).unwrap();
        let targets = vec![
            vec![0.0, 0.2, 0.3],
            vec![0.2, 0.0, 0.25],
            vec![0.3, 0.25, 0.0],
        ];
        let matcher = DistanceMatcher::from_targets(&targets, 0.1, PermutationMode::All).unwrap();

        let fresh = CountParams {
            reuse_parent_status: false,
            ..CountParams::default()
        };
        let (reused, reused_stats) = tree.count_tuples_with(&matcher, CountParams::default()).unwrap();
        let (plain, plain_stats) = tree.count_tuples_with(&matcher, fresh).unwrap();

        assert_eq!(reused.count, plain.count);
        // Inherited status is never weaker, so it never visits more node sets.
        assert!(reused_stats.base_cases <= plain_stats.base_cases);
        assert_eq!(
            reused.count,
            count_brute_force(tree.points(), &matcher).unwrap().count
        );
    }

    #[test]
    fn distinct_subtrees_per_position() {
        let store = uniform_points(40, 1, 9).unwrap();
        let tree = KdTree::build(&store, KdTreeParams::default().with_leaf_size(2)).unwrap();
        let matcher = DistanceMatcher::within(2, 0.3).unwrap();
        let (left, right) = tree.root().children().unwrap();

        let mut counter =
            crate::npoint::NPointCounter::new(tree.points(), &matcher, CountParams::default()).unwrap();
        let cross = counter.count(&[left, right]).unwrap();
        let reversed = counter.count(&[right, left]).unwrap();

        // Only increasing index pairs count, and right's indices all follow left's.
        assert_eq!(reversed.count, 0);

        let pts = tree.points();
        let expected = (left.begin()..left.end())
            .flat_map(|a| (right.begin()..right.end()).map(move |b| (a, b)))
            .filter(|&(a, b)| pts.distance_sq(a, b) <= 0.3 * 0.3)
            .count() as u64;
        assert_eq!(cross.count, expected);
    }
}
