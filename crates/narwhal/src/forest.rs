//! Tree decomposition of flat graphs, used by radial placement.

use std::collections::VecDeque;

use indexmap::IndexSet;
use narwhal_graph::{GraphManager, NodeId};
use rustc_hash::{FxHashMap, FxHashSet};

/// Splits the root graph into trees, one per connected component, nodes in breadth-first
/// order. Returns an empty list when the root holds a compound node or when any component has
/// a cycle (self-loops included). Parallel edges between a parent and its child are tolerated.
pub fn flat_forest(gm: &GraphManager) -> Vec<Vec<NodeId>> {
    let Some(root) = gm.root() else {
        return Vec::new();
    };
    if !gm.is_flat() {
        return Vec::new();
    }

    let mut forest = Vec::new();
    let mut unprocessed: IndexSet<NodeId> = gm[root].nodes().iter().copied().collect();
    let mut visited: FxHashSet<NodeId> = FxHashSet::default();
    let mut parents: FxHashMap<NodeId, NodeId> = FxHashMap::default();

    while let Some(&first) = unprocessed.first() {
        let mut tree = Vec::new();
        let mut queue = VecDeque::from([first]);

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            tree.push(current);

            for &e in gm[current].edges() {
                let Some(neighbor) = gm[e].other_end(current) else {
                    continue;
                };
                if parents.get(&current) == Some(&neighbor) {
                    continue;
                }
                if visited.contains(&neighbor) {
                    return Vec::new();
                }
                queue.push_back(neighbor);
                parents.insert(neighbor, current);
            }
        }

        unprocessed.retain(|n| !visited.contains(n));
        visited.clear();
        parents.clear();
        forest.push(tree);
    }
    forest
}

/// Center of a tree found by repeatedly peeling its leaves. With two candidates left the first
/// one (in tree order) wins.
pub fn find_center_of_tree(gm: &GraphManager, tree: &[NodeId]) -> Option<NodeId> {
    let mut remaining: Vec<NodeId> = tree.to_vec();
    if remaining.len() <= 2 {
        return remaining.first().copied();
    }

    let mut degree: FxHashMap<NodeId, usize> = FxHashMap::default();
    let mut removed: FxHashSet<NodeId> = FxHashSet::default();
    let mut leaves: Vec<NodeId> = Vec::new();
    for &n in tree {
        let d = gm.neighbors(n).len();
        degree.insert(n, d);
        if d == 1 {
            leaves.push(n);
            removed.insert(n);
        }
    }

    loop {
        if leaves.is_empty() {
            return remaining.first().copied();
        }
        let current = std::mem::take(&mut leaves);
        for n in current {
            remaining.retain(|&x| x != n);
            for neighbor in gm.neighbors(n) {
                if removed.contains(&neighbor) {
                    continue;
                }
                let Some(d) = degree.get_mut(&neighbor) else {
                    continue;
                };
                *d = d.saturating_sub(1);
                if *d == 1 {
                    leaves.push(neighbor);
                }
            }
        }
        removed.extend(leaves.iter().copied());

        if remaining.len() <= 2 {
            return remaining.first().copied();
        }
    }
}

pub fn find_center_of_each_tree(gm: &GraphManager, forest: &[Vec<NodeId>]) -> Vec<NodeId> {
    forest
        .iter()
        .filter_map(|tree| find_center_of_tree(gm, tree))
        .collect()
}
