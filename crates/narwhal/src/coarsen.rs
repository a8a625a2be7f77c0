//! Multi-level scaling for flat graphs: coarsen by matching, lay out the coarsest level, then
//! refine level by level.

use narwhal_graph::{Edge, GraphManager, Node, NodeId, Rect};
use rustc_hash::FxHashMap;

use crate::engine::Engine;
use crate::policy::LayoutPolicy;

/// One coarse level: the coarse graph and, for each coarse node, the one or two finer nodes it
/// stands for.
#[derive(Debug, Default)]
pub(crate) struct CoarseLevel {
    pub gm: GraphManager,
    pub preds: Vec<(NodeId, NodeId, Option<NodeId>)>,
    weights: Vec<usize>,
}

/// Contracts each root node with its lightest unmatched neighbor. Unmatched nodes carry over
/// alone. Returns the coarse graph together with the matching.
pub(crate) fn coarsen(finer: &GraphManager, weights: &[usize]) -> CoarseLevel {
    let mut level = CoarseLevel::default();
    let Some(root) = finer.root() else {
        return level;
    };
    let coarse_root = level.gm.add_root();
    let weight = |n: NodeId| weights.get(n.index()).copied().unwrap_or(1);

    let mut next: FxHashMap<NodeId, NodeId> = FxHashMap::default();
    for &v in finer[root].nodes() {
        if next.contains_key(&v) {
            continue;
        }
        let partner = finer
            .neighbors(v)
            .into_iter()
            .filter(|u| !next.contains_key(u) && finer[*u].owner() == Some(root))
            .min_by_key(|&u| weight(u));

        let rect = match partner {
            Some(u) => {
                let (rv, ru) = (finer[v].rect, finer[u].rect);
                let larger = if ru.width * ru.height > rv.width * rv.height {
                    ru
                } else {
                    rv
                };
                Rect::new(rv.x, rv.y, larger.width, larger.height)
            }
            None => finer[v].rect,
        };
        let c = level.gm.add_node(coarse_root, Node::new(rect));
        next.insert(v, c);
        if let Some(u) = partner {
            next.insert(u, c);
        }
        if level.weights.len() <= c.index() {
            level.weights.resize(c.index() + 1, 0);
        }
        level.weights[c.index()] = weight(v) + partner.map_or(0, weight);
        level.preds.push((c, v, partner));
    }

    for &e in finer.all_edges().iter() {
        let (Some(s), Some(t)) = (finer[e].source(), finer[e].target()) else {
            continue;
        };
        let (Some(&cs), Some(&ct)) = (next.get(&s), next.get(&t)) else {
            continue;
        };
        if cs != ct && level.gm.edges_between(cs, ct).is_empty() {
            level.gm.add_edge(cs, ct, Edge::new());
        }
    }
    level
}

/// Successive coarse levels, finest first, stopping once a level no longer shrinks or is down
/// to a single node.
pub(crate) fn coarsen_graph(gm: &GraphManager) -> Vec<CoarseLevel> {
    let mut levels: Vec<CoarseLevel> = Vec::new();
    let root_size = |g: &GraphManager| g.root().map_or(0, |r| g[r].nodes().len());

    loop {
        let (prev_count, next_level) = match levels.last() {
            Some(last) => (root_size(&last.gm), coarsen(&last.gm, &last.weights)),
            None => (root_size(gm), coarsen(gm, &[])),
        };
        let count = root_size(&next_level.gm);
        if count >= prev_count {
            break;
        }
        levels.push(next_level);
        if count <= 1 {
            break;
        }
    }
    levels
}

impl Engine {
    pub(crate) fn multi_level_scaling_layout<P: LayoutPolicy + ?Sized>(&mut self, policy: &mut P) {
        let incremental = self.options.incremental;
        let levels = coarsen_graph(&self.gm);
        self.no_of_levels = levels.len();
        tracing::debug!(levels = levels.len(), "coarsened graph");

        let mut managers: Vec<GraphManager> = Vec::with_capacity(levels.len() + 1);
        let mut preds: Vec<Vec<(NodeId, NodeId, Option<NodeId>)>> =
            Vec::with_capacity(levels.len() + 1);
        managers.push(std::mem::take(&mut self.gm));
        preds.push(Vec::new());
        for level in levels {
            managers.push(level.gm);
            preds.push(level.preds);
        }

        for level in (0..managers.len()).rev() {
            self.level = level;
            self.gm = std::mem::take(&mut managers[level]);
            self.classic_layout(policy);
            self.options.incremental = true;

            if level >= 1 {
                let finer = &mut managers[level - 1];
                for &(c, first, second) in &preds[level] {
                    let location = self.gm[c].location();
                    finer[first].set_location(location.x, location.y);
                    if let Some(second) = second {
                        finer[second].set_location(
                            location.x + self.ideal_edge_length,
                            location.y + self.ideal_edge_length,
                        );
                    }
                }
                self.total_iterations = 0;
            }
            managers[level] = std::mem::take(&mut self.gm);
        }

        self.gm = std::mem::take(&mut managers[0]);
        self.level = 0;
        self.options.incremental = incremental;
    }
}

#[cfg(test)]
mod tests {
    use narwhal_graph::{Edge, GraphManager, Node};

    use super::coarsen_graph;

    #[test]
    fn path_halves_at_each_level() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let ids: Vec<_> = (0..8)
            .map(|_| gm.add_node(root, Node::sized(10.0, 10.0)))
            .collect();
        for w in ids.windows(2) {
            gm.add_edge(w[0], w[1], Edge::new());
        }
        let levels = coarsen_graph(&gm);
        let sizes: Vec<usize> = levels
            .iter()
            .map(|l| l.gm[l.gm.root().expect("root")].nodes().len())
            .collect();
        assert_eq!(sizes, vec![4, 2, 1]);
        assert_eq!(levels[0].gm.all_edges().len(), 3);
    }
}
