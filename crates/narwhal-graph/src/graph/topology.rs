//! Inclusion-tree queries: ancestors, depths, connectivity and neighborhoods.

use std::collections::VecDeque;

use rustc_hash::FxHashSet;

use super::{EdgeId, GraphId, GraphManager, NodeId};

impl GraphManager {
    /// Fills `lca`, `source_in_lca` and `target_in_lca` for every listed edge.
    ///
    /// A self-loop's ancestor is its owner graph, with both `*_in_lca` fields set to the node.
    pub fn calc_lowest_common_ancestors(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        let edges = self.all_edges();
        for &e in edges.iter() {
            let (Some(source), Some(target)) = (self[e].source, self[e].target) else {
                continue;
            };

            if source == target {
                let owner = self[source].owner;
                let edge = &mut self[e];
                edge.lca = owner;
                edge.source_in_lca = Some(source);
                edge.target_in_lca = Some(target);
                continue;
            }

            let mut lca = None;
            let mut source_in_lca = source;
            let mut target_in_lca;
            let mut source_graph = self.owner_of(source);

            'outer: loop {
                target_in_lca = target;
                let mut target_graph = self.owner_of(target);
                loop {
                    if target_graph == source_graph {
                        lca = Some(target_graph);
                        break 'outer;
                    }
                    if target_graph == root {
                        break;
                    }
                    target_in_lca = self.parent_of(target_graph);
                    target_graph = self.owner_of(target_in_lca);
                }
                if source_graph == root {
                    break;
                }
                source_in_lca = self.parent_of(source_graph);
                source_graph = self.owner_of(source_in_lca);
            }

            let edge = &mut self[e];
            edge.lca = lca;
            edge.source_in_lca = Some(source_in_lca);
            edge.target_in_lca = Some(target_in_lca);
        }
    }

    /// Lowest graph containing both nodes (directly or through compound ancestors).
    pub fn calc_lowest_common_ancestor(&self, first: NodeId, second: NodeId) -> Option<GraphId> {
        if first == second {
            return self[first].owner;
        }
        let first_chain = self.owner_chain(first);
        self.owner_chain(second)
            .into_iter()
            .find(|g| first_chain.contains(g))
    }

    /// Graphs enclosing `node`, innermost first, ending with the root.
    fn owner_chain(&self, node: NodeId) -> Vec<GraphId> {
        let mut chain = Vec::new();
        let mut current = self[node].owner;
        while let Some(g) = current {
            chain.push(g);
            current = self[g].parent.and_then(|p| self[p].owner);
        }
        chain
    }

    fn owner_of(&self, node: NodeId) -> GraphId {
        match self[node].owner {
            Some(g) => g,
            None => panic!("node {node:?} has no owner graph"),
        }
    }

    fn parent_of(&self, graph: GraphId) -> NodeId {
        match self[graph].parent {
            Some(n) => n,
            None => panic!("graph {graph:?} has no parent node"),
        }
    }

    /// Members of the root graph get depth 1, members of a child graph get their parent's
    /// depth plus one.
    pub fn calc_inclusion_tree_depths(&mut self) {
        if let Some(root) = self.root {
            self.assign_depths(root, 1);
        }
    }

    fn assign_depths(&mut self, graph: GraphId, depth: u32) {
        let members = self[graph].nodes.clone();
        for n in members {
            self[n].inclusion_tree_depth = depth;
            if let Some(child) = self[n].child {
                self.assign_depths(child, depth + 1);
            }
        }
    }

    /// Depth of a graph: its parent node's depth, `0` for the root.
    pub fn graph_depth(&self, graph: GraphId) -> u32 {
        self[graph]
            .parent
            .map(|p| self[p].inclusion_tree_depth)
            .unwrap_or(0)
    }

    /// Walks from the other end of `edge` up the inclusion tree until reaching a member of
    /// `graph`. Returns `None` when the walk reaches the root without meeting `graph`.
    pub fn other_end_in_graph(&self, edge: EdgeId, node: NodeId, graph: GraphId) -> Option<NodeId> {
        let root = self.root?;
        let mut other = self[edge].other_end(node)?;
        loop {
            let owner = self[other].owner?;
            if owner == graph {
                return Some(other);
            }
            if owner == root {
                return None;
            }
            other = self[owner].parent?;
        }
    }

    /// Recomputes whether the members of `graph` form one connected component. Edges reaching
    /// into nested graphs count through their outermost ancestor in `graph`. An empty graph is
    /// connected.
    pub fn update_connected(&mut self, graph: GraphId) {
        let member_count = self[graph].nodes.len();
        let Some(first) = self[graph].nodes.first().copied() else {
            self[graph].is_connected = true;
            return;
        };

        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut queue: VecDeque<NodeId> = self.with_children(first).into();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for &e in &self[current].edges {
                if let Some(neighbor) = self.other_end_in_graph(e, current, graph) {
                    if !visited.contains(&neighbor) {
                        queue.extend(self.with_children(neighbor));
                    }
                }
            }
        }

        let in_graph = visited
            .iter()
            .filter(|&&n| self[n].owner == Some(graph))
            .count();
        self[graph].is_connected = in_graph == member_count;
    }

    /// `node` followed by every node nested inside it, depth first.
    pub fn with_children(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = vec![node];
        if let Some(child) = self[node].child {
            for &n in &self[child].nodes {
                out.extend(self.with_children(n));
            }
        }
        out
    }

    /// Number of leaf nodes nested in `node`; a leaf or an empty compound counts as one.
    pub fn no_of_children(&self, node: NodeId) -> usize {
        let Some(child) = self[node].child else {
            return 1;
        };
        let count: usize = self[child]
            .nodes
            .iter()
            .map(|&n| self.no_of_children(n))
            .sum();
        count.max(1)
    }

    /// Distinct other ends of the edges of `node`, in edge order. Self-loops are skipped.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &e in &self[node].edges {
            if let Some(other) = self[e].other_end(node) {
                if other != node && !out.contains(&other) {
                    out.push(other);
                }
            }
        }
        out
    }

    /// Distinct targets of the edges leaving `node`.
    pub fn successors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for &e in &self[node].edges {
            let edge = &self[e];
            if edge.source == Some(node) {
                if let Some(t) = edge.target {
                    if t != node && !out.contains(&t) {
                        out.push(t);
                    }
                }
            }
        }
        out
    }

    pub fn is_neighbor(&self, a: NodeId, b: NodeId) -> bool {
        self[a]
            .edges
            .iter()
            .any(|&e| self[e].other_end(a) == Some(b))
    }

    /// Edges joining `a` and `b` in either direction.
    pub fn edges_between(&self, a: NodeId, b: NodeId) -> Vec<EdgeId> {
        self[a]
            .edges
            .iter()
            .copied()
            .filter(|&e| {
                let edge = &self[e];
                (edge.source == Some(a) && edge.target == Some(b))
                    || (edge.source == Some(b) && edge.target == Some(a))
            })
            .collect()
    }

    /// Edges directed from `source` to `target`.
    pub fn edge_list_to_node(&self, source: NodeId, target: NodeId) -> Vec<EdgeId> {
        self[source]
            .edges
            .iter()
            .copied()
            .filter(|&e| self[e].source == Some(source) && self[e].target == Some(target))
            .collect()
    }

    /// Number of incident edges whose other end is a different member of the node's owner.
    pub fn graph_degree(&self, node: NodeId) -> usize {
        let owner = self[node].owner;
        self[node]
            .edges
            .iter()
            .filter(|&&e| {
                self[e]
                    .other_end(node)
                    .is_some_and(|o| o != node && self[o].owner == owner)
            })
            .count()
    }

    /// Compound nodes enclosing `node`, innermost first.
    pub fn all_parents(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self[node].owner.and_then(|g| self[g].parent);
        while let Some(p) = current {
            out.push(p);
            current = self[p].owner.and_then(|g| self[g].parent);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{Edge, GraphManager, Node};

    #[test]
    fn lca_of_nested_endpoints() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = gm.add_node(root, Node::sized(10.0, 10.0));
        let c = gm.add_node(root, Node::sized(10.0, 10.0));
        let inner = gm.add_graph(c);
        let d = gm.add_node(inner, Node::sized(10.0, 10.0));
        let d2 = gm.add_node(inner, Node::sized(10.0, 10.0));

        let ad = gm.add_edge(a, d, Edge::new());
        let dd = gm.add_edge(d, d2, Edge::new());
        let self_loop = gm.add_edge(d, d, Edge::new());
        gm.calc_lowest_common_ancestors();

        assert_eq!(gm[ad].lca(), Some(root));
        assert_eq!(gm[ad].source_in_lca(), Some(a));
        assert_eq!(gm[ad].target_in_lca(), Some(c));
        assert_eq!(gm[dd].lca(), Some(inner));
        assert_eq!(gm[self_loop].lca(), Some(inner));
        assert_eq!(gm.calc_lowest_common_ancestor(a, d2), Some(root));
        assert_eq!(gm.calc_lowest_common_ancestor(d, d2), Some(inner));
    }

    #[test]
    fn depths_follow_nesting() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let c = gm.add_node(root, Node::sized(10.0, 10.0));
        let inner = gm.add_graph(c);
        let d = gm.add_node(inner, Node::sized(10.0, 10.0));
        gm.calc_inclusion_tree_depths();

        assert_eq!(gm[c].inclusion_tree_depth(), 1);
        assert_eq!(gm[d].inclusion_tree_depth(), 2);
        assert_eq!(gm.graph_depth(root), 0);
        assert_eq!(gm.graph_depth(inner), 1);
        gm.validate().unwrap();
    }

    #[test]
    fn connectivity_lifts_nested_edges() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = gm.add_node(root, Node::sized(10.0, 10.0));
        let c = gm.add_node(root, Node::sized(10.0, 10.0));
        let inner = gm.add_graph(c);
        let d = gm.add_node(inner, Node::sized(10.0, 10.0));

        gm.update_connected(root);
        assert!(!gm[root].is_connected());

        gm.add_edge(a, d, Edge::new());
        gm.update_connected(root);
        assert!(gm[root].is_connected());

        let empty_parent = gm.add_node(inner, Node::sized(10.0, 10.0));
        let empty = gm.add_graph(empty_parent);
        gm.update_connected(empty);
        assert!(gm[empty].is_connected());
    }

    #[test]
    fn children_counts() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let c = gm.add_node(root, Node::sized(10.0, 10.0));
        assert_eq!(gm.no_of_children(c), 1);
        let inner = gm.add_graph(c);
        assert_eq!(gm.no_of_children(c), 1);
        let d = gm.add_node(inner, Node::sized(10.0, 10.0));
        let e = gm.add_node(inner, Node::sized(10.0, 10.0));
        assert_eq!(gm.no_of_children(c), 2);
        assert_eq!(gm.with_children(c), vec![c, d, e]);
        assert_eq!(gm.all_parents(d), vec![c]);
    }
}
