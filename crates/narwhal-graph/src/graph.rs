//! Arena-backed compound graph.
//!
//! All structural mutation goes through [`GraphManager`] so that both sides of every relation
//! (node ↔ owner graph, compound node ↔ child graph, edge ↔ endpoint adjacency lists) stay in
//! sync. Structural misuse (stale ids, adding a node twice, giving a node a second child graph)
//! is a programming error and panics.

mod bounds;
mod edge;
mod node;
mod subgraph;
mod topology;

use std::cell::RefCell;
use std::ops::{Index, IndexMut};
use std::rc::Rc;

use crate::cluster::ClusterManager;
use crate::error::{ModelError, Result};

pub use edge::Edge;
pub use node::Node;
pub use subgraph::Graph;

use edge::EdgePlacement;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }

            fn from_index(index: usize) -> Self {
                Self(index as u32)
            }
        }
    };
}

arena_id!(
    /// Handle of a node inside a [`GraphManager`].
    NodeId
);
arena_id!(
    /// Handle of an edge inside a [`GraphManager`].
    EdgeId
);
arena_id!(
    /// Handle of a graph inside a [`GraphManager`].
    GraphId
);

#[derive(Debug, Clone, Default)]
pub struct GraphManager {
    nodes: Vec<Option<Node>>,
    edges: Vec<Option<Edge>>,
    graphs: Vec<Option<Graph>>,
    /// Graphs taking part in layout, in insertion order. Detached child graphs are alive in the
    /// arena but not listed here.
    graph_list: Vec<GraphId>,
    inter_graph_edges: Vec<EdgeId>,
    root: Option<GraphId>,
    all_nodes: RefCell<Option<Rc<[NodeId]>>>,
    all_edges: RefCell<Option<Rc<[EdgeId]>>>,
    gravitation_nodes: Option<Rc<[NodeId]>>,
    pub(crate) clusters: ClusterManager,
}

impl GraphManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> Option<GraphId> {
        self.root
    }

    /// Creates the root graph. A manager has exactly one root.
    pub fn add_root(&mut self) -> GraphId {
        self.add_root_with(Graph::new())
    }

    pub fn add_root_with(&mut self, mut graph: Graph) -> GraphId {
        assert!(self.root.is_none(), "graph manager already has a root graph");
        graph.parent = None;
        let id = GraphId::from_index(self.graphs.len());
        self.graphs.push(Some(graph));
        self.graph_list.push(id);
        self.root = Some(id);
        id
    }

    /// Creates a child graph for `parent`, turning it into a compound node.
    pub fn add_graph(&mut self, parent: NodeId) -> GraphId {
        self.add_graph_with(parent, Graph::new())
    }

    pub fn add_graph_with(&mut self, parent: NodeId, mut graph: Graph) -> GraphId {
        assert!(
            self[parent].child.is_none(),
            "node {parent:?} already has a child graph"
        );
        graph.parent = Some(parent);
        let id = GraphId::from_index(self.graphs.len());
        self.graphs.push(Some(graph));
        self.graph_list.push(id);
        self[parent].child = Some(id);
        self.reset_all_nodes();
        self.reset_all_edges();
        id
    }

    pub fn add_node(&mut self, graph: GraphId, mut node: Node) -> NodeId {
        assert!(self.graph_is_live(graph), "graph {graph:?} is not alive");
        node.owner = Some(graph);
        node.child = None;
        node.edges.clear();
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Some(node));
        self[graph].nodes.push(id);
        self.reset_all_nodes();
        id
    }

    /// Adds an edge between two existing nodes. The edge is intra-graph when both endpoints
    /// share an owner, inter-graph otherwise.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId, edge: Edge) -> EdgeId {
        let id = self.insert_edge(edge);
        self.connect_edge(id, source, target);
        id
    }

    /// Lists an edge in `graph` without endpoints. Such an edge makes the model invalid for
    /// layout until [`Self::connect_edge`] completes it.
    pub fn add_unconnected_edge(&mut self, graph: GraphId, edge: Edge) -> EdgeId {
        let id = self.insert_edge(edge);
        self[graph].edges.push(id);
        let e = &mut self[id];
        e.source = None;
        e.target = None;
        e.placement = EdgePlacement::Graph(graph);
        self.reset_all_edges();
        id
    }

    fn insert_edge(&mut self, mut edge: Edge) -> EdgeId {
        edge.placement = EdgePlacement::Detached;
        let id = EdgeId::from_index(self.edges.len());
        self.edges.push(Some(edge));
        id
    }

    /// Sets the endpoints of `edge` and lists it in the model. A previously listed edge is taken
    /// out first.
    pub fn connect_edge(&mut self, edge: EdgeId, source: NodeId, target: NodeId) {
        if self[edge].is_attached() {
            self.detach_edge(edge);
        }
        let source_owner = self[source].owner;
        let target_owner = self[target].owner;
        assert!(
            source_owner.is_some() && target_owner.is_some(),
            "edge endpoints must belong to a graph"
        );

        let placement = if source_owner == target_owner {
            let graph = source_owner.unwrap_or_else(|| unreachable!());
            self[graph].edges.push(edge);
            EdgePlacement::Graph(graph)
        } else {
            self.inter_graph_edges.push(edge);
            EdgePlacement::InterGraph
        };

        let e = &mut self[edge];
        e.source = Some(source);
        e.target = Some(target);
        e.placement = placement;

        self[source].edges.push(edge);
        if source != target {
            self[target].edges.push(edge);
        }
        self.reset_all_edges();
    }

    /// Takes an edge out of the model while keeping its record (endpoints, bend points, view)
    /// so that it can be restored with [`Self::reattach_edge`].
    pub fn detach_edge(&mut self, edge: EdgeId) {
        let (source, target, placement) = {
            let e = &self[edge];
            (e.source, e.target, e.placement)
        };
        match placement {
            EdgePlacement::Detached => return,
            EdgePlacement::Graph(g) => self[g].edges.retain(|&x| x != edge),
            EdgePlacement::InterGraph => self.inter_graph_edges.retain(|&x| x != edge),
        }
        for n in [source, target].into_iter().flatten() {
            if let Some(node) = self.nodes[n.index()].as_mut() {
                node.edges.retain(|&x| x != edge);
            }
        }
        self[edge].placement = EdgePlacement::Detached;
        self.reset_all_edges();
    }

    pub fn reattach_edge(&mut self, edge: EdgeId) {
        let (source, target) = (self[edge].source, self[edge].target);
        match (source, target) {
            (Some(s), Some(t)) => self.connect_edge(edge, s, t),
            _ => panic!("edge {edge:?} cannot be reattached without both endpoints"),
        }
    }

    /// Moves the endpoints of an edge, reclassifying it as intra- or inter-graph.
    pub fn reconnect_edge(&mut self, edge: EdgeId, source: NodeId, target: NodeId) {
        self.connect_edge(edge, source, target);
    }

    pub fn remove_edge(&mut self, edge: EdgeId) -> Edge {
        self.detach_edge(edge);
        match self.edges[edge.index()].take() {
            Some(e) => e,
            None => panic!("stale edge id {edge:?}"),
        }
    }

    /// Removes a node together with its incident edges and, for compound nodes, the whole
    /// child subtree.
    pub fn remove_node(&mut self, node: NodeId) -> Node {
        if let Some(child) = self[node].child {
            self.remove_graph(child);
        }
        let incident = self[node].edges.clone();
        for e in incident {
            if self.edges[e.index()].is_some() {
                self.remove_edge(e);
            }
        }
        if let Some(owner) = self[node].owner {
            if let Some(g) = self.graphs[owner.index()].as_mut() {
                g.nodes.retain(|&x| x != node);
            }
        }
        let clusters = self[node].clusters.clone();
        for c in clusters {
            self.clusters.unlink(c, node);
        }
        self.reset_all_nodes();
        self.gravitation_nodes = None;
        match self.nodes[node.index()].take() {
            Some(n) => n,
            None => panic!("stale node id {node:?}"),
        }
    }

    /// Removes a graph and every node in it. Removing the root empties the manager's tree.
    pub fn remove_graph(&mut self, graph: GraphId) {
        let members = self[graph].nodes.clone();
        for n in members {
            if self.nodes[n.index()].is_some() {
                self.remove_node(n);
            }
        }
        let intra = self[graph].edges.clone();
        for e in intra {
            if self.edges[e.index()].is_some() {
                self.remove_edge(e);
            }
        }
        if let Some(parent) = self[graph].parent {
            if let Some(p) = self.nodes[parent.index()].as_mut() {
                if p.child == Some(graph) {
                    p.child = None;
                }
            }
        }
        self.graph_list.retain(|&g| g != graph);
        if self.root == Some(graph) {
            self.root = None;
        }
        self.graphs[graph.index()] = None;
        self.reset_all_nodes();
        self.reset_all_edges();
    }

    /// Unlinks the child graph of `node` from the layout. The graph and its members stay alive
    /// and can be restored with [`Self::attach_child_graph`].
    pub fn detach_child_graph(&mut self, node: NodeId) -> Option<GraphId> {
        let child = self[node].child.take()?;
        let hidden = self.graph_subtree(child);
        self.graph_list.retain(|g| !hidden.contains(g));
        self.reset_all_nodes();
        self.reset_all_edges();
        self.gravitation_nodes = None;
        Some(child)
    }

    pub fn attach_child_graph(&mut self, node: NodeId, graph: GraphId) {
        assert!(
            self[node].child.is_none(),
            "node {node:?} already has a child graph"
        );
        self[graph].parent = Some(node);
        self[node].child = Some(graph);
        for g in self.graph_subtree(graph) {
            if !self.graph_list.contains(&g) {
                self.graph_list.push(g);
            }
        }
        self.reset_all_nodes();
        self.reset_all_edges();
    }

    /// `graph` followed by every graph nested below it.
    fn graph_subtree(&self, graph: GraphId) -> Vec<GraphId> {
        let mut out = vec![graph];
        for &n in &self[graph].nodes {
            if let Some(child) = self[n].child {
                out.extend(self.graph_subtree(child));
            }
        }
        out
    }

    /// Moves `node` (with its subtree) into `graph`, reclassifying its incident edges.
    pub fn move_node_to_graph(&mut self, node: NodeId, graph: GraphId) {
        let incident: Vec<EdgeId> = self[node]
            .edges
            .iter()
            .copied()
            .filter(|&e| self[e].is_attached())
            .collect();
        for &e in &incident {
            self.detach_edge(e);
        }
        if let Some(owner) = self[node].owner {
            self[owner].nodes.retain(|&x| x != node);
        }
        self[node].owner = Some(graph);
        self[graph].nodes.push(node);
        for e in incident {
            self.reattach_edge(e);
        }
        let depth = match self[graph].parent {
            None => u32::from(self.root == Some(graph)),
            Some(p) => match self[p].inclusion_tree_depth {
                0 => 0,
                d => d + 1,
            },
        };
        self.set_subtree_depth(node, depth);
        self.reset_all_nodes();
        self.gravitation_nodes = None;
    }

    /// Gives `node` the inclusion depth `depth` and its descendants the depths below it. A
    /// depth of `0` marks the subtree as not yet computed.
    fn set_subtree_depth(&mut self, node: NodeId, depth: u32) {
        self[node].inclusion_tree_depth = depth;
        if let Some(child) = self[node].child {
            let next = if depth == 0 { 0 } else { depth + 1 };
            for n in self[child].nodes.clone() {
                self.set_subtree_depth(n, next);
            }
        }
    }

    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index()).and_then(Option::as_mut)
    }

    pub fn get_edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.index()).and_then(Option::as_ref)
    }

    pub fn get_graph(&self, id: GraphId) -> Option<&Graph> {
        self.graphs.get(id.index()).and_then(Option::as_ref)
    }

    fn graph_is_live(&self, id: GraphId) -> bool {
        self.get_graph(id).is_some()
    }

    /// Upper bound (exclusive) of node indices ever issued; sizes per-node side tables.
    pub fn node_slots(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_slots(&self) -> usize {
        self.edges.len()
    }

    /// Graphs taking part in layout, root first.
    pub fn graphs(&self) -> &[GraphId] {
        &self.graph_list
    }

    pub fn inter_graph_edges(&self) -> &[EdgeId] {
        &self.inter_graph_edges
    }

    /// Every node of every listed graph, graph by graph.
    pub fn all_nodes(&self) -> Rc<[NodeId]> {
        if let Some(cached) = self.all_nodes.borrow().as_ref() {
            return Rc::clone(cached);
        }
        let list: Rc<[NodeId]> = self
            .graph_list
            .iter()
            .flat_map(|&g| self[g].nodes.iter().copied())
            .collect();
        *self.all_nodes.borrow_mut() = Some(Rc::clone(&list));
        list
    }

    /// Intra-graph edges of every listed graph followed by the inter-graph edges.
    pub fn all_edges(&self) -> Rc<[EdgeId]> {
        if let Some(cached) = self.all_edges.borrow().as_ref() {
            return Rc::clone(cached);
        }
        let list: Rc<[EdgeId]> = self
            .graph_list
            .iter()
            .flat_map(|&g| self[g].edges.iter().copied())
            .chain(self.inter_graph_edges.iter().copied())
            .collect();
        *self.all_edges.borrow_mut() = Some(Rc::clone(&list));
        list
    }

    pub fn reset_all_nodes(&mut self) {
        *self.all_nodes.get_mut() = None;
    }

    pub fn reset_all_edges(&mut self) {
        *self.all_edges.get_mut() = None;
    }

    pub fn all_nodes_to_apply_gravitation(&self) -> Rc<[NodeId]> {
        self.gravitation_nodes
            .as_ref()
            .map(Rc::clone)
            .unwrap_or_else(|| Rc::from(Vec::new()))
    }

    pub fn set_all_nodes_to_apply_gravitation(&mut self, nodes: Vec<NodeId>) {
        self.gravitation_nodes = Some(nodes.into());
    }

    pub fn reset_all_nodes_to_apply_gravitation(&mut self) {
        self.gravitation_nodes = None;
    }

    /// True when a listed edge lacks an endpoint or points at a node outside the layout.
    pub fn includes_invalid_edge(&self) -> bool {
        self.first_invalid_edge().is_some()
    }

    pub fn first_invalid_edge(&self) -> Option<EdgeId> {
        let live: rustc_hash::FxHashSet<NodeId> = self.all_nodes().iter().copied().collect();
        self.all_edges().iter().copied().find(|&e| {
            let edge = &self[e];
            match (edge.source, edge.target) {
                (Some(s), Some(t)) => !live.contains(&s) || !live.contains(&t),
                _ => true,
            }
        })
    }

    /// True when no member of the root graph is a compound node.
    pub fn is_flat(&self) -> bool {
        match self.root {
            Some(root) => self[root].nodes.iter().all(|&n| self[n].child.is_none()),
            None => true,
        }
    }

    pub fn cluster_manager(&self) -> &ClusterManager {
        &self.clusters
    }

    /// Checks every ownership relation. Inclusion depths are checked only once computed.
    pub fn validate(&self) -> Result<()> {
        let root = self.root.ok_or(ModelError::MissingRoot)?;
        for &g in &self.graph_list {
            let graph = &self[g];
            if let Some(parent) = graph.parent {
                if self[parent].child != Some(g) {
                    return Err(ModelError::ChildParentMismatch {
                        node: parent,
                        graph: g,
                    });
                }
            }
            for &n in &graph.nodes {
                let node = &self[n];
                if node.owner != Some(g) {
                    return Err(ModelError::NodeNotInOwner { node: n, graph: g });
                }
                if let Some(child) = node.child {
                    if self[child].parent != Some(n) {
                        return Err(ModelError::ChildParentMismatch { node: n, graph: child });
                    }
                }
                if node.inclusion_tree_depth != 0 {
                    let expected = match graph.parent {
                        None => 1,
                        Some(p) => self[p].inclusion_tree_depth + 1,
                    };
                    if g == root && node.inclusion_tree_depth != 1
                        || g != root && node.inclusion_tree_depth != expected
                    {
                        return Err(ModelError::InclusionDepth {
                            node: n,
                            depth: node.inclusion_tree_depth,
                            expected,
                        });
                    }
                }
            }
        }
        for &e in self.all_edges().iter() {
            let edge = &self[e];
            let (Some(s), Some(t)) = (edge.source, edge.target) else {
                return Err(ModelError::MissingEndpoint { edge: e });
            };
            let same_owner = self[s].owner == self[t].owner;
            match edge.placement {
                EdgePlacement::Graph(g) if !(same_owner && self[s].owner == Some(g)) => {
                    return Err(ModelError::EdgeClassification {
                        edge: e,
                        found: "intra-graph",
                    });
                }
                EdgePlacement::InterGraph if same_owner => {
                    return Err(ModelError::EdgeClassification {
                        edge: e,
                        found: "inter-graph",
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Index<NodeId> for GraphManager {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        match self.nodes.get(id.index()).and_then(Option::as_ref) {
            Some(n) => n,
            None => panic!("stale node id {id:?}"),
        }
    }
}

impl IndexMut<NodeId> for GraphManager {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id.index()).and_then(Option::as_mut) {
            Some(n) => n,
            None => panic!("stale node id {id:?}"),
        }
    }
}

impl Index<EdgeId> for GraphManager {
    type Output = Edge;

    fn index(&self, id: EdgeId) -> &Edge {
        match self.edges.get(id.index()).and_then(Option::as_ref) {
            Some(e) => e,
            None => panic!("stale edge id {id:?}"),
        }
    }
}

impl IndexMut<EdgeId> for GraphManager {
    fn index_mut(&mut self, id: EdgeId) -> &mut Edge {
        match self.edges.get_mut(id.index()).and_then(Option::as_mut) {
            Some(e) => e,
            None => panic!("stale edge id {id:?}"),
        }
    }
}

impl Index<GraphId> for GraphManager {
    type Output = Graph;

    fn index(&self, id: GraphId) -> &Graph {
        match self.graphs.get(id.index()).and_then(Option::as_ref) {
            Some(g) => g,
            None => panic!("stale graph id {id:?}"),
        }
    }
}

impl IndexMut<GraphId> for GraphManager {
    fn index_mut(&mut self, id: GraphId) -> &mut Graph {
        match self.graphs.get_mut(id.index()).and_then(Option::as_mut) {
            Some(g) => g,
            None => panic!("stale graph id {id:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn leaf(gm: &mut GraphManager, g: GraphId) -> NodeId {
        gm.add_node(g, Node::new(Rect::new(0.0, 0.0, 10.0, 10.0)))
    }

    #[test]
    fn edges_are_classified_by_owner() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = leaf(&mut gm, root);
        let b = leaf(&mut gm, root);
        let c = leaf(&mut gm, root);
        let child = gm.add_graph(c);
        let d = leaf(&mut gm, child);

        let ab = gm.add_edge(a, b, Edge::new());
        let ad = gm.add_edge(a, d, Edge::new());

        assert!(!gm[ab].is_inter_graph());
        assert_eq!(gm[ab].owner_graph(), Some(root));
        assert!(gm[ad].is_inter_graph());
        assert_eq!(gm.inter_graph_edges(), &[ad]);
        assert_eq!(gm[a].edges(), &[ab, ad]);
        assert_eq!(gm.all_edges().as_ref(), &[ab, ad]);
        gm.validate().unwrap();
    }

    #[test]
    fn removing_a_node_removes_incident_edges() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = leaf(&mut gm, root);
        let b = leaf(&mut gm, root);
        let c = leaf(&mut gm, root);
        let child = gm.add_graph(c);
        let d = leaf(&mut gm, child);
        gm.add_edge(a, b, Edge::new());
        gm.add_edge(b, d, Edge::new());

        gm.remove_node(b);
        assert!(gm[a].edges().is_empty());
        assert!(gm[d].edges().is_empty());
        assert!(gm.inter_graph_edges().is_empty());
        assert_eq!(gm.all_nodes().as_ref(), &[a, c, d]);

        gm.remove_node(c);
        assert!(gm.get_node(d).is_none());
        assert_eq!(gm.graphs(), &[root]);
        gm.validate().unwrap();
    }

    #[test]
    fn detached_edges_keep_their_record() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = leaf(&mut gm, root);
        let b = leaf(&mut gm, root);
        let e = gm.add_edge(a, b, Edge::new().with_label("ab"));

        gm.detach_edge(e);
        assert!(gm.all_edges().is_empty());
        assert!(gm[a].edges().is_empty());
        assert_eq!(gm[e].label.as_deref(), Some("ab"));

        gm.reattach_edge(e);
        assert_eq!(gm.all_edges().as_ref(), &[e]);
        assert_eq!(gm[b].edges(), &[e]);
    }

    #[test]
    fn moving_a_node_reclassifies_edges() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = leaf(&mut gm, root);
        let b = leaf(&mut gm, root);
        let c = leaf(&mut gm, root);
        let child = gm.add_graph(c);
        let e = gm.add_edge(a, b, Edge::new());

        gm.move_node_to_graph(b, child);
        assert!(gm[e].is_inter_graph());
        assert_eq!(gm[b].owner(), Some(child));

        gm.move_node_to_graph(b, root);
        assert_eq!(gm[e].owner_graph(), Some(root));
        gm.validate().unwrap();
    }

    #[test]
    fn moved_subtrees_take_the_depth_of_their_new_owner() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let outer = leaf(&mut gm, root);
        let outer_graph = gm.add_graph(outer);
        let c = leaf(&mut gm, outer_graph);
        let inner = gm.add_graph(c);
        let d = leaf(&mut gm, inner);
        gm.calc_inclusion_tree_depths();
        assert_eq!(gm[d].inclusion_tree_depth(), 3);

        gm.move_node_to_graph(c, root);
        assert_eq!(gm[c].inclusion_tree_depth(), 1);
        assert_eq!(gm[d].inclusion_tree_depth(), 2);
        gm.validate().unwrap();

        gm.move_node_to_graph(c, outer_graph);
        assert_eq!(gm[c].inclusion_tree_depth(), 2);
        assert_eq!(gm[d].inclusion_tree_depth(), 3);
        gm.validate().unwrap();
    }

    #[test]
    fn unconnected_edge_is_invalid() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = leaf(&mut gm, root);
        let b = leaf(&mut gm, root);
        let e = gm.add_unconnected_edge(root, Edge::new());
        assert!(gm.includes_invalid_edge());
        assert_eq!(gm.validate(), Err(ModelError::MissingEndpoint { edge: e }));

        gm.connect_edge(e, a, b);
        assert!(!gm.includes_invalid_edge());
    }

    #[test]
    fn detached_child_graph_leaves_layout() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let c = leaf(&mut gm, root);
        let child = gm.add_graph(c);
        let d = leaf(&mut gm, child);

        assert_eq!(gm.detach_child_graph(c), Some(child));
        assert_eq!(gm.all_nodes().as_ref(), &[c]);
        assert!(gm.get_node(d).is_some());

        gm.attach_child_graph(c, child);
        assert_eq!(gm.all_nodes().as_ref(), &[c, d]);
    }
}
