//! Node clusters and their convex-hull polygons.
//!
//! Cluster membership is a side relation of the compound graph: a node may belong to any number
//! of clusters, and adding a compound node to a cluster adds its whole subtree.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};
use crate::graph::{GraphManager, NodeId};

/// Cluster identifier. `0` is reserved for the "no cluster" cluster, which never gets a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(pub u32);

impl ClusterId {
    pub const NONE: ClusterId = ClusterId(0);
}

#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    pub label: String,
    nodes: IndexSet<NodeId>,
    polygon: Vec<Point>,
}

impl Cluster {
    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn nodes(&self) -> &IndexSet<NodeId> {
        &self.nodes
    }

    /// Convex hull of the members as of the last [`GraphManager::calculate_cluster_polygon`].
    pub fn polygon(&self) -> &[Point] {
        &self.polygon
    }
}

/// Something whose members can be grouped into clusters.
pub trait Clustered {
    fn add_to_cluster(&mut self, node: NodeId, cluster: ClusterId);
    fn remove_from_cluster(&mut self, node: NodeId, cluster: ClusterId);
    /// Enclosing member used when coordinates are parent-relative.
    fn cluster_parent(&self, node: NodeId) -> Option<NodeId>;
    fn cluster_rect(&self, node: NodeId) -> Rect;
    /// Whether [`Self::cluster_rect`] is relative to [`Self::cluster_parent`].
    fn relative_to_parent(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct ClusterManager {
    clusters: IndexMap<ClusterId, Cluster>,
    next_id: u32,
    polygon_used: bool,
}

impl Default for ClusterManager {
    fn default() -> Self {
        Self {
            clusters: IndexMap::new(),
            next_id: 1,
            polygon_used: false,
        }
    }
}

impl ClusterManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cluster with the next free identifier.
    pub fn create_cluster(&mut self, label: impl Into<String>) -> ClusterId {
        let id = self.allocate_id();
        self.insert(id, label.into());
        id
    }

    /// Creates a cluster with the requested identifier. A taken identifier is replaced by the
    /// next free one (with a warning); the identifier actually used is returned.
    pub fn create_cluster_with_id(&mut self, id: ClusterId, label: impl Into<String>) -> ClusterId {
        let id = if self.clusters.contains_key(&id) {
            let fresh = self.allocate_id();
            tracing::warn!(
                requested = id.0,
                assigned = fresh.0,
                "cluster id already in use; assigning a fresh one"
            );
            fresh
        } else {
            id
        };
        self.insert(id, label.into());
        id
    }

    fn allocate_id(&mut self) -> ClusterId {
        while self.clusters.contains_key(&ClusterId(self.next_id)) {
            self.next_id += 1;
        }
        let id = ClusterId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(&mut self, id: ClusterId, label: String) {
        self.clusters.insert(
            id,
            Cluster {
                id,
                label,
                nodes: IndexSet::new(),
                polygon: Vec::new(),
            },
        );
    }

    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    pub fn is_cluster_id_used(&self, id: ClusterId) -> bool {
        self.clusters.contains_key(&id)
    }

    /// Positive cluster identifiers, ascending.
    pub fn cluster_ids(&self) -> Vec<ClusterId> {
        let mut ids: Vec<ClusterId> = self
            .clusters
            .keys()
            .copied()
            .filter(|id| id.0 > 0)
            .collect();
        ids.sort();
        ids
    }

    /// Removes a cluster that has no members left. Use [`GraphManager::delete_cluster`] to
    /// drop a populated one.
    pub fn remove_cluster(&mut self, id: ClusterId) -> Option<Cluster> {
        match self.clusters.get(&id) {
            Some(c) if c.nodes.is_empty() => self.clusters.shift_remove(&id),
            _ => None,
        }
    }

    pub fn polygon_used(&self) -> bool {
        self.polygon_used
    }

    pub fn set_polygon_used(&mut self, used: bool) {
        self.polygon_used = used;
    }

    pub(crate) fn link(&mut self, id: ClusterId, node: NodeId) {
        if let Some(c) = self.clusters.get_mut(&id) {
            c.nodes.insert(node);
        }
    }

    pub(crate) fn unlink(&mut self, id: ClusterId, node: NodeId) {
        if let Some(c) = self.clusters.get_mut(&id) {
            c.nodes.shift_remove(&node);
        }
    }
}

/// Convex hull of the corners of every member rectangle (monotone chain). Fewer than three
/// corner points yield an empty hull.
pub fn convex_hull<C: Clustered + ?Sized>(model: &C, members: &IndexSet<NodeId>) -> Vec<Point> {
    let mut points: Vec<Point> = Vec::with_capacity(members.len() * 4);
    for &n in members {
        let mut rect = model.cluster_rect(n);
        if model.relative_to_parent() {
            let mut parent = model.cluster_parent(n);
            while let Some(p) = parent {
                let pr = model.cluster_rect(p);
                rect.x += pr.x;
                rect.y += pr.y;
                parent = model.cluster_parent(p);
            }
        }
        points.extend(rect.corners());
    }
    if points.len() < 3 {
        return Vec::new();
    }

    // x ascending, ties broken by y descending.
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(b.y.total_cmp(&a.y)));
    points.dedup();

    let half = |iter: &mut dyn Iterator<Item = Point>| {
        let mut hull: Vec<Point> = Vec::new();
        for p in iter {
            while hull.len() >= 2 && !right_turn(hull[hull.len() - 2], hull[hull.len() - 1], p) {
                hull.pop();
            }
            hull.push(p);
        }
        hull
    };

    let mut upper = half(&mut points.iter().copied());
    let mut lower = half(&mut points.iter().rev().copied());
    upper.pop();
    lower.pop();
    upper.extend(lower);
    upper
}

/// Turn test in a y-up frame (screen y is inverted).
fn right_turn(p1: Point, p2: Point, p3: Point) -> bool {
    let x1 = p2.x - p1.x;
    let y1 = -(p2.y - p1.y);
    let x2 = p3.x - p2.x;
    let y2 = -(p3.y - p2.y);
    x1 * y2 - y1 * x2 < 0.0
}

impl Clustered for GraphManager {
    fn add_to_cluster(&mut self, node: NodeId, cluster: ClusterId) {
        if !self.clusters.is_cluster_id_used(cluster) {
            self.clusters
                .create_cluster_with_id(cluster, format!("Cluster {}", cluster.0));
        }
        if self[node].clusters.contains(&cluster) {
            return;
        }
        self[node].clusters.push(cluster);
        self.clusters.link(cluster, node);
        if let Some(child) = self[node].child() {
            for n in self[child].nodes().to_vec() {
                self.add_to_cluster(n, cluster);
            }
        }
    }

    fn remove_from_cluster(&mut self, node: NodeId, cluster: ClusterId) {
        if !self[node].clusters.contains(&cluster) {
            return;
        }
        self[node].clusters.retain(|&c| c != cluster);
        self.clusters.unlink(cluster, node);
        if let Some(child) = self[node].child() {
            for n in self[child].nodes().to_vec() {
                self.remove_from_cluster(n, cluster);
            }
        }
    }

    fn cluster_parent(&self, node: NodeId) -> Option<NodeId> {
        self[node].owner().and_then(|g| self[g].parent())
    }

    fn cluster_rect(&self, node: NodeId) -> Rect {
        self[node].rect
    }
}

impl GraphManager {
    pub fn cluster_manager_mut(&mut self) -> &mut ClusterManager {
        &mut self.clusters
    }

    /// Adds `node` (and its subtree) to cluster `id`, creating the cluster when missing.
    pub fn add_node_to_cluster(&mut self, node: NodeId, id: ClusterId) {
        self.add_to_cluster(node, id);
    }

    pub fn remove_node_from_cluster(&mut self, node: NodeId, id: ClusterId) {
        self.remove_from_cluster(node, id);
    }

    pub fn belongs_to_cluster(&self, node: NodeId, id: ClusterId) -> bool {
        self[node].clusters.contains(&id)
    }

    /// First cluster `node` was added to, if any.
    pub fn cluster_id(&self, node: NodeId) -> Option<ClusterId> {
        self[node].clusters.first().copied()
    }

    /// Drops every cluster membership of `node`.
    pub fn reset_clusters(&mut self, node: NodeId) {
        let ids = std::mem::take(&mut self[node].clusters);
        for id in ids {
            self.clusters.unlink(id, node);
        }
    }

    /// Removes a cluster and all memberships in it.
    pub fn delete_cluster(&mut self, id: ClusterId) {
        let Some(cluster) = self.clusters.clusters.shift_remove(&id) else {
            return;
        };
        for n in cluster.nodes {
            if let Some(node) = self.get_node_mut(n) {
                node.clusters.retain(|&c| c != id);
            }
        }
    }

    pub fn clear_clusters(&mut self) {
        for id in self.clusters.clusters.keys().copied().collect::<Vec<_>>() {
            self.delete_cluster(id);
        }
    }

    /// Recomputes the polygon of cluster `id`. The reserved cluster `0` is skipped.
    pub fn calculate_cluster_polygon(&mut self, id: ClusterId) {
        if id == ClusterId::NONE {
            return;
        }
        let Some(cluster) = self.clusters.cluster(id) else {
            return;
        };
        let hull = convex_hull(self, &cluster.nodes);
        if let Some(c) = self.clusters.clusters.get_mut(&id) {
            c.polygon = hull;
        }
    }

    pub fn calculate_cluster_polygons(&mut self) {
        for id in self.clusters.cluster_ids() {
            self.calculate_cluster_polygon(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Node;

    #[test]
    fn colliding_id_is_reassigned() {
        let mut cm = ClusterManager::new();
        let a = cm.create_cluster("a");
        assert_eq!(a, ClusterId(1));
        let b = cm.create_cluster_with_id(ClusterId(1), "b");
        assert_eq!(b, ClusterId(2));
        cm.create_cluster_with_id(ClusterId::NONE, "none");
        assert_eq!(cm.cluster_ids(), vec![ClusterId(1), ClusterId(2)]);
    }

    #[test]
    fn compound_membership_is_recursive() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let c = gm.add_node(root, Node::sized(10.0, 10.0));
        let inner = gm.add_graph(c);
        let d = gm.add_node(inner, Node::sized(10.0, 10.0));

        gm.add_node_to_cluster(c, ClusterId(7));
        assert_eq!(gm[d].clusters(), &[ClusterId(7)]);
        let members = gm.cluster_manager().cluster(ClusterId(7)).unwrap().nodes().len();
        assert_eq!(members, 2);

        gm.remove_node_from_cluster(c, ClusterId(7));
        assert!(gm[d].clusters().is_empty());
    }

    #[test]
    fn polygon_is_the_hull_of_member_corners() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = gm.add_node(root, Node::new(Rect::new(0.0, 0.0, 10.0, 10.0)));
        let b = gm.add_node(root, Node::new(Rect::new(20.0, 20.0, 10.0, 10.0)));
        gm.add_node_to_cluster(a, ClusterId(1));
        gm.add_node_to_cluster(b, ClusterId(1));
        gm.calculate_cluster_polygon(ClusterId(1));

        let polygon = gm.cluster_manager().cluster(ClusterId(1)).unwrap().polygon();
        assert_eq!(polygon.len(), 6);
        for corner in [Point::new(0.0, 0.0), Point::new(30.0, 30.0), Point::new(10.0, 0.0)] {
            assert!(polygon.contains(&corner), "missing {corner:?}");
        }
        assert!(!polygon.contains(&Point::new(10.0, 10.0)));
    }

    #[test]
    fn deleting_a_cluster_clears_memberships() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let a = gm.add_node(root, Node::sized(10.0, 10.0));
        gm.add_node_to_cluster(a, ClusterId(3));
        gm.delete_cluster(ClusterId(3));
        assert!(gm[a].clusters().is_empty());
        assert!(gm.cluster_manager().cluster_ids().is_empty());
    }
}
