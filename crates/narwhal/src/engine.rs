//! Compound spring embedder shared by every layout variant.

use indexmap::IndexMap;
use narwhal_graph::geometry::{clipping_points, separation_amount, sign};
use narwhal_graph::{EdgeId, GraphManager, NodeId, Point, Transform};

use crate::constants::{
    CONVERGENCE_CHECK_PERIOD, DEFAULT_COMPOUND_GRAVITY_RANGE_FACTOR,
    DEFAULT_COMPOUND_GRAVITY_STRENGTH, DEFAULT_COOLING_FACTOR_INCREMENTAL, DEFAULT_EDGE_LENGTH,
    DEFAULT_GRAVITY_RANGE_FACTOR, DEFAULT_GRAVITY_STRENGTH, DEFAULT_REPULSION_STRENGTH,
    DEFAULT_SPRING_STRENGTH, DISPLACEMENT_THRESHOLD_PER_NODE, DRAFT_ITERATION_FACTOR,
    DRAFT_THRESHOLD_DELTA, DEFAULT_ANIMATION_PERIOD, GRID_CALCULATION_CHECK_PERIOD,
    MAX_ITERATIONS, MAX_NODE_DISPLACEMENT, MAX_NODE_DISPLACEMENT_INCREMENTAL,
    MIN_REPULSION_DIST, PER_LEVEL_IDEAL_EDGE_LENGTH_FACTOR, PROOF_ITERATION_FACTOR,
    PROOF_THRESHOLD_DELTA, SIMPLE_NODE_SIZE,
};
use crate::error::{Error, Result};
use crate::grid::RepulsionGrid;
use crate::options::{LayoutOptions, Quality, transform_slider, transform_slider_bounded};
use crate::policy::LayoutPolicy;
use crate::random::LayoutRng;

/// Per-node simulation state, indexed by node slot.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeState {
    pub spring_fx: f64,
    pub spring_fy: f64,
    pub repulsion_fx: f64,
    pub repulsion_fy: f64,
    pub gravitation_fx: f64,
    pub gravitation_fy: f64,
    pub displacement_x: f64,
    pub displacement_y: f64,
    pub surrounding: Vec<NodeId>,
    pub no_of_children: f64,
}

impl NodeState {
    fn reset_forces(&mut self) {
        self.spring_fx = 0.0;
        self.spring_fy = 0.0;
        self.repulsion_fx = 0.0;
        self.repulsion_fy = 0.0;
        self.gravitation_fx = 0.0;
        self.gravitation_fy = 0.0;
        self.displacement_x = 0.0;
        self.displacement_y = 0.0;
    }

    fn total_force(&self) -> (f64, f64) {
        (
            self.spring_fx + self.repulsion_fx + self.gravitation_fx,
            self.spring_fy + self.repulsion_fy + self.gravitation_fy,
        )
    }
}

type AnimationHook = Box<dyn FnMut(&GraphManager)>;

pub struct Engine {
    pub(crate) gm: GraphManager,
    pub(crate) options: LayoutOptions,

    pub(crate) ideal_edge_length: f64,
    pub(crate) spring_constant: f64,
    pub(crate) repulsion_constant: f64,
    pub(crate) gravity_constant: f64,
    pub(crate) compound_gravity_constant: f64,
    pub(crate) gravity_range_factor: f64,
    pub(crate) compound_gravity_range_factor: f64,
    animation_period: usize,
    pub(crate) animation_on_layout: bool,

    pub(crate) cooling_factor: f64,
    pub(crate) initial_cooling_factor: f64,
    pub(crate) max_node_displacement: f64,
    pub(crate) max_iterations: usize,
    pub(crate) total_iterations: usize,
    not_animated_iterations: usize,
    pub(crate) total_displacement: f64,
    old_total_displacement: f64,
    displacement_threshold_per_node: f64,
    total_displacement_threshold: f64,
    pub(crate) converged: bool,

    pub(crate) repulsion_range: f64,
    pub(crate) level: usize,
    pub(crate) no_of_levels: usize,
    grid: Option<RepulsionGrid>,
    pub(crate) state: Vec<NodeState>,
    pub(crate) ideal_lengths: Vec<f64>,
    pub(crate) rng: LayoutRng,
    pub(crate) edge_to_dummy_nodes: IndexMap<EdgeId, Vec<NodeId>>,
    animation: Option<AnimationHook>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("options", &self.options)
            .field("total_iterations", &self.total_iterations)
            .field("cooling_factor", &self.cooling_factor)
            .finish_non_exhaustive()
    }
}

impl Engine {
    pub fn new(gm: GraphManager, options: LayoutOptions) -> Self {
        let rng = LayoutRng::from_options(&options);
        Self {
            gm,
            options,
            ideal_edge_length: DEFAULT_EDGE_LENGTH,
            spring_constant: DEFAULT_SPRING_STRENGTH,
            repulsion_constant: DEFAULT_REPULSION_STRENGTH,
            gravity_constant: DEFAULT_GRAVITY_STRENGTH,
            compound_gravity_constant: DEFAULT_COMPOUND_GRAVITY_STRENGTH,
            gravity_range_factor: DEFAULT_GRAVITY_RANGE_FACTOR,
            compound_gravity_range_factor: DEFAULT_COMPOUND_GRAVITY_RANGE_FACTOR,
            animation_period: DEFAULT_ANIMATION_PERIOD as usize,
            animation_on_layout: true,
            cooling_factor: 1.0,
            initial_cooling_factor: 1.0,
            max_node_displacement: MAX_NODE_DISPLACEMENT,
            max_iterations: MAX_ITERATIONS,
            total_iterations: 0,
            not_animated_iterations: 0,
            total_displacement: 0.0,
            old_total_displacement: 0.0,
            displacement_threshold_per_node: DISPLACEMENT_THRESHOLD_PER_NODE,
            total_displacement_threshold: 0.0,
            converged: false,
            repulsion_range: 2.0 * DEFAULT_EDGE_LENGTH,
            level: 0,
            no_of_levels: 0,
            grid: None,
            state: Vec::new(),
            ideal_lengths: Vec::new(),
            rng,
            edge_to_dummy_nodes: IndexMap::new(),
            animation: None,
        }
    }

    pub fn graph(&self) -> &GraphManager {
        &self.gm
    }

    pub fn graph_mut(&mut self) -> &mut GraphManager {
        &mut self.gm
    }

    pub(crate) fn into_graph(self) -> GraphManager {
        self.gm
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn total_iterations(&self) -> usize {
        self.total_iterations
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn cooling_factor(&self) -> f64 {
        self.cooling_factor
    }

    /// Whether the final view update should be animated by the caller.
    pub fn animation_on_layout(&self) -> bool {
        self.animation_on_layout
    }

    /// Effective ideal edge length after option clamping.
    pub fn ideal_edge_length(&self) -> f64 {
        self.ideal_edge_length
    }

    pub fn spring_constant(&self) -> f64 {
        self.spring_constant
    }

    pub fn repulsion_constant(&self) -> f64 {
        self.repulsion_constant
    }

    pub fn gravity_constant(&self) -> f64 {
        self.gravity_constant
    }

    /// Ideal length of `edge` as computed for the current run.
    pub fn ideal_length(&self, edge: EdgeId) -> f64 {
        self.ideal_lengths
            .get(edge.index())
            .copied()
            .unwrap_or(self.ideal_edge_length)
    }

    /// Sum of the spring, repulsion and gravitation forces accumulated on `node` so far in this
    /// iteration.
    pub fn force(&self, node: NodeId) -> (f64, f64) {
        self.state
            .get(node.index())
            .map(NodeState::total_force)
            .unwrap_or_default()
    }

    /// Adds an external force to `node` for the current iteration.
    pub fn add_force(&mut self, node: NodeId, fx: f64, fy: f64) {
        self.ensure_state();
        let st = &mut self.state[node.index()];
        st.spring_fx += fx;
        st.spring_fy += fy;
    }

    /// Displacement applied to `node` by the last move.
    pub fn displacement(&self, node: NodeId) -> (f64, f64) {
        self.state
            .get(node.index())
            .map(|st| (st.displacement_x, st.displacement_y))
            .unwrap_or_default()
    }

    pub fn reset_forces(&mut self, node: NodeId) {
        if let Some(st) = self.state.get_mut(node.index()) {
            st.reset_forces();
        }
    }

    pub fn rng(&mut self) -> &mut LayoutRng {
        &mut self.rng
    }

    /// Installs a callback invoked every animation period while the embedder runs, when
    /// `animation_during_layout` is set.
    pub fn set_animation_hook(&mut self, hook: impl FnMut(&GraphManager) + 'static) {
        self.animation = Some(Box::new(hook));
    }

    /// Derives the simulation constants from the options and resets run counters.
    pub(crate) fn init_parameters(&mut self) {
        let o = &self.options;
        self.ideal_edge_length = if o.ideal_edge_length < 10.0 || o.ideal_edge_length.is_nan() {
            10.0
        } else {
            o.ideal_edge_length
        };
        self.spring_constant =
            transform_slider_bounded(o.spring_strength, DEFAULT_SPRING_STRENGTH, 5.0, 5.0);
        self.repulsion_constant =
            transform_slider_bounded(o.repulsion_strength, DEFAULT_REPULSION_STRENGTH, 5.0, 5.0);
        self.gravity_constant = transform_slider(o.gravity_strength, DEFAULT_GRAVITY_STRENGTH);
        self.compound_gravity_constant = transform_slider(
            o.compound_gravity_strength,
            DEFAULT_COMPOUND_GRAVITY_STRENGTH,
        );
        self.gravity_range_factor = transform_slider(o.gravity_range, DEFAULT_GRAVITY_RANGE_FACTOR);
        self.compound_gravity_range_factor = transform_slider(
            o.compound_gravity_range,
            DEFAULT_COMPOUND_GRAVITY_RANGE_FACTOR,
        );
        self.animation_period =
            transform_slider(o.animation_period, DEFAULT_ANIMATION_PERIOD).round() as usize;
        self.animation_on_layout = o.animation_on_layout && !o.animation_during_layout;

        self.displacement_threshold_per_node = DISPLACEMENT_THRESHOLD_PER_NODE;
        self.max_iterations = MAX_ITERATIONS;
        match o.layout_quality {
            Quality::Draft => {
                self.displacement_threshold_per_node += DRAFT_THRESHOLD_DELTA;
                self.max_iterations = (self.max_iterations as f64 * DRAFT_ITERATION_FACTOR) as usize;
            }
            Quality::Proof => {
                self.displacement_threshold_per_node += PROOF_THRESHOLD_DELTA;
                self.max_iterations = (self.max_iterations as f64 * PROOF_ITERATION_FACTOR) as usize;
            }
            Quality::Default => {}
        }

        self.total_iterations = 0;
        self.not_animated_iterations = 0;
        self.converged = false;
        self.level = 0;
        self.no_of_levels = 0;
        self.rng = LayoutRng::from_options(o);
    }

    /// Rejects models the driver cannot lay out.
    pub(crate) fn check_model(&self) -> Result<()> {
        let root = self.gm.root().ok_or(Error::MissingRoot)?;
        if self.gm[root].nodes().is_empty() {
            return Err(Error::EmptyGraph);
        }
        if let Some(edge) = self.gm.first_invalid_edge() {
            return Err(Error::InvalidEdge { edge });
        }
        Ok(())
    }

    /// Topology preprocessing, bend points, the embedder run and postprocessing.
    pub(crate) fn layout<P: LayoutPolicy + ?Sized>(&mut self, policy: &mut P) {
        policy.pre_process_topology(self);

        if self.options.create_bends_as_needed {
            self.create_bendpoints();
        }
        self.substitute_bendpoints();

        if self.options.use_multi_level_scaling
            && !self.options.incremental
            && policy.supports_multi_level()
            && self.gm.is_flat()
        {
            self.multi_level_scaling_layout(policy);
        } else {
            self.level = 0;
            self.classic_layout(policy);
        }

        policy.post_process_topology(self);
    }

    pub(crate) fn classic_layout<P: LayoutPolicy + ?Sized>(&mut self, policy: &mut P) {
        self.prepare_topology();

        if !self.options.incremental {
            policy.initial_placement(self);
        }
        if policy.before_spring_embedder(self) {
            self.prepare_topology();
        }

        self.init_spring_embedder();
        policy.run_spring_embedder(self);
    }

    /// Recomputes every derived quantity the embedder reads.
    pub(crate) fn prepare_topology(&mut self) {
        self.calculate_nodes_to_apply_gravitation_to();
        self.gm.calc_lowest_common_ancestors();
        self.gm.calc_inclusion_tree_depths();
        if let Some(root) = self.gm.root() {
            self.gm.calc_estimated_size(root);
        }
        self.calc_ideal_edge_lengths();
    }

    /// Nodes of disconnected graphs get gravity so their components do not drift apart.
    pub(crate) fn calculate_nodes_to_apply_gravitation_to(&mut self) {
        let mut nodes = Vec::new();
        for g in self.gm.graphs().to_vec() {
            self.gm.update_connected(g);
            if !self.gm[g].is_connected() {
                nodes.extend_from_slice(self.gm[g].nodes());
            }
        }
        self.gm.set_all_nodes_to_apply_gravitation(nodes);
    }

    pub(crate) fn calc_ideal_edge_lengths(&mut self) {
        let base = self.ideal_edge_length;
        self.ideal_lengths = vec![base; self.gm.edge_slots()];

        for &e in self.gm.all_edges().iter() {
            let edge = &self.gm[e];
            if !edge.is_inter_graph() {
                continue;
            }
            let (Some(source), Some(target)) = (edge.source(), edge.target()) else {
                continue;
            };
            let mut ideal = base;
            if self.options.smart_edge_length_calc {
                if let (Some(s), Some(t)) = (edge.source_in_lca(), edge.target_in_lca()) {
                    ideal += self.gm[s].estimated_size() + self.gm[t].estimated_size()
                        - 2.0 * SIMPLE_NODE_SIZE;
                }
            }
            let lca_depth = edge.lca().map(|g| self.gm.graph_depth(g) + 1).unwrap_or(1);
            let nesting = f64::from(self.gm[source].inclusion_tree_depth())
                + f64::from(self.gm[target].inclusion_tree_depth())
                - 2.0 * f64::from(lca_depth);
            ideal += DEFAULT_EDGE_LENGTH * PER_LEVEL_IDEAL_EDGE_LENGTH_FACTOR * nesting;
            self.ideal_lengths[e.index()] = ideal;
        }
    }

    pub(crate) fn init_spring_embedder(&mut self) {
        if self.options.incremental {
            self.cooling_factor = DEFAULT_COOLING_FACTOR_INCREMENTAL;
            self.max_node_displacement = MAX_NODE_DISPLACEMENT_INCREMENTAL;
        } else {
            self.cooling_factor = 1.0;
            self.max_node_displacement = MAX_NODE_DISPLACEMENT;
        }
        self.initial_cooling_factor = self.cooling_factor;

        let node_count = self.gm.all_nodes().len();
        self.max_iterations = self.max_iterations.max(node_count * 5);
        self.total_displacement_threshold = self.displacement_threshold_per_node * node_count as f64;
        self.repulsion_range = 2.0 * (self.level as f64 + 1.0) * self.ideal_edge_length;
        self.old_total_displacement = 0.0;
        self.grid = None;
        self.reset_state();
    }

    /// Clears per-node state and recomputes leaf counts; call after structural changes.
    pub(crate) fn reset_state(&mut self) {
        self.state = vec![NodeState::default(); self.gm.node_slots()];
        for &n in self.gm.all_nodes().iter() {
            self.state[n.index()].no_of_children = self.gm.no_of_children(n) as f64;
        }
    }

    fn ensure_state(&mut self) {
        if self.state.len() < self.gm.node_slots() {
            self.state.resize_with(self.gm.node_slots(), NodeState::default);
        }
    }

    pub fn run_spring_embedder<P: LayoutPolicy + ?Sized>(&mut self, policy: &mut P) {
        loop {
            self.total_iterations += 1;

            if self.total_iterations % CONVERGENCE_CHECK_PERIOD == 0 {
                if self.is_converged() {
                    self.converged = true;
                    break;
                }
                self.cooling_factor = self.initial_cooling_factor
                    * ((self.max_iterations as f64 - self.total_iterations as f64)
                        / self.max_iterations as f64);
            }

            self.step(policy);

            if self.total_iterations >= self.max_iterations {
                break;
            }
        }
        self.gm.update_bounds();
        tracing::debug!(
            iterations = self.total_iterations,
            converged = self.converged,
            displacement = self.total_displacement,
            "spring embedder finished"
        );
    }

    /// One iteration: forces, policy forces, movement and animation.
    pub(crate) fn step<P: LayoutPolicy + ?Sized>(&mut self, policy: &mut P) {
        self.total_displacement = 0.0;
        self.gm.update_bounds();
        self.ensure_state();

        self.calc_spring_forces(policy);
        self.calc_repulsion_forces(policy);
        self.calc_gravitational_forces();
        policy.compute_extra_forces(self);
        self.move_nodes();
        policy.after_move(self);
        self.animate();
    }

    fn calc_spring_forces<P: LayoutPolicy + ?Sized>(&mut self, policy: &P) {
        for &e in self.gm.all_edges().iter() {
            if policy.spring_applies(&self.gm, e) {
                self.calc_spring_force(e);
            }
        }
    }

    fn calc_spring_force(&mut self, edge: EdgeId) {
        let (Some(source), Some(target)) = (self.gm[edge].source(), self.gm[edge].target()) else {
            return;
        };
        let Some((mut lx, mut ly)) = self.separation_vector(source, target) else {
            return;
        };
        if lx.abs() < 1.0 {
            lx = sign(lx);
        }
        if ly.abs() < 1.0 {
            ly = sign(ly);
        }
        let length = (lx * lx + ly * ly).sqrt();
        if length == 0.0 {
            return;
        }

        let force = self.spring_constant * (length - self.ideal_length(edge));
        let fx = force * (lx / length);
        let fy = force * (ly / length);

        let s = &mut self.state[source.index()];
        s.spring_fx += fx;
        s.spring_fy += fy;
        let t = &mut self.state[target.index()];
        t.spring_fx -= fx;
        t.spring_fy -= fy;
    }

    /// Vector from `a` to `b`: between centers for two uniform leaves, between the clipped
    /// boundary points otherwise. `None` when the rectangles overlap.
    fn separation_vector(&self, a: NodeId, b: NodeId) -> Option<(f64, f64)> {
        let (na, nb) = (&self.gm[a], &self.gm[b]);
        if self.options.uniform_leaf_node_sizes && na.child().is_none() && nb.child().is_none() {
            if na.rect.intersects(&nb.rect) {
                return None;
            }
            return Some((nb.center_x() - na.center_x(), nb.center_y() - na.center_y()));
        }
        let (pa, pb) = clipping_points(&na.rect, &nb.rect)?;
        Some((pb.x - pa.x, pb.y - pa.y))
    }

    fn calc_repulsion_forces<P: LayoutPolicy + ?Sized>(&mut self, policy: &P) {
        let nodes = self.gm.all_nodes();
        let refresh = self.total_iterations % GRID_CALCULATION_CHECK_PERIOD == 1;
        if refresh {
            self.grid = RepulsionGrid::build(&self.gm, &nodes, self.repulsion_range);
        }

        let mut processed = vec![false; self.gm.node_slots()];
        for &a in nodes.iter() {
            if refresh {
                let surrounding = match &self.grid {
                    Some(grid) => {
                        let span = grid.span(&self.gm[a].rect);
                        let owner = self.gm[a].owner();
                        let gm = &self.gm;
                        grid.surrounding(gm, a, span, |b| {
                            processed[b.index()]
                                || gm[b].owner() != owner
                                || !policy.repulsion_applies(gm, a, b)
                        })
                    }
                    None => Vec::new(),
                };
                self.state[a.index()].surrounding = surrounding;
            }

            let surrounding = std::mem::take(&mut self.state[a.index()].surrounding);
            for &b in &surrounding {
                self.calc_repulsion_force(a, b);
            }
            self.state[a.index()].surrounding = surrounding;
            processed[a.index()] = true;
        }
    }

    fn calc_repulsion_force(&mut self, a: NodeId, b: NodeId) {
        let (ra, rb) = (self.gm[a].rect, self.gm[b].rect);
        let ca = self.state[a.index()].no_of_children;
        let cb = self.state[b.index()].no_of_children;

        let (fx, fy) = if ra.intersects(&rb) {
            let (sx, sy) = separation_amount(&ra, &rb, DEFAULT_EDGE_LENGTH / 2.0);
            let k = ca * cb / (ca + cb);
            (2.0 * k * sx, 2.0 * k * sy)
        } else {
            let Some((mut dx, mut dy)) = self.separation_vector(a, b) else {
                return;
            };
            if dx.abs() < MIN_REPULSION_DIST {
                dx = sign(dx) * MIN_REPULSION_DIST;
            }
            if dy.abs() < MIN_REPULSION_DIST {
                dy = sign(dy) * MIN_REPULSION_DIST;
            }
            let dist_sq = dx * dx + dy * dy;
            if dist_sq == 0.0 {
                return;
            }
            let dist = dist_sq.sqrt();
            let force = self.repulsion_constant * ca * cb / dist_sq;
            (-force * dx / dist, -force * dy / dist)
        };

        let sa = &mut self.state[a.index()];
        sa.repulsion_fx += fx;
        sa.repulsion_fy += fy;
        let sb = &mut self.state[b.index()];
        sb.repulsion_fx -= fx;
        sb.repulsion_fy -= fy;
    }

    fn calc_gravitational_forces(&mut self) {
        let Some(root) = self.gm.root() else {
            return;
        };
        for &n in self.gm.all_nodes_to_apply_gravitation().iter() {
            let Some(owner) = self.gm[n].owner() else {
                continue;
            };
            let node = &self.gm[n];
            let graph = &self.gm[owner];
            let center = graph.center();
            let dx = node.center_x() - center.x;
            let dy = node.center_y() - center.y;
            let abs_dx = dx.abs() + node.width() / 2.0;
            let abs_dy = dy.abs() + node.height() / 2.0;

            let (gx, gy) = if owner == root {
                let range = graph.estimated_size() * self.gravity_range_factor;
                if abs_dx > range || abs_dy > range {
                    (-self.gravity_constant * dx, -self.gravity_constant * dy)
                } else {
                    continue;
                }
            } else {
                let range = graph.estimated_size() * self.compound_gravity_range_factor;
                if abs_dx > range || abs_dy > range {
                    let k = self.gravity_constant * self.compound_gravity_constant;
                    (-k * dx, -k * dy)
                } else {
                    continue;
                }
            };
            let st = &mut self.state[n.index()];
            st.gravitation_fx = gx;
            st.gravitation_fy = gy;
        }
    }

    /// Turns accumulated forces into capped displacements. Non-empty compound nodes pass their
    /// displacement down to the nodes they contain.
    fn move_nodes(&mut self) {
        let limit = self.cooling_factor * self.max_node_displacement;
        for &n in self.gm.all_nodes().iter() {
            let st = &mut self.state[n.index()];
            let (fx, fy) = st.total_force();
            let mut dx = self.cooling_factor * fx / st.no_of_children;
            let mut dy = self.cooling_factor * fy / st.no_of_children;
            if dx.abs() > limit {
                dx = limit * sign(dx);
            }
            if dy.abs() > limit {
                dy = limit * sign(dy);
            }
            st.reset_forces();
            st.displacement_x = dx;
            st.displacement_y = dy;

            match self.gm[n].child() {
                Some(child) if !self.gm[child].nodes().is_empty() => {
                    self.propagate_displacement(child, dx, dy);
                }
                _ => self.gm[n].move_by(dx, dy),
            }
            self.total_displacement += dx.abs() + dy.abs();
        }
    }

    fn propagate_displacement(&mut self, graph: narwhal_graph::GraphId, dx: f64, dy: f64) {
        for n in self.gm[graph].nodes().to_vec() {
            match self.gm[n].child() {
                Some(child) if !self.gm[child].nodes().is_empty() => {
                    self.propagate_displacement(child, dx, dy);
                }
                _ => {
                    self.gm[n].move_by(dx, dy);
                    let st = &mut self.state[n.index()];
                    st.displacement_x += dx;
                    st.displacement_y += dy;
                }
            }
        }
    }

    /// Displacement-based convergence, also stopping once the total displacement stalls.
    pub(crate) fn is_converged(&mut self) -> bool {
        let oscillating = self.total_iterations > self.max_iterations / 3
            && (self.total_displacement - self.old_total_displacement).abs() < 2.0;
        let converged = self.total_displacement < self.total_displacement_threshold;
        self.old_total_displacement = self.total_displacement;
        converged || oscillating
    }

    fn animate(&mut self) {
        if !self.options.animation_during_layout {
            return;
        }
        if self.not_animated_iterations == self.animation_period {
            if let Some(hook) = self.animation.as_mut() {
                hook(&self.gm);
            }
            self.not_animated_iterations = 0;
        } else {
            self.not_animated_iterations += 1;
        }
    }

    /// Places the default initial layout: radial when the root is a forest, random otherwise.
    pub fn default_initial_placement(&mut self) {
        let forest = crate::forest::flat_forest(&self.gm);
        if forest.is_empty() {
            self.position_nodes_randomly();
        } else {
            self.position_nodes_radially(&forest);
        }
    }

    /// Translates every node so the root graph's top-left corner lands on `new_left_top`.
    pub(crate) fn transform_to(&mut self, new_left_top: Point) {
        let Some(root) = self.gm.root() else {
            return;
        };
        let Some(left_top) = self.gm.update_left_top(root) else {
            return;
        };
        let trans = Transform::translation(new_left_top, left_top);
        for &n in self.gm.all_nodes().iter() {
            self.gm[n].transform(&trans);
        }
    }

    /// Restores substituted edges and hands final geometry to updatable view objects: edges
    /// first, then nodes (children before their parent), then the root graph.
    pub(crate) fn update_views(&mut self) {
        self.create_bendpoints_from_dummy_nodes();
        self.gm.update_bounds();

        for &e in self.gm.all_edges().iter() {
            let edge = &self.gm[e];
            if let Some(view) = &edge.view {
                view.with_updatable(|u| u.update_edge(edge));
            }
        }
        if let Some(root) = self.gm.root() {
            for n in self.gm[root].nodes().to_vec() {
                self.update_node_view(n);
            }
            let graph = &self.gm[root];
            if let Some(view) = &graph.view {
                view.with_updatable(|u| u.update_graph(graph));
            }
        }
    }

    fn update_node_view(&self, node: NodeId) {
        if let Some(child) = self.gm[node].child() {
            for &n in self.gm[child].nodes() {
                self.update_node_view(n);
            }
        }
        let n = &self.gm[node];
        if let Some(view) = &n.view {
            view.with_updatable(|u| u.update_node(n));
        }
    }
}
