use narwhal_graph::{GraphManager, NodeId, Rect};

/// Uniform grid over the root graph used to find each node's repulsion neighborhood.
///
/// Cells are `range` wide; a node is listed in every cell its rectangle touches.
#[derive(Debug, Clone)]
pub(crate) struct RepulsionGrid {
    left: f64,
    top: f64,
    size_x: i32,
    size_y: i32,
    range: f64,
    // cells[x * size_y + y]
    cells: Vec<Vec<NodeId>>,
}

/// Inclusive cell span covered by a rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GridSpan {
    pub start_x: i32,
    pub finish_x: i32,
    pub start_y: i32,
    pub finish_y: i32,
}

impl RepulsionGrid {
    /// Builds a grid over the root graph bounds. Returns `None` without a root, without nodes
    /// or for a degenerate range.
    pub(crate) fn build(gm: &GraphManager, nodes: &[NodeId], range: f64) -> Option<Self> {
        if nodes.is_empty() || !range.is_finite() || range <= 0.0 {
            return None;
        }
        let root = gm.root()?;
        let bounds = gm[root].bounds();
        if !(bounds.left().is_finite() && bounds.right().is_finite()) {
            return None;
        }

        let size_x = (((bounds.right() - bounds.left()) / range).ceil() as i32).max(1);
        let size_y = (((bounds.bottom() - bounds.top()) / range).ceil() as i32).max(1);
        let mut grid = Self {
            left: bounds.left(),
            top: bounds.top(),
            size_x,
            size_y,
            range,
            cells: vec![Vec::new(); (size_x as usize) * (size_y as usize)],
        };

        for &n in nodes {
            let span = grid.span(&gm[n].rect);
            for gx in span.start_x..=span.finish_x {
                for gy in span.start_y..=span.finish_y {
                    let idx = grid.idx(gx, gy);
                    grid.cells[idx].push(n);
                }
            }
        }
        Some(grid)
    }

    fn idx(&self, x: i32, y: i32) -> usize {
        (x as usize) * (self.size_y as usize) + (y as usize)
    }

    pub(crate) fn span(&self, rect: &Rect) -> GridSpan {
        let cell = |v: f64, origin: f64, size: i32| {
            (((v - origin) / self.range).floor() as i32).clamp(0, size - 1)
        };
        GridSpan {
            start_x: cell(rect.left(), self.left, self.size_x),
            finish_x: cell(rect.right(), self.left, self.size_x),
            start_y: cell(rect.top(), self.top, self.size_y),
            finish_y: cell(rect.bottom(), self.top, self.size_y),
        }
    }

    /// Nodes in the cells around `span` (one extra ring) whose rectangle gap to `node` is within
    /// the grid range on both axes, excluding those rejected by `skip`.
    pub(crate) fn surrounding(
        &self,
        gm: &GraphManager,
        node: NodeId,
        span: GridSpan,
        mut skip: impl FnMut(NodeId) -> bool,
    ) -> Vec<NodeId> {
        let rect = gm[node].rect;
        let mut out: Vec<NodeId> = Vec::new();

        for gx in (span.start_x - 1)..=(span.finish_x + 1) {
            if gx < 0 || gx >= self.size_x {
                continue;
            }
            for gy in (span.start_y - 1)..=(span.finish_y + 1) {
                if gy < 0 || gy >= self.size_y {
                    continue;
                }
                for &other in &self.cells[self.idx(gx, gy)] {
                    if other == node || out.contains(&other) || skip(other) {
                        continue;
                    }
                    let o = &gm[other].rect;
                    let gap_x = (rect.center_x() - o.center_x()).abs()
                        - (rect.half_width() + o.half_width());
                    let gap_y = (rect.center_y() - o.center_y()).abs()
                        - (rect.half_height() + o.half_height());
                    if gap_x <= self.range && gap_y <= self.range {
                        out.push(other);
                    }
                }
            }
        }
        out
    }
}
