//! Polyomino packing of complex members.
//!
//! Each member becomes a block of grid cells covering its rectangle plus a buffer. Blocks are
//! placed largest first, spiralling out from the origin, at the free spot that keeps the
//! occupied area squarest. A compaction sweep then slides members left and up until they touch.

use narwhal_graph::{GraphId, GraphManager, NodeId, Rect};
use rustc_hash::FxHashSet;

use super::constants::{COMPLEX_MEM_MARGIN, POLYOMINO_BUFFER};

#[derive(Debug, Clone, Copy)]
struct Polyomino {
    node: NodeId,
    cols: i32,
    rows: i32,
}

#[derive(Debug, Default)]
struct Occupancy {
    cells: FxHashSet<(i32, i32)>,
    bounds: Option<(i32, i32, i32, i32)>,
}

impl Occupancy {
    fn fits(&self, p: &Polyomino, x0: i32, y0: i32) -> bool {
        (0..p.rows).all(|dy| (0..p.cols).all(|dx| !self.cells.contains(&(x0 + dx, y0 + dy))))
    }

    /// Longer side of the occupied bounding box after placing `p` at `(x0, y0)`.
    fn extent_with(&self, p: &Polyomino, x0: i32, y0: i32) -> i32 {
        let (x1, y1) = (x0 + p.cols - 1, y0 + p.rows - 1);
        let (l, t, r, b) = match self.bounds {
            Some((l, t, r, b)) => (l.min(x0), t.min(y0), r.max(x1), b.max(y1)),
            None => (x0, y0, x1, y1),
        };
        (r - l + 1).max(b - t + 1)
    }

    fn occupy(&mut self, p: &Polyomino, x0: i32, y0: i32) {
        for dy in 0..p.rows {
            for dx in 0..p.cols {
                self.cells.insert((x0 + dx, y0 + dy));
            }
        }
        let (x1, y1) = (x0 + p.cols - 1, y0 + p.rows - 1);
        self.bounds = Some(match self.bounds {
            Some((l, t, r, b)) => (l.min(x0), t.min(y0), r.max(x1), b.max(y1)),
            None => (x0, y0, x1, y1),
        });
    }

    /// Top-left cell for `p`: the best free spot on the first ring around the origin that has
    /// any.
    fn place(&mut self, p: &Polyomino) -> (i32, i32) {
        let mut radius: i32 = 0;
        loop {
            let mut best: Option<(i32, i32, i32)> = None;
            for y in -radius..=radius {
                for x in -radius..=radius {
                    if x.abs() != radius && y.abs() != radius {
                        continue;
                    }
                    let (x0, y0) = (x - p.cols / 2, y - p.rows / 2);
                    if !self.fits(p, x0, y0) {
                        continue;
                    }
                    let extent = self.extent_with(p, x0, y0);
                    if best.is_none_or(|(e, _, _)| extent < e) {
                        best = Some((extent, x0, y0));
                    }
                }
            }
            if let Some((_, x0, y0)) = best {
                self.occupy(p, x0, y0);
                return (x0, y0);
            }
            radius += 1;
        }
    }
}

/// Grid step: half the mean member side, at least one unit.
fn grid_step(gm: &GraphManager, members: &[NodeId]) -> f64 {
    let mean = members
        .iter()
        .map(|&n| (gm[n].width() + gm[n].height()) / 2.0)
        .sum::<f64>()
        / members.len() as f64;
    (mean / 2.0).max(1.0)
}

/// Packs the members of `graph` around the origin and returns their bounds grown by the
/// complex margin, or `None` for an empty graph.
pub(crate) fn pack_members(gm: &mut GraphManager, graph: GraphId) -> Option<Rect> {
    let members = gm[graph].nodes().to_vec();
    if members.is_empty() {
        return None;
    }
    let step = grid_step(gm, &members);

    let mut polys: Vec<Polyomino> = members
        .iter()
        .map(|&n| Polyomino {
            node: n,
            cols: ((gm[n].width() + POLYOMINO_BUFFER) / step).ceil().max(1.0) as i32,
            rows: ((gm[n].height() + POLYOMINO_BUFFER) / step).ceil().max(1.0) as i32,
        })
        .collect();
    polys.sort_by_key(|p| std::cmp::Reverse(p.cols * p.rows));

    let mut grid = Occupancy::default();
    for p in &polys {
        let (x0, y0) = grid.place(p);
        gm.set_location_with_children(
            p.node,
            f64::from(x0) * step + POLYOMINO_BUFFER / 2.0,
            f64::from(y0) * step + POLYOMINO_BUFFER / 2.0,
        );
    }

    compact(gm, &members, POLYOMINO_BUFFER);

    let bounds = gm.calculate_bounds(&members)?;
    Some(Rect::from_corners(
        bounds.left() - COMPLEX_MEM_MARGIN,
        bounds.top() - COMPLEX_MEM_MARGIN,
        bounds.right() + COMPLEX_MEM_MARGIN,
        bounds.bottom() + COMPLEX_MEM_MARGIN,
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
}

/// Slides every member towards the left (then the top) edge of the pack until it comes within
/// `buffer` of a member in its way. Repeats until nothing moves.
fn compact(gm: &mut GraphManager, members: &[NodeId], buffer: f64) {
    let Some(bounds) = gm.calculate_bounds(members) else {
        return;
    };
    for _ in 0..members.len().max(1) * 2 {
        let moved_x = slide(gm, members, buffer, bounds.left(), Axis::X);
        let moved_y = slide(gm, members, buffer, bounds.top(), Axis::Y);
        if !moved_x && !moved_y {
            break;
        }
    }
}

fn slide(gm: &mut GraphManager, members: &[NodeId], buffer: f64, floor: f64, axis: Axis) -> bool {
    // (lead edge, trail edge, cross start, cross end) along the sliding axis.
    let span = |r: &Rect| match axis {
        Axis::X => (r.left(), r.right(), r.top(), r.bottom()),
        Axis::Y => (r.top(), r.bottom(), r.left(), r.right()),
    };
    let mut order = members.to_vec();
    order.sort_by(|a, b| span(&gm[*a].rect).0.total_cmp(&span(&gm[*b].rect).0));

    let mut moved = false;
    for &m in &order {
        let (lead, _, c0, c1) = span(&gm[m].rect);
        let mut target = floor;
        for &o in members {
            if o == m {
                continue;
            }
            let (_, o_trail, o0, o1) = span(&gm[o].rect);
            let crosses = o0 < c1 + buffer && o1 + buffer > c0;
            if crosses && o_trail <= lead + 1e-9 {
                target = target.max(o_trail + buffer);
            }
        }
        if target < lead - 1e-9 {
            let shift = target - lead;
            match axis {
                Axis::X => gm.move_with_children(m, shift, 0.0),
                Axis::Y => gm.move_with_children(m, 0.0, shift),
            }
            moved = true;
        }
    }
    moved
}

#[cfg(test)]
mod tests {
    use narwhal_graph::{GraphManager, Node};

    use super::pack_members;

    #[test]
    fn packed_members_do_not_overlap() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let complex = gm.add_node(root, Node::sized(10.0, 10.0));
        let child = gm.add_graph(complex);
        let sizes = [(40.0, 20.0), (20.0, 20.0), (30.0, 30.0), (20.0, 50.0), (10.0, 10.0)];
        let members: Vec<_> = sizes
            .iter()
            .map(|&(w, h)| gm.add_node(child, Node::sized(w, h)))
            .collect();

        let bounds = pack_members(&mut gm, child).unwrap();
        for (i, &a) in members.iter().enumerate() {
            assert!(bounds.contains(&gm[a].rect));
            for &b in &members[i + 1..] {
                assert!(!gm[a].rect.intersects(&gm[b].rect), "{a:?} overlaps {b:?}");
            }
        }
        let single_row = 40.0 + 20.0 + 30.0 + 20.0 + 10.0 + 4.0 * 15.0 + 20.0;
        assert!(bounds.width < single_row);
        assert!(bounds.height < single_row);
    }
}
