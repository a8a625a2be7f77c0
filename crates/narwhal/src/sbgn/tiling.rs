//! Row tiling of complex members.
//!
//! Members are taken tallest first; each goes into the row (or a new row) that keeps the
//! overall pack closest to a square.

use narwhal_graph::{GraphId, GraphManager, NodeId};

use super::constants::{
    COMPLEX_MEM_HORIZONTAL_BUFFER, COMPLEX_MEM_MARGIN, COMPLEX_MEM_VERTICAL_BUFFER,
    COMPLEX_MIN_WIDTH,
};

#[derive(Debug, Clone, Default)]
struct Row {
    members: Vec<NodeId>,
    width: f64,
    height: f64,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemberPack {
    rows: Vec<Row>,
}

impl MemberPack {
    pub fn new(gm: &GraphManager, graph: GraphId) -> Self {
        let mut members = gm[graph].nodes().to_vec();
        members.sort_by(|a, b| gm[*b].height().total_cmp(&gm[*a].height()));

        let mut pack = Self::default();
        for m in members {
            pack.insert(m, gm[m].width(), gm[m].height());
        }
        pack
    }

    fn content_size(&self) -> (f64, f64) {
        let width = self.rows.iter().map(|r| r.width).fold(0.0, f64::max);
        let gaps = self.rows.len().saturating_sub(1) as f64 * COMPLEX_MEM_VERTICAL_BUFFER;
        let height = self.rows.iter().map(|r| r.height).sum::<f64>() + gaps;
        (width, height)
    }

    fn insert(&mut self, node: NodeId, w: f64, h: f64) {
        let (width, height) = self.content_size();
        let ratio = |w: f64, h: f64| {
            let (lo, hi) = if w < h { (w, h) } else { (h, w) };
            if lo <= 0.0 { f64::INFINITY } else { hi / lo }
        };

        let mut best: Option<usize> = None;
        let mut best_ratio = if self.rows.is_empty() {
            f64::INFINITY
        } else {
            let gap = COMPLEX_MEM_VERTICAL_BUFFER;
            ratio(width.max(w), height + gap + h)
        };
        for (i, row) in self.rows.iter().enumerate() {
            let row_width = row.width + COMPLEX_MEM_HORIZONTAL_BUFFER + w;
            let grown = (h - row.height).max(0.0);
            let r = ratio(width.max(row_width), height + grown);
            if r <= best_ratio {
                best_ratio = r;
                best = Some(i);
            }
        }

        match best {
            Some(i) => {
                let row = &mut self.rows[i];
                row.width += COMPLEX_MEM_HORIZONTAL_BUFFER + w;
                row.height = row.height.max(h);
                row.members.push(node);
            }
            None => self.rows.push(Row {
                members: vec![node],
                width: w,
                height: h,
            }),
        }
    }

    pub fn width(&self) -> f64 {
        (self.content_size().0 + 2.0 * COMPLEX_MEM_MARGIN).max(COMPLEX_MIN_WIDTH)
    }

    pub fn height(&self) -> f64 {
        (self.content_size().1 + 2.0 * COMPLEX_MEM_MARGIN).max(COMPLEX_MIN_WIDTH)
    }

    /// Lays the rows out from `(left, top)`, inside the complex margin.
    pub fn adjust_locations(&self, gm: &mut GraphManager, left: f64, top: f64) {
        let mut y = top + COMPLEX_MEM_MARGIN;
        for row in &self.rows {
            let mut x = left + COMPLEX_MEM_MARGIN;
            for &m in &row.members {
                gm.set_location_with_children(m, x, y);
                x += gm[m].width() + COMPLEX_MEM_HORIZONTAL_BUFFER;
            }
            y += row.height + COMPLEX_MEM_VERTICAL_BUFFER;
        }
    }
}

#[cfg(test)]
mod tests {
    use narwhal_graph::{GraphManager, Node};

    use super::MemberPack;

    #[test]
    fn four_squares_pack_two_by_two() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let complex = gm.add_node(root, Node::sized(10.0, 10.0));
        let child = gm.add_graph(complex);
        let members: Vec<_> = (0..4)
            .map(|_| gm.add_node(child, Node::sized(20.0, 20.0)))
            .collect();

        let pack = MemberPack::new(&gm, child);
        assert_eq!(pack.width(), 20.0 + 15.0 + 20.0 + 20.0);
        assert_eq!(pack.height(), pack.width());

        pack.adjust_locations(&mut gm, 100.0, 200.0);
        assert_eq!(gm[members[0]].location().x, 110.0);
        assert_eq!(gm[members[0]].location().y, 210.0);
        let far = gm.calculate_bounds(&members).unwrap();
        assert_eq!(far.right(), 100.0 + pack.width() - 10.0);
        assert_eq!(far.bottom(), 200.0 + pack.height() - 10.0);
    }

    #[test]
    fn empty_pack_keeps_minimum_size() {
        let mut gm = GraphManager::new();
        let root = gm.add_root();
        let complex = gm.add_node(root, Node::sized(10.0, 10.0));
        let child = gm.add_graph(complex);
        let pack = MemberPack::new(&gm, child);
        assert_eq!(pack.width(), 20.0);
        assert_eq!(pack.height(), 20.0);
    }
}
