use core::ops::Range;

use relief_geom::Vec3;

use crate::index::quad_triangles;
use crate::vertex::Vertex;

/// Square window of terrain vertices in row-major order.
///
/// Row 0 is the far edge (largest world z) and columns advance along +x.
/// The buffer is allocated once and scrolled in place as the window
/// follows the observer.
#[derive(Clone, Debug)]
pub struct VertexGrid {
    side: usize,
    verts: Vec<Vertex>,
}

impl VertexGrid {
    pub fn new(side: usize) -> Self {
        assert!(side >= 2, "vertex grid needs at least a 2x2 window");
        Self {
            side,
            verts: vec![Vertex::default(); side * side],
        }
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.side && col < self.side);
        row * self.side + col
    }

    #[inline]
    pub fn vertex(&self, row: usize, col: usize) -> &Vertex {
        &self.verts[self.idx(row, col)]
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.verts
    }

    /// Overwrites one cell with freshly sampled surface data. The normal
    /// starts at zero until a normal pass covers the cell.
    #[inline]
    pub fn put_vertex(
        &mut self,
        row: usize,
        col: usize,
        position: Vec3,
        color: [f32; 4],
        shininess: f32,
    ) {
        let i = self.idx(row, col);
        self.verts[i] = Vertex {
            position,
            color,
            normal: Vec3::ZERO,
            shininess,
        };
    }

    /// Slides rows so row `r` takes what row `r + by` held. Rows on the
    /// trailing side keep stale copies for the caller to refill. A shift
    /// of at least the side length leaves the buffer untouched since no
    /// cell survives it.
    pub fn scroll_rows(&mut self, by: i32) {
        let n = self.side;
        let k = by.unsigned_abs() as usize;
        if k == 0 || k >= n {
            return;
        }
        if by > 0 {
            self.verts.copy_within(k * n..n * n, 0);
        } else {
            self.verts.copy_within(0..(n - k) * n, k * n);
        }
    }

    /// Column counterpart of `scroll_rows`, restricted to `rows` so a band
    /// the row scroll already invalidated is not moved twice.
    pub fn scroll_cols(&mut self, by: i32, rows: Range<usize>) {
        let n = self.side;
        let k = by.unsigned_abs() as usize;
        if k == 0 || k >= n {
            return;
        }
        debug_assert!(rows.end <= n);
        for r in rows {
            let start = r * n;
            let row = &mut self.verts[start..start + n];
            if by > 0 {
                row.copy_within(k.., 0);
            } else {
                row.copy_within(..n - k, k);
            }
        }
    }

    /// Recomputes vertex normals for every cell in `rows` x `cols`.
    ///
    /// All triangles incident to the region contribute their face cross
    /// products, including ones from quads a single step outside it, and
    /// the accumulated sums are then normalized. Cells outside the region
    /// are never written, so passes can run region by region in any order.
    pub fn rebuild_normals(&mut self, rows: Range<usize>, cols: Range<usize>) {
        if rows.is_empty() || cols.is_empty() {
            return;
        }
        debug_assert!(rows.end <= self.side && cols.end <= self.side);
        for r in rows.clone() {
            for c in cols.clone() {
                let i = self.idx(r, c);
                self.verts[i].normal = Vec3::ZERO;
            }
        }
        let quad_rows = rows.start.saturating_sub(1)..rows.end.min(self.side - 1);
        let quad_cols = cols.start.saturating_sub(1)..cols.end.min(self.side - 1);
        for qr in quad_rows {
            for qc in quad_cols.clone() {
                for tri in quad_triangles(qr, qc) {
                    let [a, b, c] = tri;
                    let pa = self.verts[self.idx(a.0, a.1)].position;
                    let pb = self.verts[self.idx(b.0, b.1)].position;
                    let pc = self.verts[self.idx(c.0, c.1)].position;
                    let face = (pb - pa).cross(pc - pa);
                    for (vr, vc) in tri {
                        if rows.contains(&vr) && cols.contains(&vc) {
                            let i = self.idx(vr, vc);
                            self.verts[i].normal += face;
                        }
                    }
                }
            }
        }
        for r in rows.clone() {
            for c in cols.clone() {
                let i = self.idx(r, c);
                self.verts[i].normal = self.verts[i].normal.normalized();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(side: usize) -> VertexGrid {
        let mut g = VertexGrid::new(side);
        for r in 0..side {
            for c in 0..side {
                let tag = (r * side + c) as f32;
                g.put_vertex(r, c, Vec3::new(c as f32, tag, -(r as f32)), [0.0; 4], 1.0);
            }
        }
        g
    }

    #[test]
    fn scroll_rows_pulls_content_from_the_far_side() {
        let side = 4;
        let before = tagged(side);
        let mut g = before.clone();
        g.scroll_rows(1);
        for r in 0..side - 1 {
            for c in 0..side {
                assert_eq!(g.vertex(r, c), before.vertex(r + 1, c));
            }
        }
    }

    #[test]
    fn scroll_rows_negative_pulls_from_the_near_side() {
        let side = 4;
        let before = tagged(side);
        let mut g = before.clone();
        g.scroll_rows(-2);
        for r in 2..side {
            for c in 0..side {
                assert_eq!(g.vertex(r, c), before.vertex(r - 2, c));
            }
        }
    }

    #[test]
    fn scroll_cols_only_touches_the_requested_rows() {
        let side = 5;
        let before = tagged(side);
        let mut g = before.clone();
        g.scroll_cols(2, 1..4);
        for r in 1..4 {
            for c in 0..side - 2 {
                assert_eq!(g.vertex(r, c), before.vertex(r, c + 2));
            }
        }
        for c in 0..side {
            assert_eq!(g.vertex(0, c), before.vertex(0, c));
            assert_eq!(g.vertex(4, c), before.vertex(4, c));
        }
    }

    #[test]
    fn oversized_scrolls_are_no_ops() {
        let side = 4;
        let before = tagged(side);
        let mut g = before.clone();
        g.scroll_rows(4);
        g.scroll_rows(-7);
        g.scroll_cols(9, 0..side);
        assert_eq!(g.vertices(), before.vertices());
    }

    #[test]
    fn flat_grid_normals_point_straight_up() {
        let side = 4;
        let mut g = VertexGrid::new(side);
        for r in 0..side {
            for c in 0..side {
                let pos = Vec3::new(c as f32 * 2.0, 0.0, -(r as f32) * 2.0);
                g.put_vertex(r, c, pos, [0.0; 4], 1.0);
            }
        }
        g.rebuild_normals(0..side, 0..side);
        for v in g.vertices() {
            assert_eq!(v.normal, Vec3::UP);
        }
    }

    #[test]
    fn tilted_plane_normals_match_the_analytic_normal() {
        // On the plane y = x/2 every vertex normal is (-1, 2, 0)/sqrt(5).
        let side = 5;
        let mut g = VertexGrid::new(side);
        for r in 0..side {
            for c in 0..side {
                let x = c as f32 * 2.0;
                g.put_vertex(r, c, Vec3::new(x, x * 0.5, -(r as f32) * 2.0), [0.0; 4], 1.0);
            }
        }
        g.rebuild_normals(0..side, 0..side);
        let expect = Vec3::new(-1.0, 2.0, 0.0).normalized();
        for v in g.vertices() {
            assert!((v.normal - expect).length() < 1e-6);
        }
    }

    #[test]
    fn normal_rebuild_is_idempotent() {
        let side = 6;
        let mut g = VertexGrid::new(side);
        for r in 0..side {
            for c in 0..side {
                let h = ((r * 31 + c * 17) % 7) as f32;
                g.put_vertex(r, c, Vec3::new(c as f32 * 2.0, h, -(r as f32) * 2.0), [0.0; 4], 1.0);
            }
        }
        g.rebuild_normals(0..side, 0..side);
        let first = g.clone();
        g.rebuild_normals(1..4, 2..6);
        g.rebuild_normals(0..side, 0..side);
        assert_eq!(g.vertices(), first.vertices());
    }
}
