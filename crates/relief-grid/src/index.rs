//! Static triangle-list index tables, one draw range per grid strip.

/// Corner coordinates of the two triangles in the quad whose top-left
/// vertex is `(row, col)`. Rows advance toward negative world z, so this
/// order winds both triangles counter-clockwise seen from above.
#[inline]
pub(crate) fn quad_triangles(row: usize, col: usize) -> [[(usize, usize); 3]; 2] {
    [
        [(row, col), (row, col + 1), (row + 1, col)],
        [(row, col + 1), (row + 1, col + 1), (row + 1, col)],
    ]
}

/// Span of one strip inside the shared index buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawRange {
    /// Index of the strip's first element in the buffer.
    pub first: usize,
    /// Number of elements the strip draws.
    pub count: usize,
    /// Offset of the first element in bytes.
    pub byte_offset: usize,
}

/// Immutable index buffer for a square vertex grid.
///
/// Indices only encode grid topology, never positions, so one table
/// serves the window for the whole session no matter how far it scrolls.
#[derive(Clone, Debug)]
pub struct IndexTable {
    side: usize,
    indices: Vec<u32>,
    ranges: Vec<DrawRange>,
}

impl IndexTable {
    pub fn new(side: usize) -> Self {
        assert!(side >= 2, "index table needs at least a 2x2 grid");
        assert!(side <= 65_536, "vertex indices must fit in u32");
        let strips = side - 1;
        let per_strip = 6 * (side - 1);
        let mut indices = Vec::with_capacity(strips * per_strip);
        let mut ranges = Vec::with_capacity(strips);
        for row in 0..strips {
            let first = indices.len();
            for col in 0..side - 1 {
                for tri in quad_triangles(row, col) {
                    for (vr, vc) in tri {
                        indices.push((vr * side + vc) as u32);
                    }
                }
            }
            ranges.push(DrawRange {
                first,
                count: indices.len() - first,
                byte_offset: first * size_of::<u32>(),
            });
        }
        Self {
            side,
            indices,
            ranges,
        }
    }

    #[inline]
    pub fn side(&self) -> usize {
        self.side
    }

    #[inline]
    pub fn strip_count(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn ranges(&self) -> &[DrawRange] {
        &self.ranges
    }
}
