use std::{fmt, ops::Range};

use super::PointId;


/// The four cell groups of a [`PolyMesh`][super::PolyMesh], in their fixed
/// enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// Single points (vertex cells).
    Vertex,
    /// Polylines.
    Line,
    /// Polygons with three or more points.
    Polygon,
    /// Triangle strips.
    Strip,
}

impl CellKind {
    /// All kinds in mesh-native enumeration order.
    pub const ALL: [CellKind; 4] = [
        CellKind::Vertex,
        CellKind::Line,
        CellKind::Polygon,
        CellKind::Strip,
    ];

    /// Short name of the group (`verts`, `lines`, `polys` or `strips`).
    pub fn name(&self) -> &'static str {
        match self {
            CellKind::Vertex => "verts",
            CellKind::Line => "lines",
            CellKind::Polygon => "polys",
            CellKind::Strip => "strips",
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// A list of cells, each being a list of point IDs.
///
/// All IDs are stored in one flat `connectivity` buffer; `offsets` has one
/// more entry than there are cells and cell `i` occupies
/// `connectivity[offsets[i]..offsets[i + 1]]`.
#[derive(Clone, PartialEq, Eq)]
pub struct CellArray {
    offsets: Vec<usize>,
    connectivity: Vec<PointId>,
}

impl CellArray {
    pub fn new() -> Self {
        Self {
            offsets: vec![0],
            connectivity: Vec::new(),
        }
    }

    /// Creates an empty array with room for `cells` cells with `ids` IDs in
    /// total.
    pub fn with_capacity(cells: usize, ids: usize) -> Self {
        let mut offsets = Vec::with_capacity(cells + 1);
        offsets.push(0);

        Self {
            offsets,
            connectivity: Vec::with_capacity(ids),
        }
    }

    /// Appends one cell.
    pub fn push(&mut self, cell: &[PointId]) {
        self.connectivity.extend_from_slice(cell);
        self.offsets.push(self.connectivity.len());
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of point IDs over all cells.
    pub fn num_ids(&self) -> usize {
        self.connectivity.len()
    }

    /// Returns the point IDs of the `i`-th cell or `None` if `i` is out of
    /// bounds.
    pub fn get(&self, i: usize) -> Option<&[PointId]> {
        if i < self.len() {
            Some(&self.connectivity[self.range(i)])
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &[PointId]> + '_ {
        (0..self.len()).map(move |i| &self.connectivity[self.range(i)])
    }

    /// Size of the largest cell, 0 if there are no cells.
    pub fn max_cell_size(&self) -> usize {
        self.offsets.windows(2).map(|w| w[1] - w[0]).max().unwrap_or(0)
    }

    /// The flat ID buffer.
    pub fn connectivity(&self) -> &[PointId] {
        &self.connectivity
    }

    fn range(&self, i: usize) -> Range<usize> {
        self.offsets[i]..self.offsets[i + 1]
    }
}

impl Default for CellArray {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CellArray {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a> Extend<&'a [PointId]> for CellArray {
    fn extend<T: IntoIterator<Item = &'a [PointId]>>(&mut self, iter: T) {
        for cell in iter {
            self.push(cell);
        }
    }
}
