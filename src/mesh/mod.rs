//! The canonical in-memory mesh all codecs translate from and to.

use cgmath::Point3;

use crate::io::{Error, ErrorKind};

mod cells;
mod data;
mod meta;

pub use self::{
    cells::{CellArray, CellKind},
    data::{Attribute, DataArray, PointData},
    meta::{MetaData, MetaKey, MetaValue, ValueType},
};


/// Index of a point in [`PolyMesh::points`].
pub type PointId = u32;

/// A polygonal mesh: points, four groups of cells referencing those points,
/// per-point data arrays and a metadata side table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolyMesh {
    pub points: Vec<Point3<f64>>,
    pub verts: CellArray,
    pub lines: CellArray,
    pub polys: CellArray,
    pub strips: CellArray,
    pub point_data: PointData,
    pub info: MetaData,
}

impl PolyMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh with the given points and no cells.
    pub fn from_points(points: Vec<Point3<f64>>) -> Self {
        Self {
            points,
            .. Self::default()
        }
    }

    /// Creates a mesh from points and triangles.
    pub fn from_triangles(points: Vec<Point3<f64>>, triangles: &[[PointId; 3]]) -> Self {
        let mut polys = CellArray::with_capacity(triangles.len(), triangles.len() * 3);
        for t in triangles {
            polys.push(t);
        }

        Self {
            points,
            polys,
            .. Self::default()
        }
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Total number of cells over all four groups.
    pub fn num_cells(&self) -> usize {
        CellKind::ALL.iter().map(|&k| self.cells_of(k).len()).sum()
    }

    /// Returns `true` if there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn cells_of(&self, kind: CellKind) -> &CellArray {
        match kind {
            CellKind::Vertex => &self.verts,
            CellKind::Line => &self.lines,
            CellKind::Polygon => &self.polys,
            CellKind::Strip => &self.strips,
        }
    }

    pub fn cells_of_mut(&mut self, kind: CellKind) -> &mut CellArray {
        match kind {
            CellKind::Vertex => &mut self.verts,
            CellKind::Line => &mut self.lines,
            CellKind::Polygon => &mut self.polys,
            CellKind::Strip => &mut self.strips,
        }
    }

    /// Iterates over all cells in mesh-native order: verts, lines, polys and
    /// strips.
    pub fn cells(&self) -> impl Iterator<Item = (CellKind, &[PointId])> + '_ {
        let kinds: &'static [CellKind] = &CellKind::ALL;
        kinds.iter()
            .flat_map(move |&k| self.cells_of(k).iter().map(move |c| (k, c)))
    }

    /// Checks that all cells only reference existing points and that every
    /// point data array has one tuple per point.
    pub fn validate(&self) -> Result<(), Error> {
        let len = self.num_points();
        for (_, cell) in self.cells() {
            if let Some(&index) = cell.iter().find(|&&id| id as usize >= len) {
                return Err(Error::new(|| ErrorKind::IndexOutOfRange {
                    what: "cell point ID",
                    index: index as i64,
                    len,
                }));
            }
        }

        for array in self.point_data.arrays() {
            if array.num_tuples() != len {
                return Err(Error::new(|| ErrorKind::SizeMismatch {
                    what: format!("point data array '{}'", array.name()),
                    expected: len,
                    actual: array.num_tuples(),
                }));
            }
        }

        Ok(())
    }
}
