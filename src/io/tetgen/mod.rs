//! Writing TetGen input files (`.node`, `.poly` and `.smesh`).
//!
//! These are the inputs of the TetGen tetrahedral mesh generator. They can
//! only be written; TetGen itself consumes them.
//!
//! - `.node`: all points with 1-based IDs, followed by every component of
//!   every point data array as node attributes.
//! - `.poly`: a node section, a facet section grouped by cell kind (each group
//!   with a comment and its own count), a hole list and an empty region list.
//! - `.smesh`: like `.poly`, but the facets form one flat list.

use std::{
    io::{self, Write},
    path::Path,
};

use cgmath::Point3;

use crate::{
    mesh::{CellKind, PointId, PolyMesh},
};
use super::{text::G, Error, ErrorKind, FileFormat, MeshWriter};




/// Significant digits of coordinates. TetGen's default tolerance is `1e-8`.
const COORD_PRECISION: usize = 8;

/// Significant digits of node attributes.
const ATTRIBUTE_PRECISION: usize = 5;

/// Significant digits of hole coordinates.
const HOLE_PRECISION: usize = 6;


/// Which of the three TetGen files to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Node,
    Poly,
    SMesh,
}

impl Kind {
    /// Returns the kind matching the given format, or `None` for non-TetGen
    /// formats.
    pub fn from_format(format: FileFormat) -> Option<Self> {
        match format {
            FileFormat::TetGenNode => Some(Kind::Node),
            FileFormat::TetGenPoly => Some(Kind::Poly),
            FileFormat::TetGenSMesh => Some(Kind::SMesh),
            _ => None,
        }
    }
}


// ===============================================================================================
// ===== TetGen Config
// ===============================================================================================

/// Used to configure and create a [`Writer`].
#[derive(Clone, Debug)]
pub struct Config {
    kind: Kind,
    holes: Vec<Point3<f64>>,
}

impl Config {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            holes: Vec::new(),
        }
    }

    pub fn node() -> Self {
        Self::new(Kind::Node)
    }

    pub fn poly() -> Self {
        Self::new(Kind::Poly)
    }

    pub fn smesh() -> Self {
        Self::new(Kind::SMesh)
    }

    /// Sets points inside of holes of the domain. They are written to the hole
    /// list of `.poly` and `.smesh` files and ignored for `.node` files.
    pub fn with_holes(self, holes: Vec<Point3<f64>>) -> Self {
        Self { holes, .. self }
    }

    /// Creates a [`Writer`] with `self` as config.
    pub fn into_writer<W: io::Write>(self, writer: W) -> Writer<W> {
        Writer::new(self, writer)
    }
}

impl MeshWriter for Config {
    fn write_to(&self, mesh: &PolyMesh, writer: impl Write) -> Result<(), Error> {
        self.clone().into_writer(writer).write(mesh)
    }
}


// ===============================================================================================
// ===== TetGen Writer
// ===============================================================================================

/// A writer for TetGen files.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    config: Config,
    writer: W,
}

impl<W: io::Write> Writer<W> {
    pub fn new(config: Config, writer: W) -> Self {
        Self { config, writer }
    }

    pub fn write(self, mesh: &PolyMesh) -> Result<(), Error> {
        for array in mesh.point_data.arrays() {
            if array.num_tuples() != mesh.num_points() {
                return Err(Error::new(|| ErrorKind::SizeMismatch {
                    what: format!("point data array '{}'", array.name()),
                    expected: mesh.num_points(),
                    actual: array.num_tuples(),
                }));
            }
        }

        let Self { config, mut writer } = self;
        let w = &mut writer;
        match config.kind {
            Kind::Node => write_nodes(w, mesh)?,
            Kind::Poly | Kind::SMesh => {
                writeln!(w, "# part 1: nodes")?;
                write_nodes(w, mesh)?;

                writeln!(w)?;
                writeln!(w, "# part 2: facets")?;
                if config.kind == Kind::Poly {
                    write_grouped_facets(w, mesh)?;
                } else {
                    write_flat_facets(w, mesh)?;
                }

                writeln!(w)?;
                writeln!(w, "# part 3: hole list")?;
                writeln!(w, "{}", config.holes.len())?;
                for (i, p) in config.holes.iter().enumerate() {
                    writeln!(
                        w,
                        "{} {} {} {}",
                        i + 1,
                        G(p.x, HOLE_PRECISION),
                        G(p.y, HOLE_PRECISION),
                        G(p.z, HOLE_PRECISION),
                    )?;
                }

                writeln!(w)?;
                writeln!(w, "# part 4: region list")?;
                writeln!(w, "0")?;
            }
        }

        Ok(())
    }
}

fn write_nodes(w: &mut impl Write, mesh: &PolyMesh) -> Result<(), Error> {
    let arrays = mesh.point_data.arrays();
    writeln!(w, "{} 3 {} 0", mesh.num_points(), mesh.point_data.num_components())?;

    for (i, p) in mesh.points.iter().enumerate() {
        write!(w, "{} ", i + 1)?;
        write!(
            w,
            " {} {} {}",
            G(p.x, COORD_PRECISION),
            G(p.y, COORD_PRECISION),
            G(p.z, COORD_PRECISION),
        )?;
        for array in arrays {
            for &v in array.tuple(i) {
                write!(w, " {}", G(v, ATTRIBUTE_PRECISION))?;
            }
        }
        writeln!(w)?;
    }

    Ok(())
}

/// One group per non-empty cell kind, each with a comment and its own count.
fn write_grouped_facets(w: &mut impl Write, mesh: &PolyMesh) -> Result<(), Error> {
    let groups = CellKind::ALL.iter()
        .map(|&k| (k, mesh.cells_of(k)))
        .filter(|(_, cells)| !cells.is_empty())
        .collect::<Vec<_>>();

    writeln!(w, "{} 0", groups.len())?;
    for (kind, cells) in groups {
        writeln!(w, "# {}", kind)?;
        writeln!(w, "{}", cells.len())?;
        for cell in cells.iter() {
            write_facet(w, cell)?;
        }
    }

    Ok(())
}

fn write_flat_facets(w: &mut impl Write, mesh: &PolyMesh) -> Result<(), Error> {
    writeln!(w, "{} 0", mesh.num_cells())?;
    for (_, cell) in mesh.cells() {
        write_facet(w, cell)?;
    }

    Ok(())
}

fn write_facet(w: &mut impl Write, cell: &[PointId]) -> Result<(), Error> {
    write!(w, "{} ", cell.len())?;
    for &id in cell {
        write!(w, " {}", id + 1)?;
    }
    writeln!(w)?;

    Ok(())
}

/// Writes `mesh` to `path` as TetGen file of the given kind.
pub fn write_file(
    path: impl AsRef<Path>,
    mesh: &PolyMesh,
    kind: Kind,
    holes: &[Point3<f64>],
) -> Result<(), Error> {
    Config::new(kind).with_holes(holes.to_vec()).write_to_file(mesh, path)
}
