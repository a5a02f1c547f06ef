use std::io::{self, Write};

use crate::{
    io::{text::G, Error, MeshWriter},
    mesh::PolyMesh,
};


/// Number of significant digits used for coordinates by default.
const DEFAULT_PRECISION: usize = 12;


// ===============================================================================================
// ===== OFF Config
// ===============================================================================================

/// Used to configure and create a [`Writer`].
#[derive(Clone, Debug)]
pub struct Config {
    precision: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }

    /// Sets the number of significant digits of the coordinates.
    pub fn with_precision(self, precision: usize) -> Self {
        Self { precision }
    }

    /// Creates a [`Writer`] with `self` as config.
    pub fn into_writer<W: io::Write>(self, writer: W) -> Writer<W> {
        Writer::new(self, writer)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshWriter for Config {
    fn write_to(&self, mesh: &PolyMesh, writer: impl Write) -> Result<(), Error> {
        self.clone().into_writer(writer).write(mesh)
    }
}


// ===============================================================================================
// ===== OFF Writer
// ===============================================================================================

/// A writer for OFF files.
#[derive(Debug)]
pub struct Writer<W: io::Write> {
    config: Config,
    writer: W,
}

impl<W: io::Write> Writer<W> {
    pub fn new(config: Config, writer: W) -> Self {
        Self { config, writer }
    }

    /// Writes all points and all cells of the mesh. Cells are written in mesh
    /// order (verts, lines, polys, strips) with 0-based point IDs.
    pub fn write(self, mesh: &PolyMesh) -> Result<(), Error> {
        let precision = self.config.precision;
        let mut w = self.writer;

        writeln!(w, "OFF")?;
        writeln!(w, "{} {} 0", mesh.num_points(), mesh.num_cells())?;

        for p in &mesh.points {
            writeln!(w, "{} {} {}", G(p.x, precision), G(p.y, precision), G(p.z, precision))?;
        }

        for (_, cell) in mesh.cells() {
            write!(w, "{}", cell.len())?;
            for id in cell {
                write!(w, " {}", id)?;
            }
            writeln!(w)?;
        }

        Ok(())
    }
}
