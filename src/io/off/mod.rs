//! Reading and writing OFF files.
//!
//! OFF is a plain text format: the token `OFF`, the number of vertices, faces
//! and edges, followed by one coordinate triple per vertex and one record
//! `n id_0 ... id_{n-1}` per face. Everything is separated by whitespace.
//!
//! When reading, faces are sorted into the cell groups of the mesh by their
//! size: one point becomes a vertex cell, two points a line and three or more
//! a polygon. When writing, all cells are written in mesh order.

use std::path::Path;

use crate::mesh::PolyMesh;
use super::{Error, MeshWriter};


mod read;
mod write;

#[cfg(test)]
mod tests;

pub use self::{
    read::Reader,
    write::{Config, Writer},
};


/// Reads the OFF file at `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<PolyMesh, Error> {
    Reader::open(path)?.read()
}

/// Writes `mesh` as OFF file with the default config.
pub fn write_file(path: impl AsRef<Path>, mesh: &PolyMesh) -> Result<(), Error> {
    Config::new().write_to_file(mesh, path)
}
