//! Reading and writing point sets and surface meshes.
//!
//! The in-memory interchange type is [`PolyMesh`](mesh::PolyMesh): points,
//! four groups of cells and per-point data arrays. The [`io`] module contains
//! the codecs for DFS, OFF, TetGen and GIFTI files plus a dispatcher which
//! picks the codec from a file's extension.
//!
//! ```no_run
//! use surfio::io::{self, ReadOptions, WriteOptions};
//!
//! # fn main() -> Result<(), surfio::io::Error> {
//! let mesh = io::read_mesh("lh.white.surf.gii", &ReadOptions::default())?;
//! io::write_mesh("lh.white.off", &mesh, &WriteOptions::default())?;
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
#[macro_use]
mod test_utils;

pub mod io;
pub mod mesh;

pub use self::mesh::{
    Attribute, CellArray, CellKind, DataArray, MetaData, MetaKey, MetaValue,
    PointData, PointId, PolyMesh,
};
