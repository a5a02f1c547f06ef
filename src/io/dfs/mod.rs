//! Reading and writing BrainSuite DFS surface files.
//!
//! A DFS file is binary: a fixed size header followed by the triangle list
//! (3 `i32` per triangle), the vertex list (3 `f32` per vertex) and optional
//! per-vertex sections (normals, UV coordinates, colors, labels and scalar
//! attributes), each located by an offset stored in the header. The byte order
//! is declared by the magic string at the very start of the file.
//!
//! When reading, the optional sections become point data arrays named
//! `Normals`, `Colors`, `UV`, `Labels` and `Attributes`. The writer picks them
//! up again (preferring the active attributes of the mesh where that makes
//! sense).

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


/// Magic bytes of a little endian file.
const MAGIC_LE: &[u8; 12] = b"DFS_LE v2.0\0";

/// Magic bytes of a big endian file.
const MAGIC_BE: &[u8; 12] = b"DFS_BE v2.0\0";

/// Size of the header written by us. Readers use the size stored in the file.
const HEADER_SIZE: usize = 184;

/// Number of `i32` fields following the magic bytes.
const NUM_HEADER_FIELDS: usize = 12;

// Names of the point data arrays.
const NORMALS: &str = "Normals";
const COLORS: &str = "Colors";
const UV: &str = "UV";
const LABELS: &str = "Labels";
const ATTRIBUTES: &str = "Attributes";

/// The byte order of a DFS file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    LittleEndian,
    BigEndian,
}

/// The header fields following the magic bytes, in file order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Header {
    header_size: i32,
    metadata_offset: i32,
    subject_data_offset: i32,
    num_triangles: i32,
    num_vertices: i32,
    num_strips: i32,
    strip_size: i32,
    normals_offset: i32,
    uv_offset: i32,
    colors_offset: i32,
    labels_offset: i32,
    attributes_offset: i32,
}

impl Header {
    fn from_fields(f: [i32; NUM_HEADER_FIELDS]) -> Self {
        Self {
            header_size: f[0],
            metadata_offset: f[1],
            subject_data_offset: f[2],
            num_triangles: f[3],
            num_vertices: f[4],
            num_strips: f[5],
            strip_size: f[6],
            normals_offset: f[7],
            uv_offset: f[8],
            colors_offset: f[9],
            labels_offset: f[10],
            attributes_offset: f[11],
        }
    }

    fn fields(&self) -> [i32; NUM_HEADER_FIELDS] {
        [
            self.header_size,
            self.metadata_offset,
            self.subject_data_offset,
            self.num_triangles,
            self.num_vertices,
            self.num_strips,
            self.strip_size,
            self.normals_offset,
            self.uv_offset,
            self.colors_offset,
            self.labels_offset,
            self.attributes_offset,
        ]
    }
}

/// Reads the DFS file at `path`.
pub fn read_file(path: impl AsRef<Path>) -> Result<PolyMesh, Error> {
    Reader::open(path)?.read()
}

/// Writes `mesh` as little endian DFS file.
pub fn write_file(path: impl AsRef<Path>, mesh: &PolyMesh) -> Result<(), Error> {
    Config::little_endian().write_to_file(mesh, path)
}
